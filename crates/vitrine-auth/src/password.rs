//! Password hashing and strength policy.

use crate::AuthError;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

/// Hash a password with argon2id and a fresh random salt.
///
/// The returned string is a self-describing PHC hash, suitable for
/// storage and for [`verify_password`].
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Validate password strength.
pub fn validate_strength(password: &str) -> Result<(), AuthError> {
    if password.len() < 8 {
        return Err(AuthError::WeakPassword(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_upper || !has_lower || !has_digit {
        return Err(AuthError::WeakPassword(
            "password must contain uppercase, lowercase, and numbers".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "SecurePass123";
        let hash = hash_password(password).unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword1", &hash).unwrap());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = "TestPassword1";
        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();

        // Different salts produce different hashes; both verify.
        assert_ne!(hash1, hash2);
        assert!(verify_password(password, &hash1).unwrap());
        assert!(verify_password(password, &hash2).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(verify_password("whatever", "not-a-phc-hash").is_err());
    }

    #[test]
    fn test_strength_policy() {
        assert!(validate_strength("SecurePass1").is_ok());
        assert!(validate_strength("short").is_err());
        assert!(validate_strength("alllowercase1").is_err());
        assert!(validate_strength("ALLUPPERCASE1").is_err());
        assert!(validate_strength("NoNumbers").is_err());
    }
}
