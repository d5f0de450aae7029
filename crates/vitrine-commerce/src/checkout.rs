//! Transient checkout state.
//!
//! Between "start checkout" and the payment provider's success callback,
//! the contact form and the computed quote live in the user's session.
//! The bundle expires on the same clock as the hosted checkout session,
//! so stale contact details can never leak into a later purchase.

use crate::error::CommerceError;
use crate::pricing::Quote;
use serde::{Deserialize, Serialize};

/// Contact and delivery details captured by the checkout form.
///
/// These are what the purchaser typed for this purchase; they may differ
/// from the account's stored profile and are snapshotted into the order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactDetails {
    /// Recipient name.
    pub full_name: String,
    /// Contact phone number.
    pub phone: String,
    /// Delivery address.
    pub address: String,
    /// Contact email for this purchase.
    pub email: String,
}

impl ContactDetails {
    /// Validate the form fields.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.full_name.trim().is_empty() {
            return Err(CommerceError::Validation("name is required".into()));
        }
        if self.phone.trim().is_empty() {
            return Err(CommerceError::Validation("phone is required".into()));
        }
        if self.address.trim().is_empty() {
            return Err(CommerceError::Validation("address is required".into()));
        }
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') || email.starts_with('@') {
            return Err(CommerceError::Validation("a valid email is required".into()));
        }
        Ok(())
    }
}

/// The checkout state held in the session between start and confirm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutDetails {
    /// Contact/delivery form data.
    pub contact: ContactDetails,
    /// The quote the provider session was created from.
    pub quote: Quote,
    /// The hosted checkout session id; keys order materialization.
    pub payment_ref: String,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp after which this bundle must not be used.
    pub expires_at: i64,
}

impl CheckoutDetails {
    /// Default lifetime, matching the hosted checkout session expiry.
    pub const DEFAULT_TTL_SECS: i64 = 60 * 60;

    /// Create checkout details expiring after the default TTL.
    pub fn new(contact: ContactDetails, quote: Quote, payment_ref: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            contact,
            quote,
            payment_ref: payment_ref.into(),
            created_at: now,
            expires_at: now + Self::DEFAULT_TTL_SECS,
        }
    }

    /// Override the expiry horizon.
    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.expires_at = self.created_at + ttl_secs;
        self
    }

    /// Check whether this bundle has expired.
    pub fn is_expired(&self) -> bool {
        current_timestamp() > self.expires_at
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};

    fn contact() -> ContactDetails {
        ContactDetails {
            full_name: "Asha Rao".into(),
            phone: "9876500000".into(),
            address: "12 Hill Road, Bandra".into(),
            email: "asha@example.com".into(),
        }
    }

    fn quote() -> Quote {
        Quote {
            subtotal: Money::new(2500, Currency::INR),
            tax: Money::new(300, Currency::INR),
            shipping: Money::new(500, Currency::INR),
            final_payable: Money::new(3300, Currency::INR),
            extra_per_unit: 266,
            remainder: 2,
            total_quantity: 3,
            line_items: vec![],
        }
    }

    #[test]
    fn test_contact_validation() {
        assert!(contact().validate().is_ok());

        let mut c = contact();
        c.full_name = "  ".into();
        assert!(c.validate().is_err());

        let mut c = contact();
        c.email = "not-an-email".into();
        assert!(c.validate().is_err());

        let mut c = contact();
        c.email = "@example.com".into();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_expiry() {
        let details = CheckoutDetails::new(contact(), quote(), "cs_123");
        assert!(!details.is_expired());

        let expired = CheckoutDetails::new(contact(), quote(), "cs_124").with_ttl(-1);
        assert!(expired.is_expired());
    }
}
