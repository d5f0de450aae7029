//! Authentication handlers: signup, login, logout, password reset.

use crate::context::{session_cookie, RequestContext};
use crate::error::AppError;
use crate::mailer::{reset_email, send_in_background, welcome_email};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use vitrine_auth::{hash_password, validate_strength, verify_password, AuthError, ResetToken};
use vitrine_auth::UserRecord;
use vitrine_commerce::ids::UserId;
use vitrine_store::StoreError;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub logged_in: bool,
    pub email: Option<String>,
    pub is_admin: bool,
    pub csrf_token: String,
    pub flash: Option<String>,
}

/// `GET /session` — what the client needs to render chrome and submit
/// forms: login state, the CSRF token, and any queued flash message.
pub async fn session_info(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<SessionInfo>, AppError> {
    let mut session = ctx.session;
    let flash = session.take_flash();
    if flash.is_some() {
        state.sessions.save(session.clone()).await?;
    }
    Ok(Json(SessionInfo {
        logged_in: session.logged_in,
        email: ctx.user.as_ref().map(|u| u.email.clone()),
        is_admin: ctx.user.as_ref().is_some_and(|u| u.is_admin()),
        csrf_token: session.csrf_token,
        flash,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// `POST /signup` — create an account and send the welcome email.
pub async fn signup(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<SignupForm>,
) -> Result<Json<MessageResponse>, AppError> {
    ctx.verify_csrf()?;

    let email = form.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') || email.starts_with('@') {
        return Err(AppError::Validation("Please enter a valid email.".to_string()));
    }
    if form.password != form.confirm_password {
        return Err(AppError::Validation("Passwords have to match!".to_string()));
    }
    validate_strength(&form.password)?;

    let hash = hash_password(&form.password)?;
    let user = UserRecord::new(email.clone(), hash);
    state.users.insert(user).await.map_err(|e| match e {
        StoreError::Duplicate(_) => AppError::from(AuthError::UserAlreadyExists(email.clone())),
        other => other.into(),
    })?;

    send_in_background(
        state.mailer.clone(),
        welcome_email(&state.config.base_url, &email),
    );
    tracing::info!(%email, "account created");
    Ok(Json(MessageResponse {
        message: "Signup successful. Please log in.".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    /// The rotated CSRF token for the authenticated session.
    pub csrf_token: String,
}

/// `POST /login` — verify credentials and rotate the session.
///
/// Unknown email and wrong password produce the same message.
pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    ctx.verify_csrf()?;

    let user = state
        .users
        .find_by_email(form.email.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)
        .map_err(AppError::from)?;

    if !verify_password(&form.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let old_id = ctx.session.id.clone();
    let mut session = ctx.session;
    session.authenticate(user.id.clone());
    state.sessions.destroy(&old_id).await?;
    state.sessions.save(session.clone()).await?;

    tracing::info!(user = %user.id, "login");
    Ok((
        [(SET_COOKIE, session_cookie(&session.id))],
        Json(LoginResponse {
            message: "Logged in.".to_string(),
            csrf_token: session.csrf_token,
        }),
    ))
}

/// `POST /logout` — destroy the session and expire the cookie.
pub async fn logout(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    ctx.verify_csrf()?;
    state.sessions.destroy(&ctx.session.id).await?;
    Ok((
        [(SET_COOKIE, "sid=; Path=/; HttpOnly; Max-Age=0".to_string())],
        Json(MessageResponse {
            message: "Logged out.".to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ResetRequestForm {
    pub email: String,
}

/// `POST /reset` — issue a reset token and email the link.
pub async fn request_reset(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<ResetRequestForm>,
) -> Result<Json<MessageResponse>, AppError> {
    ctx.verify_csrf()?;

    let mut user = state
        .users
        .find_by_email(form.email.trim())
        .await?
        .ok_or_else(|| AppError::Validation("No account with that email found!".to_string()))?;

    let token = ResetToken::generate();
    let token_value = token.token.clone();
    user.set_reset_token(token);
    state.users.update(user.clone()).await?;

    send_in_background(
        state.mailer.clone(),
        reset_email(&state.config.base_url, &user.email, &token_value),
    );
    tracing::info!(user = %user.id, "password reset requested");
    Ok(Json(MessageResponse {
        message: "Password reset email sent.".to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct ResetTokenResponse {
    pub user_id: String,
    pub token: String,
}

/// `GET /reset/{token}` — validate a reset link before showing the
/// new-password form.
pub async fn reset_token_info(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ResetTokenResponse>, AppError> {
    let user = state
        .users
        .find_by_reset_token(&token)
        .await?
        .filter(|u| u.reset_token.as_ref().is_some_and(|t| t.accepts(&token)))
        .ok_or(AuthError::InvalidToken)
        .map_err(AppError::from)?;

    Ok(Json(ResetTokenResponse {
        user_id: user.id.to_string(),
        token,
    }))
}

#[derive(Debug, Deserialize)]
pub struct NewPasswordForm {
    pub user_id: String,
    pub token: String,
    pub password: String,
}

/// `POST /reset/confirm` — set the new password and burn the token.
pub async fn confirm_reset(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(form): Json<NewPasswordForm>,
) -> Result<Json<MessageResponse>, AppError> {
    ctx.verify_csrf()?;

    let mut user = state
        .users
        .find(&UserId::new(form.user_id))
        .await?
        .ok_or(AuthError::InvalidToken)
        .map_err(AppError::from)?;

    let accepted = user
        .reset_token
        .as_ref()
        .is_some_and(|t| t.accepts(&form.token));
    if !accepted {
        return Err(AuthError::InvalidToken.into());
    }

    validate_strength(&form.password)?;
    let hash = hash_password(&form.password)?;
    user.set_password_hash(hash);
    user.clear_reset_token();
    state.users.update(user).await?;

    Ok(Json(MessageResponse {
        message: "Password updated. Please log in.".to_string(),
    }))
}
