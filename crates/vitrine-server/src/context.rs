//! Per-request context.
//!
//! The session middleware resolves the session cookie once per request
//! and stashes the session in request extensions; [`RequestContext`]
//! then hands handlers an immutable bundle of session, authenticated
//! user, and presented CSRF token. Handlers never mutate shared
//! request-scoped state; they mutate their own copy of the session and
//! save it back through the store.

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use vitrine_auth::{Session, SessionId, UserRecord};

/// Name of the session cookie.
const SESSION_COOKIE: &str = "sid";

/// Header carrying the CSRF token on mutating requests.
const CSRF_HEADER: &str = "x-csrf-token";

/// The session resolved for the current request.
#[derive(Clone)]
pub struct CurrentSession(pub Session);

/// Resolve (or create) the session for an incoming request and set the
/// cookie on the way out when a session was just created.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_id = request
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_session_cookie);

    let loaded = match &cookie_id {
        Some(id) => match state.sessions.load(id).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "session load failed, issuing a fresh session");
                None
            }
        },
        None => None,
    };

    let (session, is_new) = match loaded {
        Some(session) => (session, false),
        None => {
            let session = Session::anonymous();
            if let Err(e) = state.sessions.save(session.clone()).await {
                tracing::warn!(error = %e, "could not persist fresh session");
            }
            (session, true)
        }
    };
    let session_id = session.id.clone();

    request.extensions_mut().insert(CurrentSession(session));
    let mut response = next.run(request).await;

    if is_new {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(&session_id)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Format the session cookie for a session id.
pub fn session_cookie(id: &SessionId) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

fn parse_session_cookie(header: &str) -> Option<SessionId> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("sid="))
        .filter(|v| !v.is_empty())
        .map(SessionId::from)
}

/// Immutable per-request bundle handed to handlers.
pub struct RequestContext {
    /// The request's session, as loaded by the middleware.
    pub session: Session,
    /// The authenticated user, when the session is logged in and the
    /// account still exists.
    pub user: Option<UserRecord>,
    /// CSRF token presented with the request, if any.
    pub csrf_token: Option<String>,
}

impl RequestContext {
    /// The logged-in user, or a 401.
    pub fn require_user(&self) -> Result<&UserRecord, AppError> {
        self.user.as_ref().ok_or(AppError::NotLoggedIn)
    }

    /// The logged-in admin, or a 401/403.
    pub fn require_admin(&self) -> Result<&UserRecord, AppError> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Check the presented CSRF token against the session's.
    pub fn verify_csrf(&self) -> Result<(), AppError> {
        let presented = self.csrf_token.as_deref().ok_or(AppError::Forbidden)?;
        self.session.verify_csrf(presented)?;
        Ok(())
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session middleware not installed".to_string()))?;

        let user = match (session.logged_in, &session.user_id) {
            (true, Some(user_id)) => state.users.find(user_id).await?,
            _ => None,
        };

        let csrf_token = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(Self {
            session,
            user,
            csrf_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_cookie() {
        assert_eq!(
            parse_session_cookie("sid=sess_abc; theme=dark"),
            Some(SessionId::from("sess_abc"))
        );
        assert_eq!(
            parse_session_cookie("theme=dark;  sid=sess_xyz"),
            Some(SessionId::from("sess_xyz"))
        );
        assert_eq!(parse_session_cookie("theme=dark"), None);
        assert_eq!(parse_session_cookie("sid="), None);
    }

    #[test]
    fn test_session_cookie_format() {
        let cookie = session_cookie(&SessionId::from("sess_abc"));
        assert!(cookie.starts_with("sid=sess_abc;"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_require_user() {
        let ctx = RequestContext {
            session: Session::anonymous(),
            user: None,
            csrf_token: None,
        };
        assert!(matches!(ctx.require_user(), Err(AppError::NotLoggedIn)));
        assert!(matches!(ctx.require_admin(), Err(AppError::NotLoggedIn)));
    }

    #[test]
    fn test_require_admin_rejects_customer() {
        let user = UserRecord::new("a@example.com", "hash");
        let ctx = RequestContext {
            session: Session::anonymous(),
            user: Some(user),
            csrf_token: None,
        };
        assert!(ctx.require_user().is_ok());
        assert!(matches!(ctx.require_admin(), Err(AppError::Forbidden)));
    }

    #[test]
    fn test_csrf_check() {
        let session = Session::anonymous();
        let token = session.csrf_token.clone();

        let ctx = RequestContext {
            session: session.clone(),
            user: None,
            csrf_token: Some(token),
        };
        assert!(ctx.verify_csrf().is_ok());

        let missing = RequestContext {
            session: session.clone(),
            user: None,
            csrf_token: None,
        };
        assert!(matches!(missing.verify_csrf(), Err(AppError::Forbidden)));

        let wrong = RequestContext {
            session,
            user: None,
            csrf_token: Some("nope".to_string()),
        };
        assert!(matches!(wrong.verify_csrf(), Err(AppError::Forbidden)));
    }
}
