//! Session middleware — cookie extraction and session JWT verification.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::AppState;
use crate::error::ApiError;
use crate::services::cookies::SESSION_COOKIE;
use crate::services::session::{SessionClaims, verify_session_token};

/// Key used to store `SessionClaims` in request extensions.
#[derive(Debug, Clone)]
pub struct SessionUser(pub SessionClaims);

/// Axum middleware: reads the session cookie, verifies the JWT, and injects
/// `SessionUser` into request extensions. 401 without a valid session.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".into()))?;

    let claims = verify_session_token(&token, state.config.session_secret.as_bytes())
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".into()))?;

    request.extensions_mut().insert(SessionUser(claims));

    Ok(next.run(request).await)
}
