//! Cookie service — set/clear the httpOnly session cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Cookie name for the session token.
pub const SESSION_COOKIE: &str = "limitwatch_session";

/// Cookie name for the OAuth CSRF state, set during the login redirect.
pub const OAUTH_STATE_COOKIE: &str = "limitwatch_oauth_state";

/// Build a httpOnly cookie for the session token (7 days).
pub fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), token.to_string()))
        .http_only(true)
        .secure(false) // TODO: set true in production
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::days(7))
        .build()
}

/// Build an expired cookie to clear the session.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Build a short-lived httpOnly cookie holding the OAuth state value.
pub fn oauth_state_cookie(state: &str) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE.to_string(), state.to_string()))
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::minutes(10))
        .build()
}

/// Build an expired cookie to clear the OAuth state.
pub fn clear_oauth_state_cookie() -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE.to_string(), String::new()))
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
