//! Google sign-in request handlers.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::services::cookies::{
    OAUTH_STATE_COOKIE, clear_oauth_state_cookie, clear_session_cookie, oauth_state_cookie,
    session_cookie,
};
use crate::services::google;
use crate::services::session::generate_session_token;

/// Query parameters for the OAuth callback.
#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// `GET /login` — redirect to Google's consent screen.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Redirect)> {
    let oauth_state: String = rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();

    let url = google::authorization_url(
        &state.config.google_auth_url,
        &state.config.google_client_id,
        &state.config.redirect_uri,
        &oauth_state,
    )?;

    Ok((
        jar.add(oauth_state_cookie(&oauth_state)),
        Redirect::temporary(&url),
    ))
}

/// `GET /auth/callback` — exchange the authorization code, look up the
/// user's identity, and set the session cookie.
pub async fn callback_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> ApiResult<(CookieJar, Redirect)> {
    let expected_state = jar
        .get(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("Missing OAuth state".into()))?;
    if params.state.as_deref() != Some(expected_state.as_str()) {
        return Err(ApiError::Unauthorized("OAuth state mismatch".into()));
    }

    let code = params
        .code
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization code".into()))?;

    let tokens = google::exchange_authorization_code(
        &state.http,
        &state.config.google_token_url,
        &state.config.google_client_id,
        &state.config.google_client_secret,
        &code,
        &state.config.redirect_uri,
    )
    .await?;

    let user = google::fetch_userinfo(
        &state.http,
        &state.config.google_userinfo_url,
        &tokens.access_token,
    )
    .await?;

    info!(google_id = %user.sub, "user signed in");

    let token = generate_session_token(
        &user.sub,
        user.name.as_deref(),
        user.email.as_deref(),
        state.config.session_secret.as_bytes(),
    )?;

    Ok((
        jar.remove(clear_oauth_state_cookie())
            .add(session_cookie(&token)),
        Redirect::temporary("/dashboard"),
    ))
}

/// `GET /logout` — clear the session and go back to the dashboard.
pub async fn logout_handler(jar: CookieJar) -> (CookieJar, Redirect) {
    (
        jar.remove(clear_session_cookie()),
        Redirect::temporary("/dashboard"),
    )
}
