//! # limitwatch_api
//!
//! HTTP API library for Limitwatch: Google sign-in and the owner-scoped
//! contract CRUD surface backing the dashboard.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use axum::Router;
use axum::routing::{get, patch};
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{auth, contracts};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool.
    pub pool: SqlitePool,
    /// API configuration.
    pub config: ApiConfig,
    /// Outbound HTTP client for the Google endpoints.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: ApiConfig) -> Self {
        Self {
            pool,
            config,
            http: reqwest::Client::new(),
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `limitwatch_core::migrate::migrate()` which owns the
/// migration files.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    limitwatch_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no session required)
    let public = Router::new()
        .route("/login", get(auth::login_handler))
        .route("/auth/callback", get(auth::callback_handler))
        .route("/logout", get(auth::logout_handler));

    // Protected routes (require a session)
    let protected = Router::new()
        .route(
            "/api/contracts",
            get(contracts::list_contracts_handler).post(contracts::add_contract_handler),
        )
        .route(
            "/api/contracts/{id}",
            patch(contracts::edit_contract_handler).delete(contracts::delete_contract_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session::require_session,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
