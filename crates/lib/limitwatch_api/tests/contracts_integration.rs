//! Integration tests — in-memory SQLite, real router, oneshot requests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use limitwatch_api::config::ApiConfig;
use limitwatch_api::services::session::generate_session_token;
use limitwatch_api::{AppState, router};

const SECRET: &str = "test-secret";

async fn test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    limitwatch_api::migrate(&pool).await.expect("migrations");

    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        session_secret: SECRET.into(),
        google_client_id: "test-client".into(),
        google_client_secret: "test-secret".into(),
        redirect_uri: "http://127.0.0.1:0/auth/callback".into(),
        google_auth_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
        google_token_url: "https://oauth2.googleapis.com/token".into(),
        google_userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".into(),
    };
    router(AppState::new(pool, config))
}

fn session_cookie_for(google_id: &str) -> String {
    let token =
        generate_session_token(google_id, Some("Test User"), None, SECRET.as_bytes()).unwrap();
    format!("limitwatch_session={token}")
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn create_request(cookie: &str, name: &str, limit: i64) -> Request<Body> {
    let body = format!(
        "name={name}&sfmc_subdomain=mc1&client_id=cid&client_secret=shh\
         &de_key=contacts_de&contacts_limit={limit}&slack_users_ids=U1,U2"
    );
    Request::builder()
        .method("POST")
        .uri("/api/contracts")
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn contracts_require_a_session() {
    let app = test_app().await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/contracts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn crud_round_trip() {
    let app = test_app().await;
    let cookie = session_cookie_for("g-owner");

    // Create
    let resp = app
        .clone()
        .oneshot(create_request(&cookie, "Acme", 100))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    assert_eq!(created["success"], true);
    let id = created["id"].as_i64().expect("id");

    // List
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/contracts")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let list = json_body(resp).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Acme");
    assert_eq!(list[0]["contacts_amount"], 0);
    assert_eq!(list[0]["last_checked"], serde_json::Value::Null);
    assert_eq!(list[0]["slack_users_ids"], serde_json::json!(["U1", "U2"]));

    // Patch
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/contracts/{id}"))
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"contacts_limit": 500}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Delete
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/contracts/{id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/contracts")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let list = json_body(resp).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn foreign_contract_is_not_found() {
    let app = test_app().await;
    let owner = session_cookie_for("g-owner");
    let stranger = session_cookie_for("g-stranger");

    let resp = app
        .clone()
        .oneshot(create_request(&owner, "Acme", 100))
        .await
        .unwrap();
    let id = json_body(resp).await["id"].as_i64().unwrap();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/contracts/{id}"))
                .header(header::COOKIE, &stranger)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "Hijacked"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/contracts/{id}"))
                .header(header::COOKIE, &stranger)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_patch_is_rejected() {
    let app = test_app().await;
    let cookie = session_cookie_for("g-owner");

    let resp = app
        .clone()
        .oneshot(create_request(&cookie, "Acme", 100))
        .await
        .unwrap();
    let id = json_body(resp).await["id"].as_i64().unwrap();

    let resp = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/contracts/{id}"))
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_limit_is_rejected() {
    let app = test_app().await;
    let cookie = session_cookie_for("g-owner");

    let resp = app
        .oneshot(create_request(&cookie, "Acme", -5))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
