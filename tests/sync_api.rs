//! End-to-end tests for the sync and statistics API
//!
//! Builds the full router against an in-memory database, with sessions seeded
//! directly through the repositories.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use slidetimer_server::app;
use slidetimer_server::config::Config;
use slidetimer_server::db::{
    initialize_schema, ProviderProfile, SessionRepository, UserRepository,
};
use slidetimer_server::state::AppState;

async fn setup() -> (TestServer, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();
    initialize_schema(&pool).await.unwrap();

    let state = AppState::new(Config::default(), pool.clone());
    let server = TestServer::new(app(state)).unwrap();
    (server, pool)
}

/// Create a user and a live session, returning the session token
async fn login(pool: &SqlitePool, uid: &str) -> String {
    let profile = ProviderProfile {
        provider: "google".to_string(),
        uid: uid.to_string(),
        name: format!("User {}", uid),
        avatar_url: None,
        access_token: "access".to_string(),
        refresh_token: None,
    };

    let user = UserRepository::new(pool).upsert(&profile).await.unwrap();
    SessionRepository::new(pool).create(&user.id).await.unwrap()
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

fn api_version() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("api-version"),
        HeaderValue::from_static("1"),
    )
}

#[tokio::test]
async fn test_health_check() {
    let (server, _pool) = setup().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_sync_requires_a_session() {
    let (server, _pool) = setup().await;

    let response = server.post("/sync").json(&json!([])).await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let (name, value) = bearer("not-a-real-token");
    let response = server
        .post("/sync")
        .add_header(name, value)
        .json(&json!([]))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_push_then_pull_round_trip() {
    let (server, pool) = setup().await;
    let token = login(&pool, "u-1").await;

    let (name, value) = bearer(&token);
    let response = server
        .put("/sync")
        .add_header(name.clone(), value.clone())
        .json(&json!([
            {"startTime": 1, "event": "3x3", "time": 10_000, "moves": []},
            {
                "startTime": 2,
                "event": "3x3",
                "time": 12_000,
                "moves": [{"axis": "row", "index": 0, "n": 1, "time": 9000}],
            },
        ]))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    // Client already holds solve 1: only solve 2 comes back, nothing missing
    let response = server
        .post("/sync")
        .add_header(name.clone(), value.clone())
        .json(&json!([1]))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["missing"], json!([]));
    assert_eq!(body["solves"].as_array().unwrap().len(), 1);
    assert_eq!(body["solves"][0]["startTime"], 2);
    // Verbose client (no api-version header) gets the move objects back
    assert_eq!(
        body["solves"][0]["moves"],
        json!([{"axis": "row", "index": 0, "n": 1, "time": 9000}])
    );

    // Ids the server has never seen are reported back for re-push
    let response = server
        .post("/sync")
        .add_header(name, value)
        .json(&json!([1, 2, 999]))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["missing"], json!([999]));
    assert_eq!(body["solves"], json!([]));
}

#[tokio::test]
async fn test_encoded_clients_get_tuples() {
    let (server, pool) = setup().await;
    let token = login(&pool, "u-1").await;
    let (auth_name, auth_value) = bearer(&token);

    // Push from an old verbose client
    let response = server
        .put("/sync")
        .add_header(auth_name.clone(), auth_value.clone())
        .json(&json!([{
            "startTime": 5,
            "event": "3x3",
            "time": 9000,
            "moves": [
                {"axis": "row", "index": 0, "n": 1, "time": 4000},
                {"axis": "col", "index": 2, "n": -1, "time": 9000},
            ],
        }]))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    // Pull from a new client: compact tuples with time deltas
    let (version_name, version_value) = api_version();
    let response = server
        .post("/sync")
        .add_header(auth_name, auth_value)
        .add_header(version_name, version_value)
        .json(&json!([]))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(
        body["solves"][0]["moves"],
        json!([[0, 0, 1, 4000], [1, 2, -1, 5000]])
    );
}

#[tokio::test]
async fn test_push_rejects_identity_field_and_aborts_batch() {
    let (server, pool) = setup().await;
    let token = login(&pool, "u-1").await;
    let (name, value) = bearer(&token);

    let response = server
        .put("/sync")
        .add_header(name.clone(), value.clone())
        .json(&json!([
            {"startTime": 1, "event": "3x3", "time": 10_000, "moves": []},
            {"id": "row-7", "startTime": 2, "event": "3x3", "time": 11_000, "moves": []},
        ]))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Nothing from the batch may have been stored
    let response = server
        .post("/sync")
        .add_header(name, value)
        .json(&json!([]))
        .await;
    assert_eq!(response.json::<Value>()["solves"], json!([]));
}

#[tokio::test]
async fn test_push_rejects_non_numeric_start_time() {
    let (server, pool) = setup().await;
    let token = login(&pool, "u-1").await;
    let (name, value) = bearer(&token);

    let response = server
        .put("/sync")
        .add_header(name.clone(), value.clone())
        .json(&json!([{"startTime": "yesterday", "event": "3x3", "moves": []}]))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .put("/sync")
        .add_header(name, value)
        .json(&json!([{"event": "3x3", "moves": []}]))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_push_rejects_non_array_body() {
    let (server, pool) = setup().await;
    let token = login(&pool, "u-1").await;
    let (name, value) = bearer(&token);

    let response = server
        .put("/sync")
        .add_header(name, value)
        .json(&json!({"startTime": 1}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (server, pool) = setup().await;
    let token = login(&pool, "u-1").await;
    let (name, value) = bearer(&token);

    server
        .put("/sync")
        .add_header(name.clone(), value.clone())
        .json(&json!([
            {"startTime": 1, "event": "3x3", "time": 10_000, "moves": []},
            {"startTime": 2, "event": "3x3", "time": 12_000, "moves": []},
        ]))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = server
        .delete("/sync")
        .add_header(name.clone(), value.clone())
        .json(&json!([1, 99]))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    // Deleting the same ids again is a no-op, not an error
    let response = server
        .delete("/sync")
        .add_header(name.clone(), value.clone())
        .json(&json!([1, 99]))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server
        .post("/sync")
        .add_header(name, value)
        .json(&json!([]))
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["solves"].as_array().unwrap().len(), 1);
    assert_eq!(body["solves"][0]["startTime"], 2);
}

#[tokio::test]
async fn test_delete_rejects_non_array_body() {
    let (server, pool) = setup().await;
    let token = login(&pool, "u-1").await;
    let (name, value) = bearer(&token);

    let response = server
        .delete("/sync")
        .add_header(name, value)
        .json(&json!({"startTime": 1}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users_cannot_see_each_others_solves() {
    let (server, pool) = setup().await;
    let token_a = login(&pool, "u-a").await;
    let token_b = login(&pool, "u-b").await;

    let (name, value) = bearer(&token_a);
    server
        .put("/sync")
        .add_header(name, value)
        .json(&json!([{"startTime": 1, "event": "3x3", "time": 10_000, "moves": []}]))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    // User B sees none of A's solves; A's id reads as missing from B's store
    let (name, value) = bearer(&token_b);
    let response = server
        .post("/sync")
        .add_header(name, value)
        .json(&json!([1]))
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["solves"], json!([]));
    assert_eq!(body["missing"], json!([1]));
}

#[tokio::test]
async fn test_statistics_are_public_and_normalized() {
    let (server, pool) = setup().await;
    let token_a = login(&pool, "u-a").await;
    let token_b = login(&pool, "u-b").await;

    let (name, value) = bearer(&token_a);
    server
        .put("/sync")
        .add_header(name, value)
        .json(&json!([
            {"startTime": 1, "event": "3x3", "time": 10_000, "moves": []},
            {"startTime": 2, "event": "3x3", "time": 12_000, "moves": []},
            {"startTime": 3, "event": "3x3", "dnf": true, "moves": []},
        ]))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let (name, value) = bearer(&token_b);
    server
        .put("/sync")
        .add_header(name, value)
        .json(&json!([{"startTime": 4, "event": "3x3", "time": 20_000, "moves": []}]))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    // No session token: statistics are a public aggregate
    let response = server.get("/statistics/3x3/time").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    let labels = body["labels"].as_array().unwrap();
    let data = body["data"].as_array().unwrap();
    assert_eq!(labels.len(), data.len());
    assert!(!labels.is_empty());

    let values: Vec<f64> = data.iter().map(|v| v.as_f64().unwrap()).collect();
    assert!(values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert!(values.iter().any(|&v| v == 1.0));
}

#[tokio::test]
async fn test_statistics_with_insufficient_data() {
    let (server, _pool) = setup().await;

    let response = server.get("/statistics/7x7/time").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"labels": [], "data": []})
    );
}

#[tokio::test]
async fn test_statistics_reject_unknown_kind() {
    let (server, _pool) = setup().await;

    let response = server.get("/statistics/3x3/median").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_returns_the_session_profile() {
    let (server, pool) = setup().await;
    let token = login(&pool, "u-1").await;

    let (name, value) = bearer(&token);
    let response = server.get("/me").add_header(name, value).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], "User u-1");
}
