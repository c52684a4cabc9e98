//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use supertoe_core::clock::Clock;
use supertoe_core::store::StateStore;
use supertoe_game::application::service::{GameService, GameSettings};
use supertoe_store::InMemoryStateStore;
use tower::ServiceExt;

use supertoe_api::broadcast::ChannelBroadcaster;
use supertoe_api::routes;
use supertoe_api::state::AppState;

/// Cooldown used across all integration tests.
pub const COOLDOWN_SECONDS: u32 = 2;

/// Fixed starting timestamp used across all integration tests.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// Build application state around `clock` and `store`.
pub fn build_state(clock: Arc<dyn Clock>, store: Arc<dyn StateStore>) -> AppState {
    let broadcaster = Arc::new(ChannelBroadcaster::new(64));
    let settings = GameSettings {
        key: "integration".to_owned(),
        move_cooldown_seconds: COOLDOWN_SECONDS,
    };
    let game = GameService::new(settings, clock, store, broadcaster.clone());
    AppState::new(Arc::new(game), broadcaster)
}

/// Build the full app router over an in-memory store. Uses the same route
/// structure as `main.rs`.
pub fn build_test_app(clock: Arc<dyn Clock>) -> Router {
    routes::app(build_state(clock, Arc::new(InMemoryStateStore::new())))
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get_raw(app, uri).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    (status, json)
}

/// Send a GET request and return the raw body.
pub async fn get_raw(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, body_bytes.to_vec())
}
