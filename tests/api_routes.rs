mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use codehaven_collab::collab::ConnectionId;
use codehaven_collab::routes::create_app;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let state = common::app_state(common::seeded_store("").await);
    let (status, body) = get_json(create_app(state, &[]), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ready_follows_the_store() {
    let store = common::seeded_store("").await;
    let state = common::app_state(store.clone());

    let (status, _) = get_json(create_app(state.clone(), &[]), "/api/ready").await;
    assert_eq!(status, StatusCode::OK);

    store.set_failing(true);
    let (status, body) = get_json(create_app(state, &[]), "/api/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], 503);
}

#[tokio::test]
async fn capacity_reflects_live_connections() {
    let state = common::app_state(common::seeded_store("").await);

    let (_, body) = get_json(create_app(state.clone(), &[]), "/api/v1/rooms/room1/capacity").await;
    assert_eq!(body["connections"], 0);
    assert_eq!(body["hasSpace"], true);

    for _ in 0..2 {
        state
            .coordinator
            .on_connect("room1::main.py", ConnectionId::next())
            .await
            .unwrap();
    }
    let (status, body) = get_json(create_app(state, &[]), "/api/v1/rooms/room1/capacity").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roomId"], "room1");
    assert_eq!(body["connections"], 2);
    assert_eq!(body["capacity"], 2);
    assert_eq!(body["hasSpace"], false);
}

#[tokio::test]
async fn diagnostics_counts_connections() {
    let state = common::app_state(common::seeded_store("").await);
    state
        .coordinator
        .on_connect("room1::main.py", ConnectionId::next())
        .await
        .unwrap();

    let (status, body) = get_json(create_app(state, &[]), "/api/v1/diagnostics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["n_conn"], 1);
    assert_eq!(body["n_rooms"], 1);
    assert_eq!(body["room_capacity"], 2);
}
