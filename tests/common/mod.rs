#![allow(dead_code)]

use chrono::Utc;
use codehaven_collab::collab::CollabSettings;
use codehaven_collab::db::{FileRecord, MemoryStore, RoomMember, RoomRecord};
use codehaven_collab::routes::create_app;
use codehaven_collab::AppState;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Store with `room1` (one inactive member) holding `main.py`
pub async fn seeded_store(content: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_room(RoomRecord::new(
            "room1",
            vec![RoomMember { user_id: "u1".to_string(), is_active: false }],
            Utc::now(),
        ))
        .await;
    store
        .insert_file(FileRecord::new(Some("room1"), "main.py", content, Utc::now()))
        .await;
    store
}

pub fn app_state(store: Arc<MemoryStore>) -> AppState {
    AppState::new(store, CollabSettings::default())
}

/// Serve the full app on an ephemeral port
pub async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app(state, &[]);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Poll `check` until it holds or two seconds pass
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
