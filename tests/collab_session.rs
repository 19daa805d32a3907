mod common;

use codehaven_collab::engine::{LoroSharedText, ReplicatedText};
use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn collab_url(addr: SocketAddr, identifier: &str) -> String {
    format!("ws://{addr}/collab/{identifier}")
}

async fn connect(addr: SocketAddr, identifier: &str) -> Client {
    let (client, _) = connect_async(collab_url(addr, identifier)).await.unwrap();
    client
}

async fn refused_status(addr: SocketAddr, identifier: &str) -> u16 {
    match connect_async(collab_url(addr, identifier)).await {
        Err(tungstenite::Error::Http(response)) => response.status().as_u16(),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("connection to {identifier} was accepted"),
    }
}

async fn next_binary(client: &mut Client) -> Vec<u8> {
    loop {
        match client.next().await {
            Some(Ok(Message::Binary(bytes))) => return bytes.to_vec(),
            Some(Ok(_)) => continue,
            other => panic!("expected a binary frame, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn third_client_is_refused_until_a_slot_frees() {
    let store = common::seeded_store("").await;
    let state = common::app_state(store.clone());
    let addr = common::spawn_server(state.clone()).await;

    let mut alice = connect(addr, "room1::main.py").await;
    let _bob = connect(addr, "room1::main.py").await;
    assert_eq!(state.coordinator.admission().count("room1"), 2);

    assert_eq!(refused_status(addr, "room1::main.py").await, 409);
    // a different file in the same room shares the room's slots
    assert_eq!(refused_status(addr, "room1::other.py").await, 409);
    assert_eq!(state.coordinator.admission().count("room1"), 2);

    alice.close(None).await.unwrap();
    let admission = state.coordinator.admission();
    assert!(common::eventually(|| async { admission.count("room1") == 1 }).await);

    let _carol = connect(addr, "room1::main.py").await;
    assert_eq!(state.coordinator.admission().count("room1"), 2);
}

#[tokio::test]
async fn unknown_room_and_malformed_identifier_are_refused() {
    let state = common::app_state(common::seeded_store("").await);
    let addr = common::spawn_server(state.clone()).await;

    assert_eq!(refused_status(addr, "nope::main.py").await, 404);
    assert_eq!(refused_status(addr, "room1").await, 400);
    assert_eq!(state.coordinator.admission().tracked_rooms(), 0);
}

#[tokio::test]
async fn edits_reach_the_peer_and_the_store() {
    let store = common::seeded_store("print('hi')").await;
    let state = common::app_state(store.clone());
    let addr = common::spawn_server(state).await;

    let mut alice = connect(addr, "room1::main.py").await;
    let mut bob = connect(addr, "room1::main.py").await;

    // both start from the stored content
    let replica = LoroSharedText::new("codemirror");
    replica.import(&next_binary(&mut alice).await).unwrap();
    assert_eq!(replica.read_all_text(), "print('hi')");
    let _ = next_binary(&mut bob).await;

    replica.insert(replica.len(), "\nprint('bye')").unwrap();
    alice
        .send(Message::Binary(replica.snapshot().unwrap().into()))
        .await
        .unwrap();

    let seen_by_bob = LoroSharedText::new("codemirror");
    seen_by_bob.import(&next_binary(&mut bob).await).unwrap();
    assert_eq!(seen_by_bob.read_all_text(), "print('hi')\nprint('bye')");

    let persisted = || async {
        store
            .file("room1", "main.py")
            .await
            .is_some_and(|file| file.content == "print('hi')\nprint('bye')")
    };
    assert!(common::eventually(persisted).await);
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let state = common::app_state(common::seeded_store("").await);
    let addr = common::spawn_server(state).await;

    let mut client = connect(addr, "room1::main.py").await;
    let _ = next_binary(&mut client).await;
    client.send(Message::Text("ping".into())).await.unwrap();

    match client.next().await {
        Some(Ok(Message::Text(text))) => assert_eq!(text.as_str(), "pong"),
        other => panic!("expected pong, got {other:?}"),
    }
}

#[tokio::test]
async fn last_client_leaving_deactivates_the_room() {
    let store = common::seeded_store("").await;
    let state = common::app_state(store.clone());
    let addr = common::spawn_server(state.clone()).await;

    let mut alice = connect(addr, "room1::main.py").await;
    let mut bob = connect(addr, "room1::main.py").await;

    alice.close(None).await.unwrap();
    bob.close(None).await.unwrap();

    let deactivated = || async { store.room("room1").await.is_some_and(|room| !room.is_active) };
    assert!(common::eventually(deactivated).await);
    assert_eq!(state.coordinator.admission().tracked_rooms(), 0);
    assert!(common::eventually(|| async { state.hub.open_documents().await == 0 }).await);

    // an inactive room admits nobody
    assert_eq!(refused_status(addr, "room1::main.py").await, 404);
}
