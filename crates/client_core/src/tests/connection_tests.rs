use std::time::Duration;

use shared::domain::{Message, User};

use super::*;
use crate::test_support::{TestTransport, WAIT};

fn chat(id: i64, value: &str) -> ServerEvent {
    ServerEvent::Message(Message {
        id,
        user: "Bob".to_string(),
        value: value.to_string(),
    })
}

async fn next(manager: &mut ConnectionManager) -> ServerEvent {
    tokio::time::timeout(WAIT, manager.next_event())
        .await
        .expect("event timeout")
        .expect("event stream open")
}

#[tokio::test]
async fn connect_opens_transport_with_given_credentials() {
    let (transport, opened) = TestTransport::new();
    let mut manager = ConnectionManager::new(transport);

    manager.connect(ConnectAuth::session("abc"));
    let server = opened.next().await;

    assert_eq!(server.auth, ConnectAuth::session("abc"));
    assert_eq!(manager.generation(), 1);
}

#[tokio::test]
async fn delivers_events_in_transport_order() {
    let (transport, opened) = TestTransport::new();
    let mut manager = ConnectionManager::new(transport);
    manager.connect(ConnectAuth::nickname("alice"));
    let server = opened.next().await;

    server.push(chat(1, "one"));
    server.push(ServerEvent::PeerJoined {
        user: User::with_username("carol"),
    });
    server.push(chat(2, "two"));

    assert_eq!(next(&mut manager).await, chat(1, "one"));
    assert!(matches!(
        next(&mut manager).await,
        ServerEvent::PeerJoined { .. }
    ));
    assert_eq!(next(&mut manager).await, chat(2, "two"));
}

#[tokio::test]
async fn requests_sent_before_open_are_delivered_once_open() {
    let (transport, opened) = TestTransport::new();
    let mut manager = ConnectionManager::new(transport);
    manager.connect(ConnectAuth::nickname("alice"));

    manager.send(ClientRequest::Join {
        user: User::with_username("alice"),
    });
    let mut server = opened.next().await;

    assert_eq!(server.next_request().await.kind(), "join");
}

#[tokio::test]
async fn reconnect_suppresses_events_from_superseded_channel() {
    let (transport, opened) = TestTransport::new();
    let mut manager = ConnectionManager::new(transport);

    manager.connect(ConnectAuth::nickname("alice"));
    let first = opened.next().await;
    first.push(chat(1, "current"));
    assert_eq!(next(&mut manager).await, chat(1, "current"));

    // Let the first pump forward this into the queue before reconnecting.
    first.push(chat(2, "stale"));
    tokio::time::sleep(Duration::from_millis(50)).await;

    manager.connect(ConnectAuth::session("abc"));
    let second = opened.next().await;
    first.push(chat(3, "late stale"));
    second.push(chat(4, "fresh"));

    assert_eq!(next(&mut manager).await, chat(4, "fresh"));
    assert_eq!(manager.generation(), 2);
}

#[tokio::test]
async fn reconnect_routes_sends_to_new_channel_only() {
    let (transport, opened) = TestTransport::new();
    let mut manager = ConnectionManager::new(transport);

    manager.connect(ConnectAuth::nickname("alice"));
    let mut first = opened.next().await;
    manager.connect(ConnectAuth::nickname("alice"));
    let mut second = opened.next().await;

    manager.send(ClientRequest::Join {
        user: User::with_username("alice"),
    });

    assert_eq!(second.next_request().await.kind(), "join");
    // The first channel's pump was aborted, so its request queue is closed.
    assert!(tokio::time::timeout(WAIT, first.requests.recv())
        .await
        .expect("closed promptly")
        .is_none());
}

#[tokio::test]
async fn disconnect_discards_queued_events() {
    let (transport, opened) = TestTransport::new();
    let mut manager = ConnectionManager::new(transport);
    manager.connect(ConnectAuth::nickname("alice"));
    let server = opened.next().await;

    server.push(chat(1, "queued"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    manager.disconnect();

    assert!(!manager.is_connected());
    assert!(
        tokio::time::timeout(Duration::from_millis(100), manager.next_event())
            .await
            .is_err(),
        "no event should be delivered after disconnect"
    );
}

#[tokio::test]
async fn send_without_channel_is_dropped() {
    let (transport, opened) = TestTransport::new();
    let manager = ConnectionManager::new(transport);

    manager.send(ClientRequest::Join {
        user: User::with_username("alice"),
    });

    assert!(!manager.is_connected());
    assert!(opened.none_pending().await);
}

#[tokio::test]
async fn failed_open_does_not_panic_or_deliver() {
    let mut manager = ConnectionManager::new(TestTransport::failing("connection refused"));
    manager.connect(ConnectAuth::nickname("alice"));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!manager.is_connected());
    manager.send(ClientRequest::Join {
        user: User::with_username("alice"),
    });
    assert!(
        tokio::time::timeout(Duration::from_millis(100), manager.next_event())
            .await
            .is_err()
    );
}
