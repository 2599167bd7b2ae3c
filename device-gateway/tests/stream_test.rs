//! Integration tests for the live event stream against a local WebSocket hub.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use device_gateway::{events, DeviceGatewayClient, GatewayConfig, StreamStatus};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

const WAIT: Duration = Duration::from_secs(5);

/// Start a hub that sends `frames` on every connection, then either closes
/// or stays open until the client leaves. Returns the base URL and a counter
/// of accepted connections.
async fn spawn_hub(frames: Vec<String>, close_after: bool) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let frames = frames.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(tcp).await else {
                    return;
                };
                for frame in frames {
                    if ws.send(Message::Text(frame)).await.is_err() {
                        return;
                    }
                }
                if close_after {
                    let _ = ws.close(None).await;
                    return;
                }
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    (format!("http://{}", addr), accepted)
}

fn client_for(base_url: &str, delay_ms: u64, attempts: u32) -> DeviceGatewayClient {
    let mut config = GatewayConfig::with_base_url(base_url);
    config.stream.reconnect_delay_ms = delay_ms;
    config.stream.max_reconnect_delay_ms = delay_ms * 4;
    config.stream.max_reconnect_attempts = attempts;
    DeviceGatewayClient::new(&config).unwrap()
}

/// Forward every payload of `event` into a channel.
fn record(client: &DeviceGatewayClient, event: &str) -> mpsc::UnboundedReceiver<Value> {
    let (tx, rx) = mpsc::unbounded_channel();
    client.on(event, move |payload| {
        let _ = tx.send(payload.clone());
    });
    rx
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Value>) -> Value {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}

fn frame(kind: &str, payload: Value) -> String {
    json!({ "type": kind, "payload": payload }).to_string()
}

#[tokio::test]
async fn test_connect_emits_connected() {
    let (base_url, _) = spawn_hub(vec![], false).await;
    let client = client_for(&base_url, 50, 3);
    let mut connection = record(&client, events::CONNECTION);

    client.connect().await;

    assert_eq!(next(&mut connection).await, json!({"status": "connected"}));
    assert!(client.is_connected());

    client.disconnect().await;
    assert_eq!(next(&mut connection).await, json!({"status": "disconnected"}));
    assert_eq!(client.status(), StreamStatus::Disconnected);
}

#[tokio::test]
async fn test_device_updates_arrive_in_order() {
    let frames = vec![
        frame(events::DEVICE_UPDATE, json!({"id": "d1", "status": "on"})),
        "this is not json".to_string(),
        frame(events::NOTIFICATION, json!({"message": "Door opened"})),
        frame(events::DEVICE_UPDATE, json!({"id": "d2", "status": "off"})),
    ];
    let (base_url, _) = spawn_hub(frames, false).await;
    let client = client_for(&base_url, 50, 3);
    let mut updates = record(&client, events::DEVICE_UPDATE);
    let mut notifications = record(&client, events::NOTIFICATION);
    let mut errors = record(&client, events::ERROR);

    client.connect().await;

    assert_eq!(next(&mut updates).await["id"], "d1");
    assert_eq!(next(&mut updates).await["id"], "d2");
    assert_eq!(next(&mut notifications).await["message"], "Door opened");

    // The malformed frame was skipped without an error event or a dropped link.
    assert!(errors.try_recv().is_err());
    assert!(client.is_connected());

    client.disconnect().await;
}

#[tokio::test]
async fn test_connect_is_idempotent() {
    let (base_url, accepted) = spawn_hub(vec![], false).await;
    let client = client_for(&base_url, 50, 3);
    let mut connection = record(&client, events::CONNECTION);

    client.connect().await;
    client.connect().await;
    assert_eq!(next(&mut connection).await["status"], "connected");
    client.connect().await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
    assert!(connection.try_recv().is_err());

    client.disconnect().await;
}

#[tokio::test]
async fn test_reconnects_after_server_close() {
    let (base_url, accepted) = spawn_hub(vec![], true).await;
    let client = client_for(&base_url, 50, 5);
    let mut connection = record(&client, events::CONNECTION);

    client.connect().await;

    assert_eq!(next(&mut connection).await["status"], "connected");
    assert_eq!(next(&mut connection).await["status"], "disconnected");
    assert_eq!(next(&mut connection).await["status"], "connected");
    assert!(accepted.load(Ordering::SeqCst) >= 2);

    client.disconnect().await;
}

#[tokio::test]
async fn test_disconnect_cancels_pending_reconnect() {
    let (base_url, accepted) = spawn_hub(vec![], true).await;
    let client = client_for(&base_url, 500, 5);
    let mut connection = record(&client, events::CONNECTION);

    client.connect().await;
    assert_eq!(next(&mut connection).await["status"], "connected");
    assert_eq!(next(&mut connection).await["status"], "disconnected");

    // Waiting out the reconnect delay.
    client.disconnect().await;
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(accepted.load(Ordering::SeqCst), 1);
    assert_eq!(client.status(), StreamStatus::Disconnected);
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr), 10, 2);
    let mut errors = record(&client, events::ERROR);
    let mut status = client.watch_status();

    client.connect().await;

    tokio::time::timeout(WAIT, status.wait_for(|s| *s == StreamStatus::Failed))
        .await
        .expect("stream never gave up")
        .unwrap();

    // The first attempt plus two retries.
    for _ in 0..3 {
        assert!(next(&mut errors).await["message"].is_string());
    }
    assert!(errors.try_recv().is_err());
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_connect_after_failure_starts_over() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr), 10, 0);
    let mut status = client.watch_status();

    client.connect().await;
    tokio::time::timeout(WAIT, status.wait_for(|s| *s == StreamStatus::Failed))
        .await
        .expect("stream never gave up")
        .unwrap();

    // A finished task does not block a fresh connect.
    let mut errors = record(&client, events::ERROR);
    client.connect().await;
    next(&mut errors).await;
}

#[tokio::test]
async fn test_unsubscribed_listener_stops_receiving() {
    let frames = vec![frame(events::DEVICE_UPDATE, json!({"id": "d1"}))];
    let (base_url, _) = spawn_hub(frames, false).await;
    let client = client_for(&base_url, 50, 3);

    let removed = Arc::new(AtomicUsize::new(0));
    let counter = removed.clone();
    let handle = client.on(events::DEVICE_UPDATE, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert!(client.off(events::DEVICE_UPDATE, &handle));

    let mut updates = record(&client, events::DEVICE_UPDATE);
    client.connect().await;

    assert_eq!(next(&mut updates).await["id"], "d1");
    assert_eq!(removed.load(Ordering::SeqCst), 0);

    client.disconnect().await;
}
