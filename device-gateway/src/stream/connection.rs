//! Stream task: connect, relay frames, reconnect.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use smart_home_common::{events, ConnectionEvent, StreamStatus, WebSocketMessage};

use super::backoff::{Backoff, ReconnectPolicy};
use crate::bus::EventBus;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a connected session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The server closed or the link dropped; reconnect.
    Dropped,
    /// The client asked to stop.
    Shutdown,
}

/// Everything the background task needs. Consumed by [`StreamHandle::spawn`].
pub(crate) struct StreamTask {
    pub(crate) url: Url,
    pub(crate) bus: Arc<EventBus>,
    pub(crate) policy: ReconnectPolicy,
    pub(crate) status: Arc<watch::Sender<StreamStatus>>,
}

/// Owned handle to a running stream task.
///
/// Cancelling the token closes an open socket and stops any pending
/// reconnect. Dropping the handle cancels too.
pub(crate) struct StreamHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl StreamHandle {
    pub(crate) fn spawn(task: StreamTask) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(task.run(cancel.clone()));
        Self { cancel, task }
    }

    /// True while connected or waiting to reconnect.
    pub(crate) fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the task and wait for it to wind down.
    pub(crate) async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Err(e) = (&mut self.task).await {
            tracing::warn!("Stream task ended abnormally: {}", e);
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl StreamTask {
    async fn run(self, cancel: CancellationToken) {
        let mut backoff = Backoff::new(self.policy);

        loop {
            tracing::info!("Connecting to device stream at {}", self.url);

            let attempt = tokio::select! {
                result = connect_async(self.url.as_str()) => result,
                _ = cancel.cancelled() => return,
            };

            match attempt {
                Ok((socket, _)) => {
                    backoff.reset();
                    self.set_status(StreamStatus::Connected);

                    let end = self.session(socket, &cancel).await;
                    self.set_status(StreamStatus::Disconnected);

                    if end == SessionEnd::Shutdown {
                        tracing::info!("Device stream closed");
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!("Connection to device stream failed: {}", e);
                    self.emit_error(&e.to_string());
                }
            }

            let Some(delay) = backoff.next_delay() else {
                tracing::error!(
                    "Giving up on device stream after {} reconnect attempts",
                    backoff.attempt()
                );
                self.set_status(StreamStatus::Failed);
                return;
            };

            tracing::info!(
                "Reconnecting in {:?} (attempt {})...",
                delay,
                backoff.attempt()
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return,
            }
        }
    }

    /// Relay frames until the link drops or `cancel` fires.
    async fn session(&self, socket: Socket, cancel: &CancellationToken) -> SessionEnd {
        let (mut write, mut read) = socket.split();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        tracing::debug!("Failed to send close frame: {}", e);
                    }
                    return SessionEnd::Shutdown;
                }

                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        dispatch_frame(&self.bus, &text);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            tracing::warn!("Failed to answer ping: {}", e);
                            self.emit_error(&e.to_string());
                            return SessionEnd::Dropped;
                        }
                    }
                    Some(Ok(Message::Close(reason))) => {
                        tracing::info!("Hub closed the stream: {:?}", reason);
                        return SessionEnd::Dropped;
                    }
                    Some(Ok(_)) => {} // Binary and pong frames carry no events
                    Some(Err(e)) => {
                        tracing::warn!("Device stream error: {}", e);
                        self.emit_error(&e.to_string());
                        return SessionEnd::Dropped;
                    }
                    None => return SessionEnd::Dropped,
                },
            }
        }
    }

    fn set_status(&self, status: StreamStatus) {
        self.status.send_replace(status);
        self.bus.emit(events::CONNECTION, &json!(ConnectionEvent { status }));
    }

    fn emit_error(&self, message: &str) {
        self.bus.emit(events::ERROR, &json!({ "message": message }));
    }
}

/// Parse one text frame and hand its payload to the subscribers of its type.
///
/// Malformed frames are logged and dropped. Returns the number of listeners
/// that ran, or `None` if the frame was dropped.
pub(crate) fn dispatch_frame(bus: &EventBus, text: &str) -> Option<usize> {
    let message: WebSocketMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Dropping malformed stream frame: {}. Payload: {}", e, text);
            return None;
        }
    };

    tracing::debug!("Stream event '{}'", message.kind);
    Some(bus.emit(&message.kind, &message.payload))
}
