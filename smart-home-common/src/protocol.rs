//! Wire envelopes for the device hub.
//!
//! # REST
//!
//! Every request made by the gateway client resolves to an [`ApiResponse`],
//! whether the call succeeded or not. Transport failures, error statuses and
//! undecodable bodies all end up as `success: false` with a message.
//!
//! # Stream
//!
//! The hub pushes JSON frames over one WebSocket at `<base>/ws`. Each frame is
//! a [`WebSocketMessage`] whose `type` names the event and whose `payload` is
//! handed to subscribers unchanged. The client adds two events of its own:
//! [`events::CONNECTION`] carrying a [`ConnectionEvent`] and [`events::ERROR`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event names seen on the stream.
pub mod events {
    /// A device changed state. Payload is the updated device.
    pub const DEVICE_UPDATE: &str = "device-update";
    /// An automation fired.
    pub const AUTOMATION_TRIGGER: &str = "automation-trigger";
    pub const NOTIFICATION: &str = "notification";
    pub const SYSTEM_ALERT: &str = "system-alert";
    /// Stream state change, emitted by the client.
    pub const CONNECTION: &str = "connection";
    /// Stream error, emitted by the client.
    pub const ERROR: &str = "error";

    /// Every event name, server-sent first.
    pub const ALL: [&str; 6] = [
        DEVICE_UPDATE,
        AUTOMATION_TRIGGER,
        NOTIFICATION,
        SYSTEM_ALERT,
        CONNECTION,
        ERROR,
    ];
}

/// One inbound stream frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl WebSocketMessage {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            timestamp: Some(Utc::now()),
        }
    }
}

/// State of the client's stream connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    Connected,
    Disconnected,
    /// Reconnection gave up; the stream stays down until `connect` is called again.
    Failed,
}

/// Payload of the `connection` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEvent {
    pub status: StreamStatus,
}

/// Normalized result of a REST call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Failed response. An empty message is replaced so callers always get some text.
    pub fn err(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "unknown error".to_string();
        }
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(self.error.unwrap_or_else(|| "response carried no data".to_string())),
        }
    }
}

impl<T> From<Result<T, String>> for ApiResponse<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(message) => Self::err(message),
        }
    }
}
