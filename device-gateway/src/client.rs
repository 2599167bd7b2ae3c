//! The gateway client: one HTTP client, one event bus, at most one stream.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::sync::{watch, Mutex};
use url::Url;

use smart_home_common::StreamStatus;

use crate::bus::{EventBus, Listener};
use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::stream::{stream_url, ReconnectPolicy, StreamHandle, StreamTask};

/// Typed client for the smart-home hub.
///
/// REST calls live in [`crate::api`]; this type owns the connection
/// lifecycle: create with [`DeviceGatewayClient::new`], start the live feed
/// with [`connect`](Self::connect), stop it with [`disconnect`](Self::disconnect).
/// Dropping the client stops the feed as well.
pub struct DeviceGatewayClient {
    pub(crate) http_client: Client,
    pub(crate) base_url: String,
    stream_url: Url,
    policy: ReconnectPolicy,
    bus: Arc<EventBus>,
    status: Arc<watch::Sender<StreamStatus>>,
    stream: Mutex<Option<StreamHandle>>,
}

impl DeviceGatewayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let base_url = config.api.base_url.trim_end_matches('/').to_string();
        let stream_url = stream_url(&base_url, &config.stream.path)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.api.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build()?;

        let (status, _) = watch::channel(StreamStatus::Disconnected);

        Ok(Self {
            http_client,
            base_url,
            stream_url,
            policy: ReconnectPolicy::from(&config.stream),
            bus: Arc::new(EventBus::new()),
            status: Arc::new(status),
            stream: Mutex::new(None),
        })
    }

    /// Client for `base_url` with default settings.
    pub fn from_base_url(base_url: &str) -> Result<Self> {
        Self::new(&GatewayConfig::with_base_url(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn stream_url(&self) -> &Url {
        &self.stream_url
    }

    /// Absolute URL for `segments` below the base URL. Segments are percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start the live event feed.
    ///
    /// Does nothing while a feed is already running, whether connected or
    /// waiting to reconnect.
    pub async fn connect(&self) {
        let mut stream = self.stream.lock().await;
        if stream.as_ref().is_some_and(StreamHandle::is_running) {
            tracing::debug!("Device stream already running");
            return;
        }

        let task = StreamTask {
            url: self.stream_url.clone(),
            bus: self.bus.clone(),
            policy: self.policy,
            status: self.status.clone(),
        };
        *stream = Some(StreamHandle::spawn(task));
    }

    /// Stop the live event feed, including any reconnect that is pending.
    pub async fn disconnect(&self) {
        let handle = self.stream.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown().await;
            tracing::info!("Disconnected from device stream");
        }
        self.status.send_replace(StreamStatus::Disconnected);
    }

    /// Current stream state.
    pub fn status(&self) -> StreamStatus {
        *self.status.borrow()
    }

    /// Receiver that observes every stream state change.
    pub fn watch_status(&self) -> watch::Receiver<StreamStatus> {
        self.status.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == StreamStatus::Connected
    }

    /// Subscribe to a stream event. Keep the returned handle to unsubscribe.
    pub fn on<F>(&self, event: &str, listener: F) -> Listener
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.bus.on(event, listener)
    }

    pub fn off(&self, event: &str, listener: &Listener) -> bool {
        self.bus.off(event, listener)
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }
}

impl std::fmt::Debug for DeviceGatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceGatewayClient")
            .field("base_url", &self.base_url)
            .field("stream_url", &self.stream_url.as_str())
            .field("status", &self.status())
            .finish()
    }
}
