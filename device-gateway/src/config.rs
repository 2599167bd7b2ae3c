//! Configuration for the device gateway client.

use std::env;
use std::time::Duration;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Environment variable that selects the hub's base URL, taking precedence over everything else.
pub const API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Unset means the HTTP client's own defaults apply.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

/// Live event stream settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Path appended to the base URL for the WebSocket endpoint.
    #[serde(default = "default_stream_path")]
    pub path: String,
    /// Delay before the first reconnect attempt; doubles on each consecutive failure.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_max_reconnect_delay")]
    pub max_reconnect_delay_ms: u64,
    /// Consecutive failed attempts before the stream gives up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            path: default_stream_path(),
            reconnect_delay_ms: default_reconnect_delay(),
            max_reconnect_delay_ms: default_max_reconnect_delay(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }
}

impl StreamConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn max_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}
fn default_stream_path() -> String {
    "/ws".to_string()
}
fn default_reconnect_delay() -> u64 {
    3000
}
fn default_max_reconnect_delay() -> u64 {
    30_000
}
fn default_max_reconnect_attempts() -> u32 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl GatewayConfig {
    /// Configuration pointing at `base_url`, everything else default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                ..ApiConfig::default()
            },
            ..Self::default()
        }
    }

    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. `NEXT_PUBLIC_API_URL` for the base URL
    /// 2. Environment variables (GATEWAY__SECTION__KEY format)
    /// 3. gateway.toml file (if present)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("gateway", env::var(API_URL_ENV).ok())
    }

    /// Same as [`GatewayConfig::load`] with an explicit file name and base URL override.
    pub fn load_from(file: &str, base_url_override: Option<String>) -> Result<Self, ConfigError> {
        let base_url_override = base_url_override.filter(|url| !url.trim().is_empty());

        let config = ConfigLoader::builder()
            .set_default("api.base_url", default_base_url())?
            .set_default("stream.path", default_stream_path())?
            .set_default("stream.reconnect_delay_ms", default_reconnect_delay() as i64)?
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.base_url", base_url_override)?
            .build()?;

        config.try_deserialize()
    }
}
