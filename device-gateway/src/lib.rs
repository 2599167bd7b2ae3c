//! Device gateway client
//!
//! Typed REST calls and a live WebSocket event feed for a smart-home hub.
//!
//! ```no_run
//! use device_gateway::{events, DeviceGatewayClient};
//!
//! # async fn run() -> device_gateway::Result<()> {
//! let client = DeviceGatewayClient::from_base_url("http://localhost:3001")?;
//!
//! let devices = client.get_devices().await;
//! if let Some(devices) = devices.data {
//!     println!("{} devices", devices.len());
//! }
//!
//! client.on(events::DEVICE_UPDATE, |payload| println!("update: {}", payload));
//! client.connect().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod bus;
pub mod client;
pub mod config;
pub mod error;
pub mod stream;

pub use bus::{EventBus, Listener};
pub use client::DeviceGatewayClient;
pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use stream::ReconnectPolicy;

pub use smart_home_common::{events, ApiResponse, StreamStatus};
