//! Device inventory and control.

use reqwest::Method;
use serde_json::{json, Value};

use smart_home_common::{ApiResponse, Device, DeviceCommand, NewDevice};

use super::{extract, respond};
use crate::client::DeviceGatewayClient;
use crate::error::{Error, Result};

impl DeviceGatewayClient {
    /// `GET /api/devices`
    pub async fn get_devices(&self) -> ApiResponse<Vec<Device>> {
        let result: Result<Vec<Device>> = async {
            let body = self.get_json(&["api", "devices"], &[]).await?;
            extract(body, "devices")
        }
        .await;
        respond("get_devices", result)
    }

    /// `GET /api/devices/:id`
    pub async fn get_device(&self, device_id: &str) -> ApiResponse<Device> {
        let result: Result<Device> = async {
            let body = self.get_json(&["api", "devices", device_id], &[]).await?;
            extract(body, "device")
        }
        .await;
        respond("get_device", result)
    }

    /// `POST /api/devices`. The hub assigns the id.
    pub async fn add_device(&self, device: &NewDevice) -> ApiResponse<Device> {
        let result: Result<Device> = async {
            let body = self
                .send_json(Method::POST, &["api", "devices"], device)
                .await?;
            extract(body, "device")
        }
        .await;
        respond("add_device", result)
    }

    /// `POST /api/devices/:id/control`
    ///
    /// The command is checked locally first; an invalid one fails without a
    /// request. The data is whatever acknowledgement the hub returns.
    pub async fn send_command(&self, command: &DeviceCommand) -> ApiResponse<Value> {
        let result = self.control(command).await;
        respond("send_command", result)
    }

    async fn control(&self, command: &DeviceCommand) -> Result<Value> {
        command.validate().map_err(Error::InvalidCommand)?;

        tracing::debug!("{} -> {}", command.command, command.device_id);
        let body = json!({ "command": command.command, "value": command.value });
        self.send_json(
            Method::POST,
            &["api", "devices", &command.device_id, "control"],
            &body,
        )
        .await
    }

    /// `POST /api/devices/discover`. Returns the devices found by the scan.
    pub async fn discover_devices(&self) -> ApiResponse<Vec<Device>> {
        let result: Result<Vec<Device>> = async {
            let body = self.post_empty(&["api", "devices", "discover"]).await?;
            extract(body, "devices")
        }
        .await;
        respond("discover_devices", result)
    }
}
