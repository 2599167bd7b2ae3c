//! Rooms and the devices they hold.

use smart_home_common::{ApiResponse, Device, Room};

use super::{extract, respond};
use crate::client::DeviceGatewayClient;
use crate::error::Result;

impl DeviceGatewayClient {
    /// `GET /api/rooms`
    pub async fn get_rooms(&self) -> ApiResponse<Vec<Room>> {
        let result: Result<Vec<Room>> = async {
            let body = self.get_json(&["api", "rooms"], &[]).await?;
            extract(body, "rooms")
        }
        .await;
        respond("get_rooms", result)
    }

    /// `GET /api/rooms/:id/devices`
    pub async fn get_room_devices(&self, room_id: &str) -> ApiResponse<Vec<Device>> {
        let result: Result<Vec<Device>> = async {
            let body = self
                .get_json(&["api", "rooms", room_id, "devices"], &[])
                .await?;
            extract(body, "devices")
        }
        .await;
        respond("get_room_devices", result)
    }
}
