//! Energy and security telemetry.

use smart_home_common::{ApiResponse, EnergyReading, SecurityEvent};

use super::{extract, respond};
use crate::client::DeviceGatewayClient;
use crate::error::Result;

impl DeviceGatewayClient {
    /// `GET /api/energy`, optionally narrowed to one device and/or a time
    /// range such as `24h` or `7d`.
    pub async fn get_energy_data(
        &self,
        device_id: Option<&str>,
        time_range: Option<&str>,
    ) -> ApiResponse<Vec<EnergyReading>> {
        let result: Result<Vec<EnergyReading>> = async {
            let query = [
                ("deviceId", device_id.map(str::to_string)),
                ("timeRange", time_range.map(str::to_string)),
            ];
            let body = self.get_json(&["api", "energy"], &query).await?;
            extract(body, "energy")
        }
        .await;
        respond("get_energy_data", result)
    }

    /// `GET /api/security/events`, newest first, at most `limit` when given.
    pub async fn get_security_events(&self, limit: Option<u32>) -> ApiResponse<Vec<SecurityEvent>> {
        let result: Result<Vec<SecurityEvent>> = async {
            let query = [("limit", limit.map(|l| l.to_string()))];
            let body = self.get_json(&["api", "security", "events"], &query).await?;
            extract(body, "events")
        }
        .await;
        respond("get_security_events", result)
    }
}
