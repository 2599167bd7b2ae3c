//! Automation rules.

use reqwest::Method;
use serde_json::json;

use smart_home_common::{ApiResponse, Automation, NewAutomation};

use super::{extract, respond};
use crate::client::DeviceGatewayClient;
use crate::error::Result;

impl DeviceGatewayClient {
    /// `GET /api/automations`
    pub async fn get_automations(&self) -> ApiResponse<Vec<Automation>> {
        let result: Result<Vec<Automation>> = async {
            let body = self.get_json(&["api", "automations"], &[]).await?;
            extract(body, "automations")
        }
        .await;
        respond("get_automations", result)
    }

    /// `POST /api/automations`
    ///
    /// Action device ids are not checked here; the hub rejects unknown ones.
    pub async fn create_automation(&self, automation: &NewAutomation) -> ApiResponse<Automation> {
        let result: Result<Automation> = async {
            let body = self
                .send_json(Method::POST, &["api", "automations"], automation)
                .await?;
            extract(body, "automation")
        }
        .await;
        respond("create_automation", result)
    }

    /// `PATCH /api/automations/:id/toggle`
    pub async fn toggle_automation(
        &self,
        automation_id: &str,
        is_active: bool,
    ) -> ApiResponse<Automation> {
        let result: Result<Automation> = async {
            let body = self
                .send_json(
                    Method::PATCH,
                    &["api", "automations", automation_id, "toggle"],
                    &json!({ "isActive": is_active }),
                )
                .await?;
            extract(body, "automation")
        }
        .await;
        respond("toggle_automation", result)
    }
}
