//! Room grouping.

use serde::{Deserialize, Serialize};

/// A named area that groups devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    /// Category such as `living_room` or `bedroom`.
    #[serde(rename = "type")]
    pub room_type: String,
    /// Device ids, in the order the server lists them.
    #[serde(default)]
    pub devices: Vec<String>,
    #[serde(default)]
    pub automations: Option<Vec<String>>,
}

impl Room {
    pub fn contains(&self, device_id: &str) -> bool {
        self.devices.iter().any(|d| d == device_id)
    }
}
