//! Automation rules evaluated by the hub.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CommandKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationKind {
    /// Runs at fixed times.
    Schedule,
    /// Runs when its conditions become true.
    Trigger,
    /// Applied on demand as a group of actions.
    Scene,
}

/// A condition the hub evaluates, e.g. `{type: "temperature", operator: ">", value: 25}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

/// A device command executed when the automation fires.
///
/// Device ids are checked by the server, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub device_id: String,
    pub command: CommandKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Weekday names, e.g. `["mon", "fri"]`.
    #[serde(default)]
    pub days: Vec<String>,
    /// Local time of day, `HH:MM`.
    pub time: String,
    #[serde(default)]
    pub repeat: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AutomationKind,
    pub is_active: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
}

/// Payload for creating an automation; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAutomation {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AutomationKind,
    pub is_active: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

impl NewAutomation {
    pub fn new(name: impl Into<String>, kind: AutomationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_active: true,
            conditions: vec![],
            actions: vec![],
            schedule: None,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }
}
