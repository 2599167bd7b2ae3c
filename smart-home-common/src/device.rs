//! Device types and control commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of smart-home endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Light,
    Thermostat,
    Camera,
    Lock,
    Sensor,
    Switch,
    Outlet,
}

impl DeviceType {
    /// All device kinds for iteration.
    pub const ALL: [DeviceType; 7] = [
        DeviceType::Light,
        DeviceType::Thermostat,
        DeviceType::Camera,
        DeviceType::Lock,
        DeviceType::Sensor,
        DeviceType::Switch,
        DeviceType::Outlet,
    ];
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceType::Light => write!(f, "light"),
            DeviceType::Thermostat => write!(f, "thermostat"),
            DeviceType::Camera => write!(f, "camera"),
            DeviceType::Lock => write!(f, "lock"),
            DeviceType::Sensor => write!(f, "sensor"),
            DeviceType::Switch => write!(f, "switch"),
            DeviceType::Outlet => write!(f, "outlet"),
        }
    }
}

/// Power state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    On,
    Off,
}

/// Reachability of a device as reported by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Online,
    Offline,
    Connecting,
}

/// A controllable or sensing endpoint.
///
/// Copies held by clients are snapshots; the server owns the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Id of the owning room.
    #[serde(default)]
    pub room: Option<String>,
    pub status: DeviceStatus,
    pub connection_status: ConnectionStatus,
    /// Signal strength, usually a percentage.
    #[serde(default)]
    pub signal_strength: Option<f64>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub last_updated: DateTime<Utc>,
}

impl Device {
    pub fn is_on(&self) -> bool {
        self.status == DeviceStatus::On
    }

    pub fn is_online(&self) -> bool {
        self.connection_status == ConnectionStatus::Online
    }
}

/// Payload for manually registering a device. The server assigns `id` and `lastUpdated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub status: DeviceStatus,
    pub connection_status: ConnectionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<f64>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl NewDevice {
    pub fn new(name: impl Into<String>, device_type: DeviceType) -> Self {
        Self {
            name: name.into(),
            device_type,
            brand: None,
            model: None,
            room: None,
            status: DeviceStatus::Off,
            connection_status: ConnectionStatus::Connecting,
            signal_strength: None,
            properties: Map::new(),
        }
    }

    pub fn in_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }
}

/// Control verbs understood by the device endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    TurnOn,
    TurnOff,
    SetBrightness,
    SetTemperature,
    SetColor,
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandKind::TurnOn => write!(f, "turn_on"),
            CommandKind::TurnOff => write!(f, "turn_off"),
            CommandKind::SetBrightness => write!(f, "set_brightness"),
            CommandKind::SetTemperature => write!(f, "set_temperature"),
            CommandKind::SetColor => write!(f, "set_color"),
        }
    }
}

/// A single control request for one device. Built per action, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCommand {
    pub device_id: String,
    pub command: CommandKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl DeviceCommand {
    pub fn new(device_id: impl Into<String>, command: CommandKind, value: Option<Value>) -> Self {
        Self {
            device_id: device_id.into(),
            command,
            value,
        }
    }

    pub fn turn_on(device_id: impl Into<String>) -> Self {
        Self::new(device_id, CommandKind::TurnOn, None)
    }

    pub fn turn_off(device_id: impl Into<String>) -> Self {
        Self::new(device_id, CommandKind::TurnOff, None)
    }

    /// Brightness in percent (0-100).
    pub fn set_brightness(device_id: impl Into<String>, brightness: u8) -> Self {
        Self::new(device_id, CommandKind::SetBrightness, Some(Value::from(brightness)))
    }

    pub fn set_temperature(device_id: impl Into<String>, celsius: f64) -> Self {
        Self::new(device_id, CommandKind::SetTemperature, Some(Value::from(celsius)))
    }

    /// Color as a CSS-style string, e.g. `#ff8800`.
    pub fn set_color(device_id: impl Into<String>, color: impl Into<String>) -> Self {
        Self::new(device_id, CommandKind::SetColor, Some(Value::String(color.into())))
    }

    /// Check that the value matches what the command expects.
    pub fn validate(&self) -> Result<(), String> {
        if self.device_id.trim().is_empty() {
            return Err("device id cannot be empty".to_string());
        }

        match (self.command, &self.value) {
            (CommandKind::TurnOn | CommandKind::TurnOff, None) => Ok(()),
            (CommandKind::TurnOn | CommandKind::TurnOff, Some(_)) => {
                Err(format!("{} does not take a value", self.command))
            }
            (CommandKind::SetBrightness, Some(v)) => match v.as_f64() {
                Some(b) if (0.0..=100.0).contains(&b) => Ok(()),
                Some(b) => Err(format!("brightness {} is outside 0-100", b)),
                None => Err("brightness must be a number".to_string()),
            },
            (CommandKind::SetTemperature, Some(v)) if v.is_number() => Ok(()),
            (CommandKind::SetTemperature, Some(_)) => {
                Err("temperature must be a number".to_string())
            }
            (CommandKind::SetColor, Some(Value::String(s))) if !s.is_empty() => Ok(()),
            (CommandKind::SetColor, Some(_)) => Err("color must be a non-empty string".to_string()),
            (_, None) => Err(format!("{} requires a value", self.command)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lamp_json() -> Value {
        json!({
            "id": "d1",
            "name": "Lamp",
            "type": "light",
            "brand": "Philips",
            "model": "Hue White",
            "room": "living",
            "status": "on",
            "connectionStatus": "online",
            "signalStrength": 87,
            "properties": {"brightness": 80},
            "lastUpdated": "2024-05-01T12:00:00Z"
        })
    }

    #[test]
    fn test_device_deserialization() {
        let device: Device = serde_json::from_value(lamp_json()).unwrap();
        assert_eq!(device.id, "d1");
        assert_eq!(device.device_type, DeviceType::Light);
        assert_eq!(device.room.as_deref(), Some("living"));
        assert_eq!(device.signal_strength, Some(87.0));
        assert_eq!(device.properties["brightness"], json!(80));
        assert!(device.is_on());
        assert!(device.is_online());
    }

    #[test]
    fn test_device_rejects_unknown_type() {
        let mut value = lamp_json();
        value["type"] = json!("toaster");
        assert!(serde_json::from_value::<Device>(value).is_err());
    }

    #[test]
    fn test_device_rejects_missing_status() {
        let mut value = lamp_json();
        value.as_object_mut().unwrap().remove("status");
        assert!(serde_json::from_value::<Device>(value).is_err());
    }

    #[test]
    fn test_device_optional_fields_default() {
        let value = json!({
            "id": "s1",
            "name": "Door sensor",
            "type": "sensor",
            "status": "off",
            "connectionStatus": "offline",
            "lastUpdated": "2024-05-01T12:00:00Z"
        });
        let device: Device = serde_json::from_value(value).unwrap();
        assert!(device.brand.is_none());
        assert!(device.properties.is_empty());
        assert!(!device.is_online());
    }

    #[test]
    fn test_device_type_display_matches_wire_name() {
        for kind in DeviceType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_new_device_omits_unset_fields() {
        let device = NewDevice::new("Porch light", DeviceType::Light).in_room("porch");
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["type"], "light");
        assert_eq!(json["room"], "porch");
        assert_eq!(json["connectionStatus"], "connecting");
        assert!(json.get("id").is_none());
        assert!(json.get("brand").is_none());
        assert!(json.get("lastUpdated").is_none());
    }

    #[test]
    fn test_command_serialization() {
        let cmd = DeviceCommand::set_brightness("d1", 40);
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json, json!({"deviceId": "d1", "command": "set_brightness", "value": 40}));

        let json = serde_json::to_value(DeviceCommand::turn_off("d1")).unwrap();
        assert!(json.get("value").is_none());
    }

    #[test]
    fn test_command_validation() {
        assert!(DeviceCommand::turn_on("d1").validate().is_ok());
        assert!(DeviceCommand::set_brightness("d1", 100).validate().is_ok());
        assert!(DeviceCommand::set_temperature("t1", 21.5).validate().is_ok());
        assert!(DeviceCommand::set_color("d1", "#ff8800").validate().is_ok());

        assert!(DeviceCommand::set_brightness("d1", 101).validate().is_err());
        assert!(DeviceCommand::set_color("d1", "").validate().is_err());
        assert!(DeviceCommand::turn_on("").validate().is_err());
        assert!(DeviceCommand::new("d1", CommandKind::SetTemperature, None)
            .validate()
            .is_err());
        assert!(DeviceCommand::new("d1", CommandKind::TurnOn, Some(json!(1)))
            .validate()
            .is_err());
        assert!(DeviceCommand::new("d1", CommandKind::SetTemperature, Some(json!("warm")))
            .validate()
            .is_err());
    }
}
