//! Energy and security telemetry, plus parsed voice intents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of server-side speech parsing. Consumed once, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCommand {
    /// Transcribed text.
    pub text: String,
    /// Intent category, e.g. `device_control`.
    pub intent: String,
    #[serde(default)]
    pub entities: Map<String, Value>,
    /// Confidence score in 0.0..=1.0.
    pub confidence: f64,
}

/// One energy consumption sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyReading {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    /// Consumption in kWh.
    pub consumption: f64,
    #[serde(default)]
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    pub id: String,
    /// Event kind, e.g. `motion_detected` or `door_unlocked`.
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub device_id: Option<String>,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Sum of consumption across readings, in kWh.
pub fn total_consumption(readings: &[EnergyReading]) -> f64 {
    readings.iter().map(|r| r.consumption).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_voice_command_deserialization() {
        let value = json!({
            "text": "turn on the kitchen light",
            "intent": "device_control",
            "entities": {"room": "kitchen", "action": "turn_on"},
            "confidence": 0.92
        });
        let cmd: VoiceCommand = serde_json::from_value(value).unwrap();
        assert_eq!(cmd.intent, "device_control");
        assert_eq!(cmd.entities["room"], "kitchen");
        assert!(cmd.confidence > 0.9);
    }

    #[test]
    fn test_total_consumption() {
        let readings: Vec<EnergyReading> = serde_json::from_value(json!([
            {"deviceId": "d1", "timestamp": "2024-05-01T00:00:00Z", "consumption": 1.5},
            {"deviceId": "d2", "timestamp": "2024-05-01T01:00:00Z", "consumption": 0.25, "cost": 0.08}
        ]))
        .unwrap();
        assert_eq!(total_consumption(&readings), 1.75);
        assert_eq!(readings[1].cost, Some(0.08));
        assert_eq!(total_consumption(&[]), 0.0);
    }

    #[test]
    fn test_security_severity_ordering() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);

        let event: SecurityEvent = serde_json::from_value(json!({
            "id": "e1",
            "type": "motion_detected",
            "deviceId": "cam1",
            "severity": "warning",
            "message": "Motion at front door",
            "timestamp": "2024-05-01T03:14:00Z"
        }))
        .unwrap();
        assert_eq!(event.event_type, "motion_detected");
        assert_eq!(event.severity, Severity::Warning);
    }
}
