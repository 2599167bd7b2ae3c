//! Smart-home common types
//!
//! Schema types shared by the device gateway client and anything consuming it.

pub mod automation;
pub mod device;
pub mod protocol;
pub mod room;
pub mod telemetry;

pub use automation::{Action, Automation, AutomationKind, Condition, NewAutomation, Schedule};
pub use device::{
    CommandKind, ConnectionStatus, Device, DeviceCommand, DeviceStatus, DeviceType, NewDevice,
};
pub use protocol::{events, ApiResponse, ConnectionEvent, StreamStatus, WebSocketMessage};
pub use room::Room;
pub use telemetry::{total_consumption, EnergyReading, SecurityEvent, Severity, VoiceCommand};
