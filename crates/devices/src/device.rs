use core::str::FromStr;
use serde::{Deserialize, Serialize};

use smartstore_core::{
    Action, DeviceId, Entity, EntityKind, ErrorKind, ParseError, StoreError, StoreLocation,
    StoreResult,
};

/// Sensors observe the store and only report events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Microphone,
    Camera,
}

/// Appliances report events and accept commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplianceType {
    Speaker,
    Robot,
    Turnstile,
}

/// Device subtype, resolved once when the device is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "class", content = "type", rename_all = "lowercase")]
pub enum DeviceKind {
    Sensor(SensorType),
    Appliance(ApplianceType),
}

/// Every recognised device type string and the variant it resolves to.
const DEVICE_TYPES: &[(&str, DeviceKind)] = &[
    ("microphone", DeviceKind::Sensor(SensorType::Microphone)),
    ("camera", DeviceKind::Sensor(SensorType::Camera)),
    ("speaker", DeviceKind::Appliance(ApplianceType::Speaker)),
    ("robot", DeviceKind::Appliance(ApplianceType::Robot)),
    ("turnstile", DeviceKind::Appliance(ApplianceType::Turnstile)),
];

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        DEVICE_TYPES
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    pub fn is_appliance(&self) -> bool {
        matches!(self, DeviceKind::Appliance(_))
    }

    pub fn event_handler(&self) -> &dyn EventHandler {
        match self {
            DeviceKind::Sensor(sensor) => sensor,
            DeviceKind::Appliance(appliance) => appliance,
        }
    }

    pub fn command_handler(&self) -> Option<&dyn CommandHandler> {
        match self {
            DeviceKind::Sensor(_) => None,
            DeviceKind::Appliance(appliance) => Some(appliance),
        }
    }
}

impl core::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DEVICE_TYPES
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| ParseError::unknown("device type", s))
    }
}

/// Handles an event reported by a device.
pub trait EventHandler {
    fn handle_event(&self, device: &DeviceId, event: &str) -> String;
}

/// Handles a command sent to a device.
pub trait CommandHandler {
    fn handle_command(&self, device: &DeviceId, command: &str) -> String;
}

impl EventHandler for SensorType {
    fn handle_event(&self, device: &DeviceId, event: &str) -> String {
        tracing::info!(device_id = %device, sensor = ?self, event, "sensor event");
        format!("sensor {device} reported: {event}")
    }
}

impl EventHandler for ApplianceType {
    fn handle_event(&self, device: &DeviceId, event: &str) -> String {
        tracing::info!(device_id = %device, appliance = ?self, event, "appliance event");
        format!("appliance {device} processed event: {event}")
    }
}

impl CommandHandler for ApplianceType {
    fn handle_command(&self, device: &DeviceId, command: &str) -> String {
        tracing::info!(device_id = %device, appliance = ?self, command, "appliance command");
        format!("appliance {device} processed command: {command}")
    }
}

/// Command: CreateDevice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDevice {
    pub device_id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    pub location: StoreLocation,
}

/// A sensor or appliance installed in an aisle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    id: DeviceId,
    name: String,
    location: StoreLocation,
    kind: DeviceKind,
}

impl Device {
    pub fn create(cmd: CreateDevice) -> Self {
        Self {
            id: cmd.device_id,
            name: cmd.name,
            location: cmd.location,
            kind: cmd.kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn process_event(&self, event: &str) -> String {
        self.kind.event_handler().handle_event(&self.id, event)
    }

    pub fn process_command(&self, command: &str) -> StoreResult<String> {
        let handler = self
            .kind
            .command_handler()
            .ok_or_else(|| StoreError::new(Action::IssueCommand, ErrorKind::NotAnAppliance))?;
        Ok(handler.handle_command(&self.id, command))
    }

    pub fn view(&self) -> DeviceView {
        DeviceView {
            id: self.id.clone(),
            name: self.name.clone(),
            location: self.location.clone(),
            kind: self.kind,
        }
    }
}

impl Entity for Device {
    type Id = DeviceId;
    const KIND: EntityKind = EntityKind::Device;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Serializable projection of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceView {
    pub id: DeviceId,
    pub name: String,
    pub location: StoreLocation,
    pub kind: DeviceKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(kind: &str) -> Device {
        Device::create(CreateDevice {
            device_id: DeviceId::new("d1"),
            name: "front door".to_string(),
            kind: kind.parse().unwrap(),
            location: StoreLocation::new("store_1", "aisle_A"),
        })
    }

    #[test]
    fn every_type_string_resolves_to_one_variant() {
        assert_eq!(
            "camera".parse::<DeviceKind>().unwrap(),
            DeviceKind::Sensor(SensorType::Camera)
        );
        assert_eq!(
            "Turnstile".parse::<DeviceKind>().unwrap(),
            DeviceKind::Appliance(ApplianceType::Turnstile)
        );
        for (name, kind) in DEVICE_TYPES {
            assert_eq!(kind.as_str(), *name);
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = "toaster".parse::<DeviceKind>().unwrap_err();
        assert_eq!(err, ParseError::unknown("device type", "toaster"));
    }

    #[test]
    fn sensors_and_appliances_format_events_differently() {
        let sensor = device("microphone").process_event("customer_seen c1");
        let appliance = device("robot").process_event("cleaning_done aisle_A");
        assert_eq!(sensor, "sensor d1 reported: customer_seen c1");
        assert_eq!(appliance, "appliance d1 processed event: cleaning_done aisle_A");
    }

    #[test]
    fn only_appliances_accept_commands() {
        let out = device("speaker").process_command("announce sale").unwrap();
        assert_eq!(out, "appliance d1 processed command: announce sale");

        let err = device("camera").process_command("zoom in").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotAnAppliance);
        assert_eq!(err.action(), Action::IssueCommand);
    }

    #[test]
    fn view_serializes_kind_as_tagged_variant() {
        let json = serde_json::to_value(device("camera").view()).unwrap();
        assert_eq!(json["kind"]["class"], "sensor");
        assert_eq!(json["kind"]["type"], "camera");
    }
}
