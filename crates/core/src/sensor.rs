//! The sensor entity and its wire representations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{CoreError, CoreResult};
pub use crate::id::SensorId;

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

/// Communication protocol spoken by a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Https,
    Mqtt,
    Coap,
    Modbus,
    Ble,
    Zigbee,
    Lorawan,
    Snmp,
}

impl Protocol {
    pub const ALL: [Protocol; 9] = [
        Protocol::Http,
        Protocol::Https,
        Protocol::Mqtt,
        Protocol::Coap,
        Protocol::Modbus,
        Protocol::Ble,
        Protocol::Zigbee,
        Protocol::Lorawan,
        Protocol::Snmp,
    ];

    /// Canonical upper-case name, identical to the JSON form.
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Mqtt => "MQTT",
            Protocol::Coap => "COAP",
            Protocol::Modbus => "MODBUS",
            Protocol::Ble => "BLE",
            Protocol::Zigbee => "ZIGBEE",
            Protocol::Lorawan => "LORAWAN",
            Protocol::Snmp => "SNMP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::Validation(format!("unknown protocol '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A registered sensor.
///
/// `id` and `enabled` are private: the id is fixed at construction and the
/// flag only moves through [`Sensor::enable`] / [`Sensor::disable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sensor {
    id: SensorId,
    pub name: String,
    pub ip: String,
    pub location: String,
    pub protocol: Protocol,
    pub model: String,
    enabled: bool,
}

impl Sensor {
    /// Build a brand-new sensor from client input. Always starts disabled.
    pub fn create(id: SensorId, input: SensorInput) -> Self {
        Self {
            id,
            name: input.name,
            ip: input.ip,
            location: input.location,
            protocol: input.protocol,
            model: input.model,
            enabled: false,
        }
    }

    /// Rehydrate a sensor from storage.
    pub fn restore(
        id: SensorId,
        name: String,
        ip: String,
        location: String,
        protocol: Protocol,
        model: String,
        enabled: bool,
    ) -> Self {
        Self {
            id,
            name,
            ip,
            location,
            protocol,
            model,
            enabled,
        }
    }

    pub fn id(&self) -> SensorId {
        self.id
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Overwrite every mutable descriptive field. Never touches `id` or
    /// `enabled`.
    pub fn apply(&mut self, input: SensorInput) {
        self.name = input.name;
        self.ip = input.ip;
        self.location = input.location;
        self.protocol = input.protocol;
        self.model = input.model;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Request body for create and update. There is deliberately no `enabled`
/// field; any such key in the JSON is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SensorInput {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub ip: String,
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    pub protocol: Protocol,
    #[validate(custom(function = "not_blank"))]
    pub model: String,
}

impl SensorInput {
    /// Run field validation, flattening failures into a single message.
    pub fn check(&self) -> CoreResult<()> {
        self.validate()
            .map_err(|errors| CoreError::Validation(errors.to_string()))
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Response body for every endpoint returning a sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorOutput {
    pub id: SensorId,
    pub name: String,
    pub ip: String,
    pub location: String,
    pub protocol: Protocol,
    pub model: String,
    pub enabled: bool,
}

impl From<Sensor> for SensorOutput {
    fn from(sensor: Sensor) -> Self {
        Self {
            id: sensor.id,
            name: sensor.name,
            ip: sensor.ip,
            location: sensor.location,
            protocol: sensor.protocol,
            model: sensor.model,
            enabled: sensor.enabled,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn input(name: &str) -> SensorInput {
        SensorInput {
            name: name.to_string(),
            ip: "10.0.0.5".to_string(),
            location: "Warehouse A".to_string(),
            protocol: Protocol::Mqtt,
            model: "TS-100".to_string(),
        }
    }

    #[test]
    fn create_starts_disabled() {
        let sensor = Sensor::create(SensorId::from_u64(1), input("Temp-01"));
        assert!(!sensor.enabled());
        assert_eq!(sensor.id(), SensorId::from_u64(1));
    }

    #[test]
    fn apply_keeps_id_and_enabled() {
        let mut sensor = Sensor::create(SensorId::from_u64(7), input("Temp-01"));
        sensor.enable();

        let mut replacement = input("Temp-02");
        replacement.protocol = Protocol::Coap;
        sensor.apply(replacement);

        assert_eq!(sensor.id(), SensorId::from_u64(7));
        assert!(sensor.enabled());
        assert_eq!(sensor.name, "Temp-02");
        assert_eq!(sensor.protocol, Protocol::Coap);
    }

    #[test]
    fn enable_is_idempotent() {
        let mut sensor = Sensor::create(SensorId::from_u64(3), input("Temp-01"));
        sensor.enable();
        let once = sensor.clone();
        sensor.enable();
        assert_eq!(sensor, once);
        sensor.disable();
        assert!(!sensor.enabled());
    }

    #[test]
    fn protocol_round_trips_through_text() {
        for protocol in Protocol::ALL {
            assert_eq!(protocol.as_str().parse::<Protocol>().unwrap(), protocol);
            let json = serde_json::to_value(protocol).unwrap();
            assert_eq!(json, serde_json::Value::String(protocol.as_str().into()));
        }
        assert_eq!("mqtt".parse::<Protocol>().unwrap(), Protocol::Mqtt);
        assert_matches!("CAN".parse::<Protocol>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn input_ignores_enabled_key() {
        let parsed: SensorInput = serde_json::from_value(serde_json::json!({
            "name": "Temp-01",
            "ip": "10.0.0.5",
            "location": "Warehouse A",
            "protocol": "MQTT",
            "model": "TS-100",
            "enabled": true,
        }))
        .unwrap();
        let sensor = Sensor::create(SensorId::from_u64(9), parsed);
        assert!(!sensor.enabled());
    }

    #[test]
    fn blank_fields_fail_validation() {
        assert!(input("Temp-01").check().is_ok());
        assert_matches!(input("   ").check(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn output_copies_all_fields() {
        let mut sensor = Sensor::create(SensorId::from_u64(11), input("Temp-01"));
        sensor.enable();
        let output = SensorOutput::from(sensor);
        assert_eq!(output.id, SensorId::from_u64(11));
        assert_eq!(output.name, "Temp-01");
        assert!(output.enabled);
    }
}
