//! Row model for the `sensors` table.

use sensor_core::error::CoreError;
use sensor_core::sensor::{Protocol, Sensor, SensorId};
use sqlx::FromRow;

/// A row from the `sensors` table.
#[derive(Debug, Clone, FromRow)]
pub struct SensorRow {
    pub id: i64,
    pub name: String,
    pub ip: String,
    pub location: String,
    pub protocol: String,
    pub model: String,
    pub enabled: bool,
}

impl TryFrom<SensorRow> for Sensor {
    type Error = CoreError;

    fn try_from(row: SensorRow) -> Result<Self, Self::Error> {
        let protocol: Protocol = row.protocol.parse().map_err(|_| {
            CoreError::Internal(format!(
                "sensor {} has unknown protocol '{}' in storage",
                row.id, row.protocol
            ))
        })?;

        Ok(Sensor::restore(
            SensorId::from_i64(row.id),
            row.name,
            row.ip,
            row.location,
            protocol,
            row.model,
            row.enabled,
        ))
    }
}
