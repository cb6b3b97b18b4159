//! Storage contract for sensors.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::id::SensorId;
use crate::page::{Page, PageRequest};
use crate::sensor::Sensor;

/// Durable store of sensors, keyed by [`SensorId`].
///
/// The API layer treats an implementation as the single source of truth;
/// there is no caching in front of it. Concurrent saves of the same id are
/// last-writer-wins.
#[async_trait]
pub trait SensorRepository: Send + Sync {
    /// Insert or overwrite the row for `sensor.id()`.
    async fn save(&self, sensor: Sensor) -> CoreResult<Sensor>;

    async fn find_by_id(&self, id: SensorId) -> CoreResult<Option<Sensor>>;

    async fn find_all(&self, request: &PageRequest) -> CoreResult<Page<Sensor>>;

    /// Remove the sensor permanently. Deleting an absent id is a no-op.
    async fn delete(&self, sensor: &Sensor) -> CoreResult<()>;

    /// Cheap liveness check for `/health`.
    async fn health_check(&self) -> CoreResult<()>;
}
