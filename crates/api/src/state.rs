use std::sync::Arc;

use sensor_core::id::IdGenerator;
use sensor_core::repository::SensorRepository;
use sensor_monitoring::MonitoringClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (every field is behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Sensor storage (PostgreSQL or in-memory).
    pub sensors: Arc<dyn SensorRepository>,
    /// Outbound monitoring service client.
    pub monitoring: Arc<dyn MonitoringClient>,
    /// Identifier source for newly created sensors.
    pub ids: Arc<dyn IdGenerator>,
}
