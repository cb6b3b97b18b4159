//! Outbound client for the remote sensor-monitoring service.
//!
//! The API layer depends on the [`MonitoringClient`] trait only;
//! [`api::HttpMonitoringClient`] is the production implementation.

use async_trait::async_trait;
use sensor_core::sensor::SensorId;

pub mod api;

pub use api::{HttpMonitoringClient, MonitoringConfig};

/// Errors from the monitoring REST layer.
#[derive(Debug, thiserror::Error)]
pub enum MonitoringError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The monitoring service returned a non-2xx status code.
    #[error("Monitoring API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Registers and deregisters sensors with the monitoring service.
///
/// Both calls are idempotent on the remote side: enabling twice has the same
/// effect as enabling once.
#[async_trait]
pub trait MonitoringClient: Send + Sync {
    async fn enable_monitoring(&self, sensor_id: SensorId) -> Result<(), MonitoringError>;

    async fn disable_monitoring(&self, sensor_id: SensorId) -> Result<(), MonitoringError>;
}
