//! Handlers for the `/sensors` resource.
//!
//! Enable and disable persist the new flag first, then notify the monitoring
//! service. A failed notification never rolls back the write; it is logged
//! and reported through the [`MONITORING_STATUS_HEADER`] response header.

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::Query;
use sensor_core::error::CoreError;
use sensor_core::page::Page;
use sensor_core::sensor::{Sensor, SensorId, SensorInput, SensorOutput};

use crate::error::{AppError, AppResult};
use crate::query::PageParams;
use crate::state::AppState;

/// Response header reporting the outcome of the downstream monitoring call.
pub const MONITORING_STATUS_HEADER: &str = "x-monitoring-status";

/// Outcome of notifying the monitoring service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringStatus {
    Synced,
    /// The remote call failed or timed out; local state is still committed.
    Unavailable,
}

impl MonitoringStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MonitoringStatus::Synced => "synced",
            MonitoringStatus::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MonitoringAction {
    Enable,
    Disable,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse the `{id}` path segment. Blank or malformed ids are a 400.
fn parse_id(raw: &str) -> AppResult<SensorId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::InvalidId("sensor id is required".into()).into());
    }
    Ok(raw.parse::<SensorId>()?)
}

async fn load(state: &AppState, id: SensorId) -> AppResult<Sensor> {
    state
        .sensors
        .find_by_id(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Sensor",
            id,
        }))
}

async fn notify_monitoring(
    state: &AppState,
    id: SensorId,
    action: MonitoringAction,
) -> MonitoringStatus {
    let result = match action {
        MonitoringAction::Enable => state.monitoring.enable_monitoring(id).await,
        MonitoringAction::Disable => state.monitoring.disable_monitoring(id).await,
    };

    match result {
        Ok(()) => MonitoringStatus::Synced,
        Err(e) => {
            tracing::warn!(
                sensor_id = %id,
                ?action,
                error = %e,
                "Monitoring service call failed; sensor state was saved anyway",
            );
            MonitoringStatus::Unavailable
        }
    }
}

fn with_monitoring_status(mut response: Response, status: MonitoringStatus) -> Response {
    response.headers_mut().insert(
        MONITORING_STATUS_HEADER,
        HeaderValue::from_static(status.as_str()),
    );
    response
}

async fn set_enabled(
    state: &AppState,
    raw_id: &str,
    action: MonitoringAction,
) -> AppResult<Response> {
    let id = parse_id(raw_id)?;
    let mut sensor = load(state, id).await?;

    match action {
        MonitoringAction::Enable => sensor.enable(),
        MonitoringAction::Disable => sensor.disable(),
    }
    let sensor = state.sensors.save(sensor).await?;
    tracing::info!(sensor_id = %id, enabled = sensor.enabled(), "Sensor enabled flag changed");

    let status = notify_monitoring(state, id, action).await;
    let response = Json(SensorOutput::from(sensor)).into_response();
    Ok(with_monitoring_status(response, status))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/sensors
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Page<SensorOutput>>> {
    let request = params.to_request()?;
    let page = state.sensors.find_all(&request).await?;
    Ok(Json(page.map(SensorOutput::from)))
}

/// GET /api/sensors/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<SensorOutput>> {
    let id = parse_id(&raw_id)?;
    let sensor = load(&state, id).await?;
    Ok(Json(sensor.into()))
}

/// POST /api/sensors
///
/// The new sensor always starts disabled.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<SensorInput>,
) -> AppResult<(StatusCode, Json<SensorOutput>)> {
    input.check()?;

    let sensor = Sensor::create(state.ids.next_id(), input);
    let sensor = state.sensors.save(sensor).await?;
    tracing::info!(sensor_id = %sensor.id(), name = %sensor.name, "Sensor created");

    Ok((StatusCode::CREATED, Json(sensor.into())))
}

/// PUT /api/sensors/{id}
///
/// Full overwrite of the descriptive fields; `id` and `enabled` are kept.
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(input): Json<SensorInput>,
) -> AppResult<Json<SensorOutput>> {
    let id = parse_id(&raw_id)?;
    input.check()?;

    let mut sensor = load(&state, id).await?;
    sensor.apply(input);
    let sensor = state.sensors.save(sensor).await?;
    tracing::info!(sensor_id = %id, "Sensor updated");

    Ok(Json(sensor.into()))
}

/// PUT /api/sensors/{id}/enable
pub async fn enable(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    set_enabled(&state, &raw_id, MonitoringAction::Enable).await
}

/// DELETE /api/sensors/{id}/enable
pub async fn disable(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    set_enabled(&state, &raw_id, MonitoringAction::Disable).await
}

/// DELETE /api/sensors/{id}
///
/// Deleting an enabled sensor also deregisters it from monitoring so no
/// orphaned registration is left behind.
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&raw_id)?;
    let sensor = load(&state, id).await?;

    state.sensors.delete(&sensor).await?;
    tracing::info!(sensor_id = %id, "Sensor deleted");

    let response = StatusCode::NO_CONTENT.into_response();
    if sensor.enabled() {
        let status = notify_monitoring(&state, id, MonitoringAction::Disable).await;
        return Ok(with_monitoring_status(response, status));
    }
    Ok(response)
}
