//! PostgreSQL repository for the `sensors` table.

use async_trait::async_trait;
use sensor_core::error::{CoreError, CoreResult};
use sensor_core::page::{Page, PageRequest};
use sensor_core::repository::SensorRepository;
use sensor_core::sensor::{Sensor, SensorId};

use crate::models::sensor::SensorRow;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, ip, location, protocol, model, enabled";

/// sqlx-backed [`SensorRepository`].
#[derive(Clone)]
pub struct PgSensorRepo {
    pool: DbPool,
}

impl PgSensorRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Collapse a sqlx failure into the domain error, logging the detail here
/// so callers only see a sanitized message.
fn storage_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Sensor storage query failed");
    CoreError::Internal(format!("storage error: {err}"))
}

/// `ORDER BY` clause built only from whitelisted column names.
fn order_by(request: &PageRequest) -> String {
    request
        .effective_sort()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl SensorRepository for PgSensorRepo {
    async fn save(&self, sensor: Sensor) -> CoreResult<Sensor> {
        let query = format!(
            "INSERT INTO sensors (id, name, ip, location, protocol, model, enabled)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                ip = EXCLUDED.ip,
                location = EXCLUDED.location,
                protocol = EXCLUDED.protocol,
                model = EXCLUDED.model,
                enabled = EXCLUDED.enabled
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SensorRow>(&query)
            .bind(sensor.id().as_i64())
            .bind(&sensor.name)
            .bind(&sensor.ip)
            .bind(&sensor.location)
            .bind(sensor.protocol.as_str())
            .bind(&sensor.model)
            .bind(sensor.enabled())
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Sensor::try_from(row)
    }

    async fn find_by_id(&self, id: SensorId) -> CoreResult<Option<Sensor>> {
        let query = format!("SELECT {COLUMNS} FROM sensors WHERE id = $1");
        sqlx::query_as::<_, SensorRow>(&query)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(Sensor::try_from)
            .transpose()
    }

    async fn find_all(&self, request: &PageRequest) -> CoreResult<Page<Sensor>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sensors")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        let query = format!(
            "SELECT {COLUMNS} FROM sensors ORDER BY {} LIMIT $1 OFFSET $2",
            order_by(request)
        );
        let rows = sqlx::query_as::<_, SensorRow>(&query)
            .bind(request.size)
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        let content = rows
            .into_iter()
            .map(Sensor::try_from)
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Page::new(content, request, total))
    }

    async fn delete(&self, sensor: &Sensor) -> CoreResult<()> {
        sqlx::query("DELETE FROM sensors WHERE id = $1")
            .bind(sensor.id().as_i64())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn health_check(&self) -> CoreResult<()> {
        crate::health_check(&self.pool).await.map_err(storage_error)
    }
}
