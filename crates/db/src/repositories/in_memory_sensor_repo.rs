//! In-memory [`SensorRepository`] for tests and database-less runs.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use sensor_core::error::CoreResult;
use sensor_core::page::{Direction, Page, PageRequest, Sort, SortField};
use sensor_core::repository::SensorRepository;
use sensor_core::sensor::{Sensor, SensorId};
use tokio::sync::RwLock;

/// Sensors held in a `BTreeMap` keyed by id.
#[derive(Clone, Default)]
pub struct InMemorySensorRepo {
    sensors: Arc<RwLock<BTreeMap<SensorId, Sensor>>>,
}

impl InMemorySensorRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sensors.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sensors.read().await.is_empty()
    }
}

fn compare_by(sort: &Sort, a: &Sensor, b: &Sensor) -> Ordering {
    let ordering = match sort.field {
        SortField::Id => a.id().cmp(&b.id()),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Ip => a.ip.cmp(&b.ip),
        SortField::Location => a.location.cmp(&b.location),
        SortField::Protocol => a.protocol.as_str().cmp(b.protocol.as_str()),
        SortField::Model => a.model.cmp(&b.model),
        SortField::Enabled => a.enabled().cmp(&b.enabled()),
    };
    match sort.direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl SensorRepository for InMemorySensorRepo {
    async fn save(&self, sensor: Sensor) -> CoreResult<Sensor> {
        let mut sensors = self.sensors.write().await;
        sensors.insert(sensor.id(), sensor.clone());
        Ok(sensor)
    }

    async fn find_by_id(&self, id: SensorId) -> CoreResult<Option<Sensor>> {
        let sensors = self.sensors.read().await;
        Ok(sensors.get(&id).cloned())
    }

    async fn find_all(&self, request: &PageRequest) -> CoreResult<Page<Sensor>> {
        let sensors = self.sensors.read().await;
        let mut all: Vec<&Sensor> = sensors.values().collect();

        let criteria = request.effective_sort();
        all.sort_by(|a, b| {
            criteria
                .iter()
                .map(|sort| compare_by(sort, a, b))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        let total = all.len() as i64;
        let content = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .cloned()
            .collect();
        Ok(Page::new(content, request, total))
    }

    async fn delete(&self, sensor: &Sensor) -> CoreResult<()> {
        let mut sensors = self.sensors.write().await;
        sensors.remove(&sensor.id());
        Ok(())
    }

    async fn health_check(&self) -> CoreResult<()> {
        Ok(())
    }
}
