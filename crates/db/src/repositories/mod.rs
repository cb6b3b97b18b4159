//! Repository layer.
//!
//! Both repositories implement [`sensor_core::repository::SensorRepository`]
//! so the API can hold either behind an `Arc<dyn SensorRepository>`.

pub mod in_memory_sensor_repo;
pub mod sensor_repo;

pub use in_memory_sensor_repo::InMemorySensorRepo;
pub use sensor_repo::PgSensorRepo;
