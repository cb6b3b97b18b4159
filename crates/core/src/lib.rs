//! Domain types for the sensor device-management service.
//!
//! This crate has no I/O of its own: it defines the [`sensor::Sensor`]
//! entity, its identifier and generator, pagination types, and the
//! [`repository::SensorRepository`] contract that storage adapters implement.

pub mod error;
pub mod id;
pub mod page;
pub mod repository;
pub mod sensor;
