//! Request handlers.
//!
//! Handlers delegate to the repository and monitoring client held in
//! [`crate::state::AppState`] and map errors via [`crate::error::AppError`].

pub mod sensor;
