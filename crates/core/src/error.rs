use crate::id::SensorId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: SensorId },

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias used by repository implementations.
pub type CoreResult<T> = Result<T, CoreError>;
