//! Error taxonomy for the status engine.

use mp_core::enums::EntityType;
use mp_core::errors::CoreError;
use thiserror::Error;

/// Errors a store port may return.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Concurrent writer contention (busy database, lock timeout).
    #[error("write conflict: {0}")]
    Conflict(String),

    /// Any other persistence failure.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum StatusError {
    /// The root entity of the operation does not exist (or is soft-deleted).
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityType, id: String },

    /// Invalid input, e.g. an unknown target status.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Concurrent write contention; the whole operation may be retried.
    #[error("Conflict or lock timeout: {0}")]
    Conflict(String),

    /// Unexpected persistence failure.
    #[error("Store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl StatusError {
    pub fn not_found(entity: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Stable machine-readable kind for structured error output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Store(_) => "store",
        }
    }

    /// The entity id the error is about, when known.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::NotFound { id, .. } => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<StoreError> for StatusError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Backend(e) => Self::Store(e),
        }
    }
}

impl From<CoreError> for StatusError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::InvalidTransition { .. } => Self::Validation(error.to_string()),
            CoreError::NotFound { .. } => Self::Store(anyhow::anyhow!(error.to_string())),
            CoreError::Other(e) => Self::Store(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflict_maps_to_conflict() {
        let err: StatusError = StoreError::Conflict("database is locked".into()).into();
        assert!(err.is_conflict());
        assert_eq!(err.kind(), "conflict");
    }

    #[test]
    fn core_validation_maps_to_validation() {
        let err: StatusError = CoreError::Validation("unknown status 'Done'".into()).into();
        assert!(matches!(err, StatusError::Validation(_)));
    }

    #[test]
    fn not_found_exposes_entity_id() {
        let err = StatusError::not_found(EntityType::Task, "tsk-1");
        assert_eq!(err.entity_id(), Some("tsk-1"));
        assert_eq!(err.to_string(), "task not found: tsk-1");
    }
}
