//! Cross-cutting error types for Milepost.
//!
//! Domain-specific errors (`DatabaseError`, `StatusError`) live in their own
//! crates. The binary converges everything through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Milepost crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (unknown status string, bad name, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
