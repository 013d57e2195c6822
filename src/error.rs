//! Error types for the billing engine.

use thiserror::Error;

/// Engine error taxonomy.
///
/// Computation edge cases (non-positive meter usage, zero payors, empty
/// membership) are not errors; they have defined fallback values in the
/// allocator. A failed presence clear during close is surfaced as a warning
/// on a successful close, not through this type.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Input rejected at the boundary with a specific reason, never coerced.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// State conflict, e.g. creating a cycle while one is already active.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failure in the storage layer backing the engine.
    #[error("Storage error: {0}")]
    StorageError(#[from] anyhow::Error),
}
