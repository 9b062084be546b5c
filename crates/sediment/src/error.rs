//! Error types for Sediment operations.
//!
//! The layout itself has no failure modes: out-of-range lattice moves are
//! clamped, unknown connector endpoints are skipped and non-convergence only
//! degrades quality. What can fail is setting an engine up.

use thiserror::Error;

/// The main error type for Sediment operations.
#[derive(Debug, Error)]
pub enum SedimentError {
    #[error("Invalid configuration `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl SedimentError {
    /// Create a new `InvalidConfig` error for the given field.
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
