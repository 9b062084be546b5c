//! Error types for the Sediment CLI.

use std::io;

use thiserror::Error;

use sediment::SedimentError;

use crate::config::ConfigError;

/// Everything that can stop the CLI.
///
/// # Diagnostic Variants
///
/// The `Input` variant keeps the TOML source it failed on, so the error
/// adapter can point at the offending span.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid diagram in {path}: {}", .err.message())]
    Input {
        err: toml::de::Error,
        src: String,
        path: String,
    },

    #[error("Failed to serialize diagram: {0}")]
    Output(#[from] toml::ser::Error),

    #[error("Layout error: {0}")]
    Layout(#[from] SedimentError),
}

impl CliError {
    /// Create a new `Input` error with the associated source text.
    pub fn new_input_error(
        err: toml::de::Error,
        src: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::Input {
            err,
            src: src.into(),
            path: path.into(),
        }
    }
}
