//! CLI logic for the Sediment layout tool.
//!
//! Reads a class diagram described in TOML, lays it out with the sink
//! simulation and writes the diagram back with updated positions,
//! attachment points and connector routes.

pub mod error_adapter;

mod args;
mod config;
mod error;

pub use args::Args;
pub use config::ConfigError;
pub use error::CliError;

use std::fs;

use log::info;

use sediment::{LayoutEngine, SinkReport, diagram::Diagram};

/// Run the Sediment CLI application
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed input diagrams
/// - Invalid layout settings
/// - Serialization errors
pub fn run(args: &Args) -> Result<SinkReport, CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let engine = LayoutEngine::new(app_config.layout().clone())?;

    let source = fs::read_to_string(&args.input)?;
    let mut diagram: Diagram = toml::from_str(&source)
        .map_err(|err| CliError::new_input_error(err, source.as_str(), args.input.as_str()))?;

    let report = engine.layout(&mut diagram);

    let output = toml::to_string_pretty(&diagram)?;
    fs::write(&args.output, output)?;

    info!(output_file = args.output; "Diagram written");

    Ok(report)
}
