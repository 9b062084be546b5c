//! Configuration types for Sediment layouts.
//!
//! This module provides configuration structures that control the sink
//! simulation and the projection back to diagram coordinates. All types
//! implement [`serde::Deserialize`] for flexible loading from external
//! sources, and every field falls back to its default when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`LayoutConfig`] - Groups the simulation and projection settings.
//! - [`SimulationConfig`] - Iteration cap and lattice depth.
//! - [`ProjectionConfig`] - Spacing and cosmetic jitter of projected positions.
//!
//! # Example
//!
//! ```
//! # use sediment::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().simulation().max_passes(), 10_000);
//! assert!(config.layout().validate().is_ok());
//! ```

use serde::Deserialize;

use crate::error::SedimentError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout configuration.
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }
}

/// Layout configuration for the sink simulation and the projection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    simulation: SimulationConfig,

    #[serde(default)]
    projection: ProjectionConfig,
}

impl LayoutConfig {
    /// Creates a new [`LayoutConfig`].
    ///
    /// # Arguments
    ///
    /// * `simulation` - Iteration cap and lattice sizing.
    /// * `projection` - Mapping from lattice cells to diagram coordinates.
    pub fn new(simulation: SimulationConfig, projection: ProjectionConfig) -> Self {
        Self {
            simulation,
            projection,
        }
    }

    /// Returns the simulation settings.
    pub fn simulation(&self) -> &SimulationConfig {
        &self.simulation
    }

    /// Returns the projection settings.
    pub fn projection(&self) -> &ProjectionConfig {
        &self.projection
    }

    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SedimentError::InvalidConfig`] for a zero `depth_factor` or
    /// a non-finite or non-positive projection constant.
    pub fn validate(&self) -> Result<(), SedimentError> {
        if self.simulation.depth_factor == 0 {
            return Err(SedimentError::invalid_config(
                "simulation.depth_factor",
                "must be at least 1",
            ));
        }

        let projection = &self.projection;
        let positive = [
            ("projection.spacing_x", projection.spacing_x),
            ("projection.spacing_y", projection.spacing_y),
            ("projection.angle_divisor", projection.angle_divisor),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SedimentError::invalid_config(
                    field,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }

        let finite = [
            ("projection.jitter_x", projection.jitter_x),
            ("projection.jitter_y", projection.jitter_y),
            ("projection.orbit_x", projection.orbit_x),
            ("projection.orbit_y", projection.orbit_y),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(SedimentError::invalid_config(
                    field,
                    format!("must be finite, got {value}"),
                ));
            }
        }

        Ok(())
    }
}

/// Settings of the sink simulation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Upper bound on the number of full passes over all sinkers.
    max_passes: usize,

    /// Lattice depth as a multiple of its horizontal side.
    depth_factor: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_passes: 10_000,
            depth_factor: 128,
        }
    }
}

impl SimulationConfig {
    /// Creates simulation settings.
    pub fn new(max_passes: usize, depth_factor: usize) -> Self {
        Self {
            max_passes,
            depth_factor,
        }
    }

    /// Returns the pass cap.
    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Returns the depth factor.
    pub fn depth_factor(&self) -> usize {
        self.depth_factor
    }
}

/// Settings of the projection from lattice cells to diagram coordinates.
///
/// A settled cell `(x, y)` lands at
/// `(x * spacing_x + cos(x * PI / angle_divisor) * jitter_x,
///   y * spacing_y + sin(y * PI / angle_divisor) * jitter_y)`.
/// Unsettled cells additionally orbit by `(orbit_x, orbit_y)` scaled with the
/// cosine and sine of `z * PI / angle_divisor`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    spacing_x: f64,
    spacing_y: f64,
    jitter_x: f64,
    jitter_y: f64,
    orbit_x: f64,
    orbit_y: f64,
    angle_divisor: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            spacing_x: 10.0,
            spacing_y: 3.0,
            jitter_x: 2.0,
            jitter_y: 1.0,
            orbit_x: 1.0,
            orbit_y: 0.5,
            angle_divisor: 11.0,
        }
    }
}

impl ProjectionConfig {
    /// Returns the horizontal distance between lattice columns.
    pub fn spacing_x(&self) -> f64 {
        self.spacing_x
    }

    /// Returns the vertical distance between lattice rows.
    pub fn spacing_y(&self) -> f64 {
        self.spacing_y
    }

    /// Returns the horizontal cosmetic jitter amplitude.
    pub fn jitter_x(&self) -> f64 {
        self.jitter_x
    }

    /// Returns the vertical cosmetic jitter amplitude.
    pub fn jitter_y(&self) -> f64 {
        self.jitter_y
    }

    /// Returns the horizontal orbit radius of unsettled nodes.
    pub fn orbit_x(&self) -> f64 {
        self.orbit_x
    }

    /// Returns the vertical orbit radius of unsettled nodes.
    pub fn orbit_y(&self) -> f64 {
        self.orbit_y
    }

    /// Returns the divisor of PI used for jitter and orbit angles.
    pub fn angle_divisor(&self) -> f64 {
        self.angle_divisor
    }

    /// Returns a copy with different column and row spacing.
    pub fn with_spacing(mut self, spacing_x: f64, spacing_y: f64) -> Self {
        self.spacing_x = spacing_x;
        self.spacing_y = spacing_y;
        self
    }

    /// Returns a copy with different jitter amplitudes.
    pub fn with_jitter(mut self, jitter_x: f64, jitter_y: f64) -> Self {
        self.jitter_x = jitter_x;
        self.jitter_y = jitter_y;
        self
    }
}
