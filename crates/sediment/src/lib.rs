//! Sediment - sink-simulation layout for class diagrams.
//!
//! Every concept of a class diagram is dropped into a 3-D lattice as a
//! weighted particle. Superclasses carry their subclasses as weight and sink
//! first; subclasses are pulled toward the classes they depend on. Once all
//! nodes rest on the floor, their cells are projected back onto 2-D
//! coordinates and the connectors are re-anchored.

pub mod config;
pub mod layout;

mod error;

pub use sediment_core::{attachment, diagram, geometry, identifier};

pub use error::SedimentError;
pub use layout::SinkReport;

use log::{info, trace};

use config::LayoutConfig;
use diagram::Diagram;
use layout::{Projector, Simulation};

/// Lays out diagrams with a fixed configuration.
///
/// # Examples
///
/// ```
/// use sediment::{
///     LayoutEngine,
///     config::LayoutConfig,
///     diagram::{Concept, Connector, Diagram, Primitive},
///     geometry::{Point, Size},
///     identifier::Id,
/// };
///
/// let mut diagram = Diagram::new();
/// for name in ["Animal", "Dog", "Cat"] {
///     let concept = Concept::new(Id::new(name))
///         .with_primitive(Primitive::new("box", Point::default(), Size::new(8.0, 2.0)));
///     diagram.add_concept(concept).unwrap();
/// }
/// diagram.add_connector(Connector::generalization(Id::new("Animal"), Id::new("Dog")));
/// diagram.add_connector(Connector::generalization(Id::new("Animal"), Id::new("Cat")));
///
/// let engine = LayoutEngine::new(LayoutConfig::default()).unwrap();
/// let report = engine.layout(&mut diagram);
///
/// assert!(report.converged());
/// ```
#[derive(Debug, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create a layout engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SedimentError::InvalidConfig`] when a setting is unusable.
    pub fn new(config: LayoutConfig) -> Result<Self, SedimentError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `diagram` in place.
    ///
    /// Concepts are moved to their projected positions, and connectors get
    /// new attachment points, positions and routes. Failing to converge
    /// within the pass cap is reported, not raised: unresolved nodes are
    /// projected from wherever they stopped.
    pub fn layout(&self, diagram: &mut Diagram) -> SinkReport {
        info!(
            concepts_len = diagram.len(),
            connectors_len = diagram.connectors().len();
            "Laying out diagram",
        );

        let mut simulation = Simulation::new(diagram, self.config.simulation());
        let report = simulation.run();

        let projector = Projector::new(self.config.projection().clone());
        projector.apply(diagram, simulation.placements());
        projector.reconnect(diagram);

        info!(
            passes = report.passes(),
            converged = report.converged();
            "Layout complete",
        );
        trace!(report:?; "Sink report");

        report
    }
}
