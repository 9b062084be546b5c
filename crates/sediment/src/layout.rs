//! Sink-simulation layout.
//!
//! Layout runs in three stages:
//!
//! 1. [`relation`] derives pull and weight sets from the connectors.
//! 2. [`Simulation`] sinks every node through a sparse [`Lattice`] until
//!    they all rest on the floor or the pass cap is hit.
//! 3. [`Projector`] turns the final cells into diagram coordinates and
//!    re-anchors the connectors.

mod lattice;
mod projection;
pub mod relation;
mod simulation;
mod sinker;

pub use lattice::{Cell, Lattice, clamp};
pub use projection::Projector;
pub use simulation::{SinkReport, Simulation};
pub use sinker::{Direction, Sinker};
