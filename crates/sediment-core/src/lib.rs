//! Sediment Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Sediment layout
//! engine and its command-line front end. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Attachment**: Compass positions where connectors meet a node ([`attachment`] module)
//! - **Diagram**: Concepts, primitives and connectors of a class diagram ([`diagram`] module)

pub mod attachment;
pub mod diagram;
pub mod geometry;
pub mod identifier;
