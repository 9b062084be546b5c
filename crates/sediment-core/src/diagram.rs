//! Class diagram model consumed and updated by the layout engine.
//!
//! A [`Diagram`] is an ordered set of [`Concept`]s (one per class or
//! interface) and the [`Connector`]s between them. Each concept owns the
//! visual [`Primitive`]s that render it; the first one is its *key*
//! primitive, whose anchor is the concept's recorded position and whose
//! bounds are where connectors attach.
//!
//! Extraction of concepts from source code and serialization to a drawing
//! format happen elsewhere; this module only carries the data that layout
//! reads and rewrites.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    attachment::AttachmentPoint,
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

/// Errors raised while assembling a [`Diagram`].
#[derive(Debug, Error, PartialEq)]
pub enum DiagramError {
    #[error("Duplicate concept: {0}")]
    DuplicateConcept(Id),
}

/// A single visual element of a concept (a box, a label, a compartment).
///
/// Layout only ever moves a primitive; its size and name are opaque to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    name: String,
    #[serde(default)]
    anchor: Point,
    #[serde(default)]
    size: Size,
}

impl Primitive {
    /// Creates a new primitive anchored at its top-left corner.
    pub fn new(name: impl Into<String>, anchor: Point, size: Size) -> Self {
        Self {
            name: name.into(),
            anchor,
            size,
        }
    }

    /// Returns the primitive name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the top-left anchor of the primitive.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Returns the primitive size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the bounding box of the primitive.
    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.anchor, self.size)
    }

    fn translate(&mut self, offset: Point) {
        self.anchor = self.anchor.add_point(offset);
    }
}

/// One modeled concept, such as a class or an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    name: Id,
    #[serde(default)]
    primitives: Vec<Primitive>,
}

impl Concept {
    /// Creates a concept without any primitives.
    pub fn new(name: Id) -> Self {
        Self {
            name,
            primitives: Vec::new(),
        }
    }

    /// Appends a primitive (builder style). The first primitive added is the key primitive.
    pub fn with_primitive(mut self, primitive: Primitive) -> Self {
        self.primitives.push(primitive);
        self
    }

    /// Returns the concept identifier.
    pub fn id(&self) -> Id {
        self.name
    }

    /// Returns the primitives of this concept in drawing order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Returns the key primitive, if the concept has any primitive at all.
    pub fn key_primitive(&self) -> Option<&Primitive> {
        self.primitives.first()
    }

    /// Returns the anchor of the key primitive.
    pub fn anchor(&self) -> Option<Point> {
        self.key_primitive().map(Primitive::anchor)
    }

    /// Moves the key primitive to `anchor` and every other primitive by the same delta.
    ///
    /// The key anchor is assigned rather than accumulated so that placing a
    /// concept at the position it already occupies is an exact no-op.
    /// Returns the applied delta, or `None` for a concept without primitives.
    pub fn place(&mut self, anchor: Point) -> Option<Point> {
        let (key, rest) = self.primitives.split_first_mut()?;
        let delta = anchor.sub_point(key.anchor);
        key.anchor = anchor;
        for primitive in rest {
            primitive.translate(delta);
        }
        Some(delta)
    }
}

/// The UML relationship drawn by a connector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    #[default]
    Generalization,
    Realization,
    Association,
    Dependency,
}

/// Orientation of one segment of an orthogonal connector route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    UpDown,
    LeftRight,
}

/// A three-segment orthogonal route between the two ends of a connector.
///
/// The route leaves the first endpoint along `orientations[0]`, turns at
/// `corners[0]`, runs along `orientations[1]`, turns at `corners[1]` and
/// reaches the last endpoint along `orientations[2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrthogonalRoute {
    orientations: [Orientation; 3],
    corners: [Point; 2],
}

impl OrthogonalRoute {
    /// Computes the route between two attachment positions.
    ///
    /// Connectors leaving a top or bottom edge and arriving on a top or
    /// bottom edge bend through the horizontal half-way line; every other
    /// combination bends through the vertical half-way line.
    pub fn between(
        from: Point,
        from_attachment: AttachmentPoint,
        to: Point,
        to_attachment: AttachmentPoint,
    ) -> Self {
        let halfway = from.midpoint(to);
        if from_attachment.is_top_or_bottom() && to_attachment.is_top_or_bottom() {
            Self {
                orientations: [
                    Orientation::UpDown,
                    Orientation::LeftRight,
                    Orientation::UpDown,
                ],
                corners: [
                    Point::new(from.x(), halfway.y()),
                    Point::new(to.x(), halfway.y()),
                ],
            }
        } else {
            Self {
                orientations: [
                    Orientation::LeftRight,
                    Orientation::UpDown,
                    Orientation::LeftRight,
                ],
                corners: [
                    Point::new(halfway.x(), from.y()),
                    Point::new(halfway.x(), to.y()),
                ],
            }
        }
    }

    /// Returns the orientation of the three segments.
    pub fn orientations(&self) -> [Orientation; 3] {
        self.orientations
    }

    /// Returns the two corner points.
    pub fn corners(&self) -> [Point; 2] {
        self.corners
    }
}

/// One end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "EndpointSource")]
pub struct Endpoint {
    concept: Id,
    attachment: AttachmentPoint,
    position: Point,
}

/// Endpoints may be written either as a bare concept name or as a full table.
#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointSource {
    Name(Id),
    Full {
        concept: Id,
        #[serde(default)]
        attachment: AttachmentPoint,
        #[serde(default)]
        position: Point,
    },
}

impl From<EndpointSource> for Endpoint {
    fn from(source: EndpointSource) -> Self {
        match source {
            EndpointSource::Name(concept) => Endpoint::new(concept),
            EndpointSource::Full {
                concept,
                attachment,
                position,
            } => Self {
                concept,
                attachment,
                position,
            },
        }
    }
}

impl Endpoint {
    /// Creates an endpoint attached at the default position of `concept`.
    pub fn new(concept: Id) -> Self {
        Self {
            concept,
            attachment: AttachmentPoint::default(),
            position: Point::default(),
        }
    }

    /// Returns the concept this endpoint connects to.
    pub fn concept(&self) -> Id {
        self.concept
    }

    /// Returns the attachment point on the concept's key primitive.
    pub fn attachment(&self) -> AttachmentPoint {
        self.attachment
    }

    /// Returns the diagram position of the attachment point.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Sets the attachment point.
    pub fn set_attachment(&mut self, attachment: AttachmentPoint) {
        self.attachment = attachment;
    }

    /// Sets the diagram position of the attachment point.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

/// A directed relationship between concepts.
///
/// The first endpoint is the heavy end (e.g. the superclass of a
/// generalization); every following endpoint is a light end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    #[serde(default)]
    kind: ConnectorKind,
    endpoints: Vec<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    route: Option<OrthogonalRoute>,
}

impl Connector {
    /// Creates a connector from its heavy end followed by its light ends.
    pub fn new(kind: ConnectorKind, concepts: impl IntoIterator<Item = Id>) -> Self {
        Self {
            kind,
            endpoints: concepts.into_iter().map(Endpoint::new).collect(),
            route: None,
        }
    }

    /// Creates a generalization connector from `light` (subclass) to `heavy` (superclass).
    pub fn generalization(heavy: Id, light: Id) -> Self {
        Self::new(ConnectorKind::Generalization, [heavy, light])
    }

    /// Returns the relationship kind.
    pub fn kind(&self) -> ConnectorKind {
        self.kind
    }

    /// Returns the endpoints, heavy end first.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Returns mutable access to the endpoints.
    pub fn endpoints_mut(&mut self) -> &mut [Endpoint] {
        &mut self.endpoints
    }

    /// Returns the orthogonal route, once one has been computed.
    pub fn route(&self) -> Option<&OrthogonalRoute> {
        self.route.as_ref()
    }

    /// Sets or clears the orthogonal route.
    pub fn set_route(&mut self, route: Option<OrthogonalRoute>) {
        self.route = route;
    }
}

/// A class diagram: concepts in insertion order plus their connectors.
///
/// # Examples
///
/// ```
/// # use sediment_core::diagram::{Concept, Connector, Diagram, Primitive};
/// # use sediment_core::geometry::{Point, Size};
/// # use sediment_core::identifier::Id;
/// let mut diagram = Diagram::new();
/// for name in ["Animal", "Dog"] {
///     let concept = Concept::new(Id::new(name))
///         .with_primitive(Primitive::new("box", Point::default(), Size::new(6.0, 2.0)));
///     diagram.add_concept(concept).unwrap();
/// }
/// diagram.add_connector(Connector::generalization(Id::new("Animal"), Id::new("Dog")));
///
/// assert_eq!(diagram.len(), 2);
/// assert!(diagram.add_concept(Concept::new(Id::new("Dog"))).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DiagramDocument", into = "DiagramDocument")]
pub struct Diagram {
    concepts: IndexMap<Id, Concept>,
    connectors: Vec<Connector>,
}

/// Flat serialized form of a [`Diagram`].
#[derive(Serialize, Deserialize)]
struct DiagramDocument {
    #[serde(default)]
    concepts: Vec<Concept>,
    #[serde(default)]
    connectors: Vec<Connector>,
}

impl TryFrom<DiagramDocument> for Diagram {
    type Error = DiagramError;

    fn try_from(document: DiagramDocument) -> Result<Self, Self::Error> {
        Diagram::from_parts(document.concepts, document.connectors)
    }
}

impl From<Diagram> for DiagramDocument {
    fn from(diagram: Diagram) -> Self {
        Self {
            concepts: diagram.concepts.into_values().collect(),
            connectors: diagram.connectors,
        }
    }
}

impl Diagram {
    /// Creates an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a diagram from concepts and connectors.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::DuplicateConcept`] if two concepts share an identifier.
    pub fn from_parts(
        concepts: impl IntoIterator<Item = Concept>,
        connectors: impl IntoIterator<Item = Connector>,
    ) -> Result<Self, DiagramError> {
        let mut diagram = Self::new();
        for concept in concepts {
            diagram.add_concept(concept)?;
        }
        diagram.connectors.extend(connectors);
        debug!(
            concepts_len = diagram.concepts.len(),
            connectors_len = diagram.connectors.len();
            "Diagram assembled",
        );
        Ok(diagram)
    }

    /// Adds a concept.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::DuplicateConcept`] if the identifier is already present.
    pub fn add_concept(&mut self, concept: Concept) -> Result<(), DiagramError> {
        let id = concept.id();
        if self.concepts.contains_key(&id) {
            return Err(DiagramError::DuplicateConcept(id));
        }
        self.concepts.insert(id, concept);
        Ok(())
    }

    /// Adds a connector. Endpoints naming unknown concepts are kept as-is.
    pub fn add_connector(&mut self, connector: Connector) {
        self.connectors.push(connector);
    }

    /// Returns the number of concepts.
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Returns true if the diagram has no concepts.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Returns the concept with the given identifier.
    pub fn concept(&self, id: Id) -> Option<&Concept> {
        self.concepts.get(&id)
    }

    /// Returns mutable access to the concept with the given identifier.
    pub fn concept_mut(&mut self, id: Id) -> Option<&mut Concept> {
        self.concepts.get_mut(&id)
    }

    /// Returns the concepts in insertion order.
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    /// Returns the connectors in insertion order.
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Returns mutable access to the connectors.
    pub fn connectors_mut(&mut self) -> &mut [Connector] {
        &mut self.connectors
    }
}
