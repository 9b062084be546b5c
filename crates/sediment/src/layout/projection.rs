//! Projection of lattice cells back onto the diagram.
//!
//! Settled cells map onto a regular grid with a small cosine/sine jitter so
//! that rows and columns do not look mechanical. Cells still above the floor
//! get an extra orbit offset derived from their depth, which keeps stalled
//! nodes from landing exactly on top of a settled one.
//!
//! After the concepts are placed, every connector is re-anchored against
//! the new key primitive bounds.

use std::{collections::HashMap, f64::consts::PI};

use log::debug;

use sediment_core::{
    attachment::AttachmentPoint,
    diagram::{Connector, Diagram, OrthogonalRoute},
    geometry::{Bounds, Point},
    identifier::Id,
};

use super::lattice::Cell;
use crate::config::ProjectionConfig;

/// Maps lattice cells to diagram coordinates and updates the diagram.
#[derive(Debug, Clone, Default)]
pub struct Projector {
    config: ProjectionConfig,
}

impl Projector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Returns the diagram position for the key anchor of a node in `cell`.
    pub fn project_cell(&self, cell: Cell) -> Point {
        let config = &self.config;
        let angle = |value: usize| value as f64 * PI / config.angle_divisor();

        let mut x = cell.x as f64 * config.spacing_x() + angle(cell.x).cos() * config.jitter_x();
        let mut y = cell.y as f64 * config.spacing_y() + angle(cell.y).sin() * config.jitter_y();
        if !cell.is_floor() {
            x += angle(cell.z).cos() * config.orbit_x();
            y += angle(cell.z).sin() * config.orbit_y();
        }

        Point::new(x as f32, y as f32)
    }

    /// Moves every placed concept to the projection of its cell.
    ///
    /// All primitives of a concept move by the same delta as its key
    /// primitive. Identifiers without a matching concept are ignored.
    pub fn apply(&self, diagram: &mut Diagram, placements: impl IntoIterator<Item = (Id, Cell)>) {
        let mut placed = 0usize;
        for (id, cell) in placements {
            let anchor = self.project_cell(cell);
            let moved = diagram
                .concept_mut(id)
                .and_then(|concept| concept.place(anchor));
            if moved.is_some() {
                placed += 1;
            }
        }
        debug!(placed; "Concepts projected");
    }

    /// Recomputes connector attachment points, positions and routes.
    ///
    /// A connector between two known concepts gets attachment points facing
    /// each other and an orthogonal route. Any other connector keeps its
    /// attachment points; only the positions of known ends are refreshed
    /// and its route is cleared.
    pub fn reconnect(&self, diagram: &mut Diagram) {
        let keys: HashMap<Id, Bounds> = diagram
            .concepts()
            .filter_map(|concept| {
                concept
                    .key_primitive()
                    .map(|key| (concept.id(), key.bounds()))
            })
            .collect();

        for connector in diagram.connectors_mut() {
            let pair = match connector.endpoints() {
                [from, to] => keys
                    .get(&from.concept())
                    .copied()
                    .zip(keys.get(&to.concept()).copied()),
                _ => None,
            };

            match pair {
                Some((from, to)) => attach_pair(connector, from, to),
                None => refresh_positions(connector, &keys),
            }
        }
    }
}

fn attach_pair(connector: &mut Connector, from: Bounds, to: Bounds) {
    let dx = to.min_x() - from.min_x();
    let dy = to.min_y() - from.min_y();
    let from_attachment = AttachmentPoint::facing(dx, dy);
    let to_attachment = AttachmentPoint::facing(-dx, -dy);
    let from_position = from_attachment.position_on(from);
    let to_position = to_attachment.position_on(to);

    if let [first, second] = connector.endpoints_mut() {
        first.set_attachment(from_attachment);
        first.set_position(from_position);
        second.set_attachment(to_attachment);
        second.set_position(to_position);
    }
    connector.set_route(Some(OrthogonalRoute::between(
        from_position,
        from_attachment,
        to_position,
        to_attachment,
    )));
}

fn refresh_positions(connector: &mut Connector, keys: &HashMap<Id, Bounds>) {
    for endpoint in connector.endpoints_mut() {
        if let Some(&bounds) = keys.get(&endpoint.concept()) {
            endpoint.set_position(endpoint.attachment().position_on(bounds));
        }
    }
    connector.set_route(None);
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use sediment_core::{
        diagram::{Concept, ConnectorKind, Primitive},
        geometry::Size,
    };

    use super::*;

    fn concept(name: &str) -> Concept {
        Concept::new(Id::new(name))
            .with_primitive(Primitive::new("box", Point::default(), Size::new(6.0, 2.0)))
            .with_primitive(Primitive::new(
                "label",
                Point::new(0.5, 0.5),
                Size::new(5.0, 1.0),
            ))
    }

    #[test]
    fn test_project_origin() {
        let projector = Projector::default();

        let point = projector.project_cell(Cell::new(0, 0, 0));

        // cos(0) * 2.0 and sin(0) * 1.0
        assert_approx_eq!(f32, point.x(), 2.0);
        assert_approx_eq!(f32, point.y(), 0.0);
    }

    #[test]
    fn test_project_settled_cell() {
        let projector = Projector::default();

        let point = projector.project_cell(Cell::new(2, 1, 0));

        let expected_x = 20.0 + (2.0 * PI / 11.0).cos() * 2.0;
        let expected_y = 3.0 + (PI / 11.0).sin();
        assert_approx_eq!(f32, point.x(), expected_x as f32);
        assert_approx_eq!(f32, point.y(), expected_y as f32);
    }

    #[test]
    fn test_project_unsettled_orbit() {
        let projector = Projector::default();

        let floor = projector.project_cell(Cell::new(1, 1, 0));
        let above = projector.project_cell(Cell::new(1, 1, 11));

        // z = 11 is half a turn: cos = -1, sin = 0.
        assert_approx_eq!(f32, above.x() - floor.x(), -1.0, epsilon = 0.0001);
        assert_approx_eq!(f32, above.y() - floor.y(), 0.0, epsilon = 0.0001);
    }

    #[test]
    fn test_project_custom_spacing() {
        let config = ProjectionConfig::default()
            .with_spacing(20.0, 5.0)
            .with_jitter(0.0, 0.0);
        let projector = Projector::new(config);

        let point = projector.project_cell(Cell::new(3, 2, 0));

        assert_approx_eq!(f32, point.x(), 60.0);
        assert_approx_eq!(f32, point.y(), 10.0);
    }

    #[test]
    fn test_apply_moves_whole_concept() {
        let mut diagram = Diagram::from_parts([concept("Shape")], []).unwrap();
        let projector = Projector::default();

        projector.apply(&mut diagram, [(Id::new("Shape"), Cell::new(1, 0, 0))]);

        let shape = diagram.concept(Id::new("Shape")).unwrap();
        let anchor = shape.anchor().unwrap();
        assert_eq!(anchor, projector.project_cell(Cell::new(1, 0, 0)));
        let label = shape.primitives()[1].anchor();
        assert_approx_eq!(f32, label.x() - anchor.x(), 0.5);
        assert_approx_eq!(f32, label.y() - anchor.y(), 0.5);
    }

    #[test]
    fn test_apply_ignores_unknown_ids() {
        let mut diagram = Diagram::from_parts([concept("Shape")], []).unwrap();
        let before = diagram.clone();

        Projector::default().apply(&mut diagram, [(Id::new("Ghost"), Cell::new(1, 1, 0))]);

        assert_eq!(diagram, before);
    }

    #[test]
    fn test_reconnect_pair() {
        let mut diagram = Diagram::from_parts(
            [concept("Animal"), concept("Dog")],
            [Connector::generalization(Id::new("Animal"), Id::new("Dog"))],
        )
        .unwrap();
        let projector = Projector::default();
        projector.apply(
            &mut diagram,
            [
                (Id::new("Animal"), Cell::new(0, 0, 0)),
                (Id::new("Dog"), Cell::new(0, 2, 0)),
            ],
        );

        projector.reconnect(&mut diagram);

        let connector = &diagram.connectors()[0];
        let [animal, dog] = connector.endpoints() else {
            panic!("expected two endpoints");
        };
        assert_eq!(animal.attachment(), AttachmentPoint::BottomCentre);
        assert_eq!(dog.attachment(), AttachmentPoint::TopCentre);

        let animal_bounds = diagram.concept(Id::new("Animal")).unwrap().primitives()[0].bounds();
        assert_eq!(animal.position(), animal_bounds.center().add_point(Point::new(0.0, 1.0)));
        assert!(connector.route().is_some());
    }

    #[test]
    fn test_reconnect_other_arity_keeps_attachments() {
        let mut diagram = Diagram::from_parts(
            [concept("Base"), concept("Left"), concept("Right")],
            [Connector::new(
                ConnectorKind::Generalization,
                [Id::new("Base"), Id::new("Left"), Id::new("Right")],
            )],
        )
        .unwrap();

        Projector::default().reconnect(&mut diagram);

        let connector = &diagram.connectors()[0];
        for endpoint in connector.endpoints() {
            assert_eq!(endpoint.attachment(), AttachmentPoint::TopCentre);
            assert_eq!(endpoint.position(), Point::new(3.0, 0.0));
        }
        assert!(connector.route().is_none());
    }

    #[test]
    fn test_reconnect_unknown_end() {
        let mut diagram = Diagram::from_parts(
            [concept("Shape")],
            [Connector::generalization(Id::new("Shape"), Id::new("Ghost"))],
        )
        .unwrap();

        Projector::default().reconnect(&mut diagram);

        let endpoints = diagram.connectors()[0].endpoints();
        assert_eq!(endpoints[0].position(), Point::new(3.0, 0.0));
        assert_eq!(endpoints[1].position(), Point::default());
    }
}
