//! Integration tests for the sink-simulation layout.
//!
//! These exercise the public API the way a caller would: build a diagram,
//! run the engine or drive a [`Simulation`] pass by pass, then inspect
//! cells, weights and projected positions.

use sediment::{
    LayoutEngine,
    attachment::AttachmentPoint,
    config::{LayoutConfig, ProjectionConfig, SimulationConfig},
    diagram::{Concept, Connector, ConnectorKind, Diagram, Primitive},
    geometry::{Point, Size},
    identifier::Id,
    layout::{Cell, Projector, Simulation},
};

fn concept(name: &str) -> Concept {
    Concept::new(Id::new(name))
        .with_primitive(Primitive::new("box", Point::default(), Size::new(8.0, 2.0)))
        .with_primitive(Primitive::new(
            "title",
            Point::new(1.0, 0.5),
            Size::new(6.0, 1.0),
        ))
}

fn diagram(names: &[&str], connectors: &[&[&str]]) -> Diagram {
    Diagram::from_parts(
        names.iter().map(|name| concept(name)),
        connectors.iter().map(|ends| {
            Connector::new(
                ConnectorKind::Generalization,
                ends.iter().map(|name| Id::new(name)),
            )
        }),
    )
    .unwrap()
}

fn animals() -> Diagram {
    diagram(
        &["Animal", "Dog", "Cat"],
        &[&["Animal", "Dog"], &["Animal", "Cat"]],
    )
}

fn settle(diagram: &Diagram, config: &SimulationConfig) -> Simulation {
    let mut simulation = Simulation::new(diagram, config);
    let report = simulation.run();
    assert!(report.converged(), "did not converge: {report:?}");
    simulation
}

#[test]
fn test_animals_converge() {
    let mut simulation = Simulation::new(&animals(), &SimulationConfig::default());
    assert_eq!(simulation.lattice().side(), 3);

    let report = simulation.run();

    assert!(report.converged());
    assert_eq!(report.passes(), 383);
    assert_eq!(simulation.cell(Id::new("Animal")), Some(Cell::new(0, 0, 0)));
    assert_eq!(simulation.cell(Id::new("Dog")), Some(Cell::new(1, 1, 0)));
    assert_eq!(simulation.cell(Id::new("Cat")), Some(Cell::new(2, 0, 0)));
}

#[test]
fn test_superclass_outweighs_subclasses() {
    let mut simulation = Simulation::new(&animals(), &SimulationConfig::default());
    let [animal, dog, cat] = ["Animal", "Dog", "Cat"].map(Id::new);

    let mut passes = 0;
    while !simulation.cell(animal).unwrap().is_floor() {
        let animal_weight = simulation.weight(animal).unwrap();
        assert!(animal_weight > simulation.weight(dog).unwrap(), "pass {passes}");
        assert!(animal_weight > simulation.weight(cat).unwrap(), "pass {passes}");

        simulation.pass();
        passes += 1;
        assert!(passes < 10_000);
    }
}

#[test]
fn test_two_node_chain() {
    let diagram = diagram(&["A", "B"], &[&["A", "B"]]);

    let simulation = settle(&diagram, &SimulationConfig::default());

    let a = simulation.cell(Id::new("A")).unwrap();
    let b = simulation.cell(Id::new("B")).unwrap();
    assert!(a.is_floor() && b.is_floor());
    assert_ne!(a.column(), b.column());
}

#[test]
fn test_chain_weight_order() {
    let diagram = diagram(&["A", "B", "C"], &[&["A", "B"], &["B", "C"]]);
    let mut simulation = Simulation::new(&diagram, &SimulationConfig::default());
    let [a, b, c] = ["A", "B", "C"].map(Id::new);

    let mut checked = 0;
    while [a, b, c]
        .iter()
        .all(|&id| !simulation.cell(id).unwrap().is_floor())
    {
        let weights = [a, b, c].map(|id| simulation.weight(id).unwrap());
        assert!(weights[0] >= weights[1], "{weights:?}");
        assert!(weights[1] >= weights[2], "{weights:?}");
        simulation.pass();
        checked += 1;
    }

    assert!(checked > 0);
    assert!(simulation.run().converged());
}

#[test]
fn test_mutual_pair_converges() {
    let diagram = diagram(&["A", "B"], &[&["A", "B"], &["B", "A"]]);
    let mut simulation = Simulation::new(&diagram, &SimulationConfig::default());

    assert_eq!(simulation.weight(Id::new("A")), Some(1.0));
    assert_eq!(simulation.weight(Id::new("B")), Some(1.0));
    assert!(simulation.run().converged());
}

#[test]
fn test_cycle_converges() {
    let diagram = diagram(&["A", "B", "C"], &[&["A", "B"], &["B", "C"], &["C", "A"]]);

    let simulation = settle(&diagram, &SimulationConfig::default());

    assert!(simulation.is_settled());
}

#[test]
fn test_shallow_lattice() {
    let config = SimulationConfig::new(10_000, 1);

    let mut simulation = Simulation::new(&animals(), &config);
    assert_eq!(simulation.lattice().depth(), 3);
    let report = simulation.run();

    assert!(report.converged());
    assert_eq!(report.passes(), 2);
}

#[test]
fn test_weights_vanish_on_floor() {
    let mut simulation = settle(&animals(), &SimulationConfig::default());

    for name in ["Animal", "Dog", "Cat"] {
        assert_eq!(simulation.weight(Id::new(name)), Some(0.0));
    }
}

#[test]
fn test_unknown_endpoints_ignored() {
    let mut noisy = animals();
    noisy.add_connector(Connector::generalization(Id::new("Animal"), Id::new("Ghost")));
    noisy.add_connector(Connector::generalization(Id::new("Ghost"), Id::new("Dog")));

    let plain = settle(&animals(), &SimulationConfig::default());
    let noisy = settle(&noisy, &SimulationConfig::default());

    assert!(plain.placements().eq(noisy.placements()));
}

#[test]
fn test_pass_cap_reports_unresolved() {
    let config = LayoutConfig::new(SimulationConfig::new(50, 128), ProjectionConfig::default());
    let engine = LayoutEngine::new(config).unwrap();
    let mut diagram = animals();

    let report = engine.layout(&mut diagram);

    assert!(!report.converged());
    assert_eq!(report.passes(), 50);
    assert_eq!(report.unresolved().len(), 3);
    // Stalled nodes are still projected.
    let animal = diagram.concept(Id::new("Animal")).unwrap();
    assert_ne!(animal.anchor(), Some(Point::default()));
}

#[test]
fn test_engine_positions() {
    let engine = LayoutEngine::default();
    let mut diagram = animals();

    let report = engine.layout(&mut diagram);

    assert!(report.converged());
    let projector = Projector::default();
    let expected = [
        ("Animal", Cell::new(0, 0, 0)),
        ("Dog", Cell::new(1, 1, 0)),
        ("Cat", Cell::new(2, 0, 0)),
    ];
    for (name, cell) in expected {
        let concept = diagram.concept(Id::new(name)).unwrap();
        assert_eq!(concept.anchor(), Some(projector.project_cell(cell)), "{name}");
    }

    // Dog is one column over and one row down, which is mostly sideways.
    let connector = &diagram.connectors()[0];
    assert_eq!(connector.endpoints()[0].attachment(), AttachmentPoint::CentreRight);
    assert_eq!(connector.endpoints()[1].attachment(), AttachmentPoint::CentreLeft);
    assert!(connector.route().is_some());
}

#[test]
fn test_layout_is_repeatable() {
    let engine = LayoutEngine::default();
    let mut diagram = animals();

    engine.layout(&mut diagram);
    let first = diagram.clone();
    engine.layout(&mut diagram);

    assert_eq!(diagram, first);
}

#[test]
fn test_invalid_config_rejected() {
    let config = LayoutConfig::new(SimulationConfig::new(100, 0), ProjectionConfig::default());

    assert!(LayoutEngine::new(config).is_err());
}
