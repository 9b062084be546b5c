//! The sink simulation.
//!
//! Every concept with a key primitive becomes a [`Sinker`] that starts on
//! the top layer of a [`Lattice`]. Each pass, sinkers are visited from the
//! heaviest to the lightest and pushed one step down and toward the nodes
//! they are pulled by. A sinker that finds every candidate cell taken
//! bounces back along its push instead. The run ends once every sinker
//! rests on the floor or the pass cap is reached.

use indexmap::IndexSet;
use log::{debug, trace, warn};

use sediment_core::{diagram::Diagram, identifier::Id};

use super::{
    lattice::{Cell, Lattice},
    relation::{self, effective_pulls, effective_weights},
    sinker::{Direction, Sinker},
};
use crate::config::SimulationConfig;

/// Outcome of [`Simulation::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SinkReport {
    passes: usize,
    converged: bool,
    unresolved: Vec<Id>,
}

impl SinkReport {
    /// Number of passes executed.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// True when every sinker reached the floor.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Sinkers still above the floor when the run stopped, in input order.
    pub fn unresolved(&self) -> &[Id] {
        &self.unresolved
    }
}

/// Memoized weights and directions for the current lattice state.
///
/// Any committed move invalidates every entry. The `weighing` and
/// `steering` entries hold the stack frame of each node currently being
/// evaluated so that cyclic relations terminate. A result that depends on
/// a cut made at or above its own frame only holds for that evaluation
/// root and is never cached, so every query sees the same values as a
/// fresh evaluation started at the queried node.
#[derive(Debug, Clone)]
struct Forces {
    weights: Vec<Option<f64>>,
    directions: Vec<Option<Direction>>,
    weighing: Vec<Option<usize>>,
    steering: Vec<Option<usize>>,
    frame: usize,
}

impl Forces {
    fn new(len: usize) -> Self {
        Self {
            weights: vec![None; len],
            directions: vec![None; len],
            weighing: vec![None; len],
            steering: vec![None; len],
            frame: 0,
        }
    }

    fn reset(&mut self) {
        self.weights.fill(None);
        self.directions.fill(None);
    }

    fn weight(&mut self, sinkers: &[Sinker], node: usize) -> f64 {
        self.weigh(sinkers, node).0
    }

    fn direction(&mut self, sinkers: &[Sinker], node: usize) -> Direction {
        self.steer(sinkers, node).0
    }

    /// Returns the weight of `node` and the shallowest frame at which a
    /// cycle was cut while computing it.
    fn weigh(&mut self, sinkers: &[Sinker], node: usize) -> (f64, Option<usize>) {
        if let Some(weight) = self.weights[node] {
            return (weight, None);
        }
        if sinkers[node].is_settled() {
            self.weights[node] = Some(0.0);
            return (0.0, None);
        }
        if let Some(frame) = self.weighing[node] {
            // Cycle: the node is already being weighed further up.
            return (0.0, Some(frame));
        }

        let frame = self.frame;
        self.weighing[node] = Some(frame);
        self.frame += 1;
        let mut weight = 1.0;
        let mut cut = None;
        for load in effective_weights(sinkers, node) {
            let (load_weight, load_cut) = self.weigh(sinkers, load);
            weight += 0.5 * load_weight;
            cut = shallowest(cut, load_cut);
        }
        self.frame -= 1;
        self.weighing[node] = None;

        if cut.is_none_or(|cut| cut > frame) {
            self.weights[node] = Some(weight);
        }
        (weight, cut)
    }

    /// Returns the direction of `node` and the shallowest frame at which a
    /// cycle was cut while computing it.
    fn steer(&mut self, sinkers: &[Sinker], node: usize) -> (Direction, Option<usize>) {
        if let Some(direction) = self.directions[node] {
            return (direction, None);
        }

        let weight = self.weight(sinkers, node);
        let here = sinkers[node].cell();
        let (mut x, mut y) = (0.0, 0.0);

        let frame = self.frame;
        self.steering[node] = Some(frame);
        self.frame += 1;
        let mut cut = None;
        for target in effective_pulls(sinkers, node) {
            let there = sinkers[target].cell();
            x += nudge(there.x as f64 - here.x as f64);
            y += nudge(there.y as f64 - here.y as f64);
            let on_stack = self.steering[target];
            match on_stack {
                Some(target_frame) => cut = shallowest(cut, Some(target_frame)),
                None => {
                    let (onward, onward_cut) = self.steer(sinkers, target);
                    x += onward.x;
                    y += onward.y;
                    cut = shallowest(cut, onward_cut);
                }
            }
        }
        self.frame -= 1;
        self.steering[node] = None;

        let direction = Direction::from_pull(x, y, weight);
        if cut.is_none_or(|cut| cut > frame) {
            self.directions[node] = Some(direction);
        }
        (direction, cut)
    }
}

fn shallowest(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    a.into_iter().chain(b).min()
}

/// Moves an offset one unit toward zero, so an adjacent target exerts no pull.
fn nudge(delta: f64) -> f64 {
    if delta >= 0.0 { delta - 1.0 } else { delta + 1.0 }
}

/// Returns the integer candidates for one target coordinate.
///
/// The truncated value comes first, followed by its neighbour on the side
/// of the fractional part. An integral target yields the same value twice.
fn candidates(target: f64) -> [i64; 2] {
    // Saturating; NaN maps to 0.
    let truncated = target as i64;
    if target < truncated as f64 {
        [truncated, truncated.saturating_sub(1)]
    } else if target > truncated as f64 {
        [truncated, truncated.saturating_add(1)]
    } else {
        [truncated, truncated]
    }
}

/// State of one sink simulation over a diagram.
#[derive(Debug, Clone)]
pub struct Simulation {
    index: IndexSet<Id>,
    sinkers: Vec<Sinker>,
    lattice: Lattice,
    forces: Forces,
    max_passes: usize,
}

impl Simulation {
    /// Creates the sinkers for `diagram` and links them.
    ///
    /// Concepts without primitives are left out, and connector ends naming
    /// them are ignored.
    pub fn new(diagram: &Diagram, config: &SimulationConfig) -> Self {
        let index: IndexSet<Id> = diagram
            .concepts()
            .filter(|concept| concept.key_primitive().is_some())
            .map(|concept| concept.id())
            .collect();

        let mut lattice = Lattice::for_count(index.len(), config.depth_factor());
        let mut sinkers = Vec::with_capacity(index.len());
        for (position, &id) in index.iter().enumerate() {
            let cell = lattice.initial_cell(position);
            lattice.set(cell, position);
            sinkers.push(Sinker::new(id, cell));
        }

        relation::link(&mut sinkers, &index, diagram.connectors());

        debug!(
            sinkers_len = sinkers.len(),
            side = lattice.side(),
            depth = lattice.depth();
            "Simulation prepared",
        );

        Self {
            forces: Forces::new(sinkers.len()),
            index,
            sinkers,
            lattice,
            max_passes: config.max_passes(),
        }
    }

    /// Returns the lattice.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Returns the sinkers in input order.
    pub fn sinkers(&self) -> &[Sinker] {
        &self.sinkers
    }

    /// Returns the current cell of the sinker for `id`.
    pub fn cell(&self, id: Id) -> Option<Cell> {
        self.position_of(id).map(|node| self.sinkers[node].cell())
    }

    /// Returns the current weight of the sinker for `id`.
    ///
    /// A settled sinker weighs nothing. Otherwise the weight is one plus
    /// half the weight of every non-mutual sinker resting on it.
    pub fn weight(&mut self, id: Id) -> Option<f64> {
        let node = self.position_of(id)?;
        Some(self.forces.weight(&self.sinkers, node))
    }

    /// Returns the current direction of the sinker for `id`.
    pub fn direction(&mut self, id: Id) -> Option<Direction> {
        let node = self.position_of(id)?;
        Some(self.forces.direction(&self.sinkers, node))
    }

    /// Returns true once every sinker rests on the floor.
    pub fn is_settled(&self) -> bool {
        self.sinkers.iter().all(Sinker::is_settled)
    }

    /// Returns every sinker's identifier with its current cell, in input order.
    pub fn placements(&self) -> impl Iterator<Item = (Id, Cell)> + '_ {
        self.sinkers
            .iter()
            .map(|sinker| (sinker.id(), sinker.cell()))
    }

    /// Runs passes until every sinker settles or the pass cap is reached.
    ///
    /// Hitting the cap is not an error: the report lists the sinkers that
    /// are still above the floor and they keep their last cell.
    pub fn run(&mut self) -> SinkReport {
        let mut passes = 0;
        while passes < self.max_passes && !self.is_settled() {
            self.pass();
            passes += 1;
        }

        let unresolved: Vec<Id> = self
            .sinkers
            .iter()
            .filter(|sinker| !sinker.is_settled())
            .map(Sinker::id)
            .collect();
        let converged = unresolved.is_empty();

        debug!(passes, converged; "Simulation finished");
        if !converged {
            warn!(
                passes,
                unresolved_len = unresolved.len();
                "Simulation stopped before every node settled",
            );
        }

        SinkReport {
            passes,
            converged,
            unresolved,
        }
    }

    /// Runs a single pass: every sinker gets one step, heaviest first.
    ///
    /// Ties in weight keep input order.
    pub fn pass(&mut self) {
        self.forces.reset();
        let weights: Vec<f64> = (0..self.sinkers.len())
            .map(|node| self.forces.weight(&self.sinkers, node))
            .collect();

        let mut order: Vec<usize> = (0..self.sinkers.len()).collect();
        order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));

        for node in order {
            self.sink(node);
        }
    }

    fn position_of(&self, id: Id) -> Option<usize> {
        self.index.get_index_of(&id)
    }

    fn sink(&mut self, node: usize) {
        let here = self.sinkers[node].cell();
        if here.is_floor() {
            return;
        }

        let speed = self.forces.weight(&self.sinkers, node);
        let direction = self.forces.direction(&self.sinkers, node);
        let variation = 0.5 - ((here.x * here.y) % 3) as f64;

        let [xs, ys, zs] = [
            here.x as f64 + direction.x * speed,
            here.y as f64 + direction.y * speed,
            here.z as f64 + direction.z * speed + variation,
        ]
        .map(candidates);

        for x in xs {
            for y in ys {
                for z in zs {
                    let cell = self.lattice.clamp_cell(x, y, z);
                    if self.lattice.is_free(cell) {
                        self.relocate(node, cell);
                        self.sinkers[node].thaw();
                        return;
                    }
                }
            }
        }

        self.bounce(node, direction, speed);
    }

    /// Pushes a blocked sinker back against its direction.
    ///
    /// The horizontal push is perturbed by the frozen counter, alternating
    /// sides, so that repeatedly blocked sinkers try cells further away.
    fn bounce(&mut self, node: usize, direction: Direction, speed: f64) {
        let here = self.sinkers[node].cell();
        let frozen = f64::from(self.sinkers[node].frozen());
        let tweak = if self.sinkers[node].frozen() % 2 == 0 {
            frozen
        } else {
            -frozen
        };

        let cell = self.lattice.clamp_cell(
            (here.x as f64 - (direction.x + tweak) * speed) as i64,
            (here.y as f64 + (-direction.y - tweak) * speed) as i64,
            (here.z as f64 - direction.z * speed) as i64,
        );

        if self.lattice.is_free(cell) {
            self.relocate(node, cell);
        } else {
            self.sinkers[node].freeze();
            trace!(
                sinker = self.sinkers[node].to_string(),
                frozen = self.sinkers[node].frozen();
                "Blocked",
            );
        }
    }

    fn relocate(&mut self, node: usize, cell: Cell) {
        let from = self.sinkers[node].cell();
        self.lattice.clear(from);
        self.lattice.set(cell, node);
        self.sinkers[node].move_to(cell);
        self.forces.reset();
        trace!(
            sinker = self.sinkers[node].id().to_string(),
            from = from.to_string(),
            to = cell.to_string();
            "Moved",
        );
    }
}
