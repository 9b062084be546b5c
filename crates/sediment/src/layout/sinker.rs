//! Sinkers: the particles of the simulation.

use std::{collections::BTreeSet, fmt};

use sediment_core::identifier::Id;

use super::lattice::Cell;

/// One concept as a particle in the lattice.
///
/// `pulls` and `weights` hold indices into the simulation's sinker arena.
/// A sinker is pulled toward every node in `pulls` and carries every node
/// in `weights` on top of it.
#[derive(Debug, Clone)]
pub struct Sinker {
    id: Id,
    cell: Cell,
    pulls: BTreeSet<usize>,
    weights: BTreeSet<usize>,
    frozen: u32,
}

impl Sinker {
    pub fn new(id: Id, cell: Cell) -> Self {
        Self {
            id,
            cell,
            pulls: BTreeSet::new(),
            weights: BTreeSet::new(),
            frozen: 0,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// Returns true once the sinker rests on the floor.
    pub fn is_settled(&self) -> bool {
        self.cell.is_floor()
    }

    /// Indices of the sinkers this one is attracted toward.
    pub fn pulls(&self) -> &BTreeSet<usize> {
        &self.pulls
    }

    /// Indices of the sinkers resting on this one.
    pub fn weights(&self) -> &BTreeSet<usize> {
        &self.weights
    }

    /// Number of consecutive passes this sinker failed to move.
    pub fn frozen(&self) -> u32 {
        self.frozen
    }

    pub(super) fn add_pull(&mut self, target: usize) {
        self.pulls.insert(target);
    }

    pub(super) fn add_weight(&mut self, load: usize) {
        self.weights.insert(load);
    }

    pub(super) fn move_to(&mut self, cell: Cell) {
        self.cell = cell;
    }

    pub(super) fn freeze(&mut self) {
        self.frozen = self.frozen.saturating_add(1);
    }

    pub(super) fn thaw(&mut self) {
        self.frozen = 0;
    }
}

impl fmt::Display for Sinker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.cell)
    }
}

/// Direction a sinker is pushed in during one step.
///
/// The horizontal part is normalized so that `x + y == 1`, unless it
/// vanished, in which case both are zero. The vertical part is the negated
/// weight, so heavier sinkers fall faster.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Direction {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Direction {
    /// Builds a direction from an accumulated horizontal pull and a weight.
    ///
    /// The horizontal components are divided by their sum, not by the
    /// Euclidean norm, so opposite signs can produce components larger
    /// than one.
    pub fn from_pull(x: f64, y: f64, weight: f64) -> Self {
        let sum = x + y;
        if sum == 0.0 {
            Self {
                x: 0.0,
                y: 0.0,
                z: -weight,
            }
        } else {
            Self {
                x: x / sum,
                y: y / sum,
                z: -weight,
            }
        }
    }

    /// Returns true when there is no horizontal pull.
    pub fn is_vertical(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_direction_sum_normalization() {
        let direction = Direction::from_pull(3.0, 1.0, 2.0);

        assert_approx_eq!(f64, direction.x, 0.75);
        assert_approx_eq!(f64, direction.y, 0.25);
        assert_approx_eq!(f64, direction.z, -2.0);
    }

    #[test]
    fn test_direction_opposite_signs() {
        let direction = Direction::from_pull(3.0, -1.0, 1.0);

        assert_approx_eq!(f64, direction.x, 1.5);
        assert_approx_eq!(f64, direction.y, -0.5);
    }

    #[test]
    fn test_direction_cancelled_pull_is_vertical() {
        let direction = Direction::from_pull(2.0, -2.0, 1.5);

        assert!(direction.is_vertical());
        assert_approx_eq!(f64, direction.z, -1.5);
    }

    #[test]
    fn test_sinker_frozen_counter() {
        let mut sinker = Sinker::new(Id::new("Frozen"), Cell::new(0, 0, 4));

        sinker.freeze();
        sinker.freeze();
        assert_eq!(sinker.frozen(), 2);

        sinker.thaw();
        assert_eq!(sinker.frozen(), 0);
        assert!(!sinker.is_settled());
        assert_eq!(sinker.to_string(), "Frozen@(0, 0, 4)");
    }
}
