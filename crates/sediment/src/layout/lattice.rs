//! Sparse 3-D occupancy lattice.
//!
//! The lattice is `side × side × depth` cells, but only occupied cells are
//! stored. `z == 0` is the floor that sinkers settle on; new sinkers start
//! on the top layer `z == depth - 1`.

use std::{collections::HashMap, fmt};

/// Integer position of a sinker in the lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Cell {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Returns true on the floor layer.
    pub fn is_floor(self) -> bool {
        self.z == 0
    }

    /// Returns the horizontal column `(x, y)` of this cell.
    pub fn column(self) -> (usize, usize) {
        (self.x, self.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Maps any integer into `[0, length - 1]`.
///
/// `length` must be at least 1.
///
/// # Examples
///
/// ```
/// # use sediment::layout::clamp;
/// assert_eq!(clamp(-4, 3), 0);
/// assert_eq!(clamp(1, 3), 1);
/// assert_eq!(clamp(3, 3), 2);
/// ```
pub fn clamp(value: i64, length: usize) -> usize {
    debug_assert!(length > 0, "lattice axes are never empty");
    let last = length.saturating_sub(1);
    if value < 0 {
        0
    } else {
        usize::try_from(value).map_or(last, |value| value.min(last))
    }
}

/// Occupancy map from cells to sinker indices.
#[derive(Debug, Clone)]
pub struct Lattice {
    side: usize,
    depth: usize,
    occupied: HashMap<Cell, usize>,
}

impl Lattice {
    /// Creates an empty lattice sized for `count` sinkers.
    ///
    /// The horizontal side is `ceil(sqrt(count)) + 1` so that every sinker
    /// has room to spread out; the depth is `side * depth_factor`.
    pub fn for_count(count: usize, depth_factor: usize) -> Self {
        let root = count.isqrt();
        let root = if root * root < count { root + 1 } else { root };
        let side = root + 1;
        Self {
            side,
            depth: side.saturating_mul(depth_factor.max(1)),
            occupied: HashMap::with_capacity(count),
        }
    }

    /// Returns the horizontal side length.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Returns the vertical depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the cell the `index`-th sinker starts in.
    ///
    /// Sinkers fill the top layer in row-major order: `x` cycles through
    /// `0..side` and `y` advances every `side` sinkers.
    pub fn initial_cell(&self, index: usize) -> Cell {
        Cell::new(index % self.side, index / self.side, self.depth - 1)
    }

    /// Clamps each coordinate into the lattice bounds.
    pub fn clamp_cell(&self, x: i64, y: i64, z: i64) -> Cell {
        Cell::new(
            clamp(x, self.side),
            clamp(y, self.side),
            clamp(z, self.depth),
        )
    }

    /// Returns the sinker occupying `cell`.
    pub fn get(&self, cell: Cell) -> Option<usize> {
        self.occupied.get(&cell).copied()
    }

    /// Returns true when no sinker occupies `cell`.
    pub fn is_free(&self, cell: Cell) -> bool {
        !self.occupied.contains_key(&cell)
    }

    /// Places sinker `index` in a free `cell`.
    pub fn set(&mut self, cell: Cell, index: usize) {
        let previous = self.occupied.insert(cell, index);
        debug_assert!(previous.is_none(), "cell {cell} was already occupied");
    }

    /// Empties `cell`, returning its previous occupant.
    pub fn clear(&mut self, cell: Cell) -> Option<usize> {
        self.occupied.remove(&cell)
    }

    /// Returns the number of occupied cells.
    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    /// Returns true when no cell is occupied.
    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing() {
        let cases = [(0, 1), (1, 2), (2, 3), (3, 3), (4, 3), (5, 4), (9, 4), (10, 5)];
        for (count, side) in cases {
            let lattice = Lattice::for_count(count, 128);
            assert_eq!(lattice.side(), side, "count={count}");
            assert_eq!(lattice.depth(), side * 128, "count={count}");
        }
    }

    #[test]
    fn test_initial_cells_row_major() {
        let lattice = Lattice::for_count(5, 2);
        assert_eq!(lattice.side(), 4);

        let cells: Vec<Cell> = (0..5).map(|i| lattice.initial_cell(i)).collect();
        assert_eq!(
            cells,
            [
                Cell::new(0, 0, 7),
                Cell::new(1, 0, 7),
                Cell::new(2, 0, 7),
                Cell::new(3, 0, 7),
                Cell::new(0, 1, 7),
            ]
        );
    }

    #[test]
    fn test_set_get_clear() {
        let mut lattice = Lattice::for_count(2, 1);
        let cell = Cell::new(1, 2, 0);

        assert!(lattice.is_free(cell));
        lattice.set(cell, 7);
        assert_eq!(lattice.get(cell), Some(7));
        assert!(!lattice.is_free(cell));
        assert_eq!(lattice.len(), 1);

        assert_eq!(lattice.clear(cell), Some(7));
        assert!(lattice.is_free(cell));
        assert!(lattice.is_empty());
    }

    #[test]
    fn test_clamp_cell() {
        let lattice = Lattice::for_count(4, 2);

        assert_eq!(lattice.clamp_cell(-1, 9, 3), Cell::new(0, 2, 3));
        assert_eq!(lattice.clamp_cell(i64::MIN, i64::MAX, 6), Cell::new(0, 2, 5));
    }

    #[test]
    fn test_clamp_edges() {
        assert_eq!(clamp(0, 1), 0);
        assert_eq!(clamp(1, 1), 0);
        assert_eq!(clamp(-1, 1), 0);
        assert_eq!(clamp(i64::MAX, usize::MAX), usize::try_from(i64::MAX).unwrap());
    }
}
