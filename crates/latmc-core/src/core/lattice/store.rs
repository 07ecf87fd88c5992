use super::folding::PeriodicBox;
use nalgebra::Vector3;

/// A periodic 3-D array mapping a folded coordinate to a cell value.
///
/// Every accessor folds each axis first, so callers pass unwrapped
/// coordinates and never fold themselves. Lookup and update are O(1).
/// The cell type is generic: the excluded-volume feature layers a
/// `Lattice<bool>` occupancy grid, the pairwise-interaction feature a
/// `Lattice<u8>` species grid over the same box.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice<T> {
    geometry: PeriodicBox,
    cells: Vec<T>,
}

impl<T: Copy + Default + PartialEq> Lattice<T> {
    /// Creates a lattice over the given box with every cell at the
    /// default value.
    pub fn new(geometry: PeriodicBox) -> Self {
        Self {
            geometry,
            cells: vec![T::default(); geometry.volume()],
        }
    }

    /// Returns the periodic box this lattice is defined over.
    pub fn periodic_box(&self) -> &PeriodicBox {
        &self.geometry
    }

    /// Reads the cell at a (possibly unwrapped) position.
    #[inline]
    pub fn get(&self, position: Vector3<i32>) -> T {
        self.cells[self.geometry.linear_index(position)]
    }

    /// Writes the cell at a (possibly unwrapped) position.
    #[inline]
    pub fn set(&mut self, position: Vector3<i32>, value: T) {
        let index = self.geometry.linear_index(position);
        self.cells[index] = value;
    }

    /// Moves a cell occupant: clears the old cell and writes the vacated
    /// value into the new cell.
    #[inline]
    pub fn move_occupant(&mut self, old_position: Vector3<i32>, new_position: Vector3<i32>) {
        let old_index = self.geometry.linear_index(old_position);
        let value = std::mem::take(&mut self.cells[old_index]);
        let new_index = self.geometry.linear_index(new_position);
        self.cells[new_index] = value;
    }

    /// Resets every cell to the default value.
    pub fn clear(&mut self) {
        self.cells.fill(T::default());
    }

    /// Returns `true` if the cell at `position` holds the default value.
    #[inline]
    pub fn is_vacant(&self, position: Vector3<i32>) -> bool {
        self.get(position) == T::default()
    }
}
