//! The periodic lattice layer: coordinate folding, minimum-image
//! arithmetic, and the generic occupancy/tag array.

pub mod folding;
pub mod store;

pub use folding::{LatticeError, PeriodicBox};
pub use store::Lattice;

/// The constant offsets of the cells a monomer occupies on every lattice
/// it participates in: the unit cube at `position + {0, 1}³`.
pub const FOOTPRINT: [[i32; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];
