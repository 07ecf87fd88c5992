//! The built-in physical-constraint features.

pub mod bending;
pub mod bond_vector_set;
pub mod excluded_volume;
pub mod interaction;
pub mod labels;
pub mod reactive;

pub use bending::{BendingPotential, ChainPosition};
pub use bond_vector_set::BondVectorSet;
pub use excluded_volume::ExcludedVolume;
pub use interaction::NearestNeighborInteraction;
pub use labels::LabelBookkeeping;
pub use reactive::{ReactiveBondConfig, ReactiveBonds};
