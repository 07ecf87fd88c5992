//! Pure lookup-table representations of the physical potentials.
//!
//! The engine never derives a functional form; it only needs numbers.
//! This module holds the species-pair contact-energy table, the
//! bond-angle probability table, and the bond-vector encoding both are
//! keyed by.

pub mod bond_vectors;
pub mod tables;

pub use bond_vectors::{bond_vector_from_index, bond_vector_index, classic_bfm_vectors};
pub use tables::{BendingTable, InteractionEnergies, PairEnergy, ParamLoadError};
