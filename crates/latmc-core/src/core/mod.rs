//! # Core Module
//!
//! Foundation layer of the simulation: stateless data structures and
//! pure lookups, with no knowledge of moves or acceptance rules.
//!
//! ## Architecture
//!
//! - **Monomer graph** ([`models`]) - monomers, bonds, and the adjacency
//!   bookkeeping that mirrors the bond map
//! - **Periodic lattice** ([`lattice`]) - coordinate folding,
//!   minimum-image arithmetic, and the generic cell array
//! - **Potential tables** ([`potentials`]) - contact-energy and
//!   bond-angle lookup tables plus the bond-vector encoding
//!
//! Everything stateful (features, the composition engine, the Monte
//! Carlo loop) lives in [`crate::engine`] and [`crate::workflows`].

pub mod lattice;
pub mod models;
pub mod potentials;
