//! Data structures for the shared monomer graph.
//!
//! The graph is the single source of truth for monomer positions and
//! bond connectivity; every lattice a feature maintains is derived
//! state that mirrors it.

pub mod graph;
pub mod monomer;

pub use graph::{GraphError, MonomerGraph};
pub use monomer::{Attributes, Monomer};
