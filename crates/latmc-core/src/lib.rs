//! # latmc Core Library
//!
//! A lattice Monte Carlo engine for polymer physics in the
//! bond-fluctuation-model family: a monomer graph embedded in a
//! periodic simple-cubic lattice, evolved through randomized elementary
//! moves that composable physical-constraint features veto or weight
//! before a Metropolis-style accept decision.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to
//! keep the move-acceptance protocol auditable and the physics
//! pluggable.
//!
//! - **[`core`]: The Foundation.** Stateless data structures: the
//!   monomer graph (positions, bonds, attributes), the periodic lattice
//!   with its folding arithmetic, and pure potential lookup tables.
//!
//! - **[`engine`]: The Logic Core.** The stateful layer: move value
//!   objects, the `Feature` capability trait with its built-in
//!   implementations (excluded volume, bond-vector set, contact
//!   energies, bending, reactive bonds, label bookkeeping), and the
//!   composition engine that resolves feature ordering and drives the
//!   check/accept/apply/commit protocol.
//!
//! - **[`workflows`]: The Public API.** The highest-level entry points:
//!   the Monte Carlo run loop with progress reporting, and the hook
//!   setup updaters use to feed moves through the same pipeline.
//!
//! ## A Note on the Self-Bond Contract
//!
//! `MonomerGraph::connect(a, a)` is a silent, logged no-op rather than
//! an error. This mirrors long-standing behavior of this simulation
//! family that existing setup tooling relies on; it is surprising, so
//! it is documented here rather than guessed away.

pub mod core;
pub mod engine;
pub mod workflows;
