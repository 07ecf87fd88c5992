//! # Engine Module
//!
//! The stateful layer: moves, features, and the composition engine that
//! dispatches one through the other.
//!
//! ## Overview
//!
//! A Monte Carlo step proposes an elementary [`Move`](moves::Move) and
//! runs it through every registered [`Feature`](feature::Feature) in a
//! fixed, dependency-resolved order. Features veto or weight the move
//! during a side-effect-free check phase; only after a global accept
//! decision do they update their derived state, and the monomer graph
//! is mutated last of all.
//!
//! ## Architecture
//!
//! - **Moves** ([`moves`]) - the tagged union of elementary mutations
//!   with the running acceptance probability
//! - **Features** ([`feature`], [`features`]) - the capability trait and
//!   the built-in physical rules (excluded volume, bond-vector set,
//!   contact energies, bending, reactive bonds, labels)
//! - **Composition** ([`simulation`]) - ordering resolution, the
//!   check/accept/apply/commit protocol, and typed feature access
//! - **Proposal generation** ([`generator`]) - uniform random local and
//!   connect proposals
//! - **Progress** ([`progress`]) - callback-style progress reporting
//! - **Errors** ([`error`]) - engine-level error types

pub mod error;
pub mod feature;
pub mod features;
pub mod generator;
pub mod moves;
pub(crate) mod ordering;
pub mod progress;
pub mod simulation;
