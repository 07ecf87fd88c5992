//! # Workflows Module
//!
//! The public, user-facing layer: ties the engine and core together
//! into complete procedures. Currently the Monte Carlo run loop plus
//! the entry point setup updaters use to feed moves through the same
//! pipeline.

pub mod run;

pub use run::{RunConfig, RunConfigBuilder, RunConfigError, RunStats, apply_setup_move, run};
