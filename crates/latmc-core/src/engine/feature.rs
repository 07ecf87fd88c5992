use super::error::EngineError;
use super::moves::Move;
use crate::core::models::MonomerGraph;
use std::any::Any;

/// Ordering constraints a feature declares against its peers, by
/// feature name.
///
/// Constraints naming a feature that is not registered are inert; a
/// feature set whose constraints form a cycle fails at engine
/// construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureConstraints {
    /// Names of features this one must run before.
    pub before: &'static [&'static str],
    /// Names of features this one must run after.
    pub after: &'static [&'static str],
}

/// A capability module adding one physical rule or bookkeeping concern
/// to the simulation.
///
/// The engine drives every registered feature through a strict
/// two-phase protocol per move:
///
/// 1. **Check** - [`check_move`](Self::check_move) may veto (return
///    `Ok(false)`) or scale the move's acceptance probability by a
///    non-negative factor. It takes `&self`: the check phase is
///    side-effect-free by construction. A feature with no opinion on a
///    move kind returns `Ok(true)` without touching the probability.
/// 2. **Apply** - only after every feature checked `true` and the
///    acceptance draw passed, [`apply_move`](Self::apply_move) updates
///    the feature's own derived state. The graph still holds the
///    pre-move state at this point; the engine commits the graph
///    mutation after the last feature applied.
///
/// [`synchronize`](Self::synchronize) rebuilds the derived state from
/// scratch whenever the graph was changed outside the move pipeline
/// (bulk load, external setup).
pub trait Feature: Any {
    /// Stable name used by ordering constraints and error messages.
    fn name(&self) -> &'static str;

    /// Ordering constraints against other registered features.
    fn constraints(&self) -> FeatureConstraints {
        FeatureConstraints::default()
    }

    /// Check phase: veto or weight the move. Must not mutate any state
    /// beyond the move's probability.
    fn check_move(&self, graph: &MonomerGraph, mv: &mut Move) -> Result<bool, EngineError>;

    /// Apply phase: update this feature's derived state for an accepted
    /// move. `graph` still holds the pre-move state.
    fn apply_move(&mut self, graph: &MonomerGraph, mv: &Move) -> Result<(), EngineError>;

    /// Full rebuild of the derived state from the current graph.
    fn synchronize(&mut self, graph: &MonomerGraph) -> Result<(), EngineError>;

    /// Upcast for typed read access through the engine.
    fn as_any(&self) -> &dyn Any;
}
