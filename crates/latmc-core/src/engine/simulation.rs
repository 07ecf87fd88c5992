use super::error::EngineError;
use super::feature::Feature;
use super::moves::{Move, MoveKind};
use super::ordering::resolve_order;
use crate::core::models::{Monomer, MonomerGraph};
use rand::Rng;
use tracing::{debug, info, trace};

/// Terminal outcome of one move dispatched through [`Simulation::try_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Every feature checked `true`, the acceptance draw passed, and the
    /// move was applied and committed to the graph.
    Committed,
    /// A feature vetoed the move during the check phase.
    Vetoed,
    /// All checks passed but the acceptance draw failed.
    Rejected,
}

/// The move-acceptance composition engine.
///
/// Owns the monomer graph and an ordered set of features. A move runs
/// `Init -> Checking -> {Accepted -> Applying -> Committed} | Rejected`:
/// the check phase consults every feature in the resolved dependency
/// order and is free of side effects (vetoing leaves every store
/// untouched); the apply phase runs in the same order and ends with the
/// graph commit, so features always observe the pre-move graph while
/// updating their derived state.
///
/// The engine is strictly sequential: one move is fully resolved before
/// the next is looked at, which is what makes "checked implies safe to
/// apply" sound.
pub struct Simulation {
    graph: MonomerGraph,
    features: Vec<Box<dyn Feature>>,
    order: Vec<usize>,
}

/// Builder registering features before the dispatch order is resolved.
#[derive(Default)]
pub struct SimulationBuilder {
    graph: MonomerGraph,
    features: Vec<Box<dyn Feature>>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an already populated graph (bulk load, external setup).
    pub fn graph(mut self, graph: MonomerGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Registers a feature. Registration order breaks ties the declared
    /// constraints leave open.
    pub fn register<F: Feature>(mut self, feature: F) -> Self {
        self.features.push(Box::new(feature));
        self
    }

    /// Resolves the dispatch order and builds the engine.
    pub fn build(self) -> Result<Simulation, EngineError> {
        let order = resolve_order(&self.features)?;
        let names: Vec<&str> = order.iter().map(|&i| self.features[i].name()).collect();
        info!(order = ?names, "resolved feature dispatch order");
        Ok(Simulation {
            graph: self.graph,
            features: self.features,
            order,
        })
    }
}

impl Simulation {
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    pub fn graph(&self) -> &MonomerGraph {
        &self.graph
    }

    /// Mutable graph access for setup updaters and loaders. Any change
    /// made here bypasses the move pipeline and invalidates feature
    /// state until the next [`synchronize`](Self::synchronize).
    pub fn graph_mut(&mut self) -> &mut MonomerGraph {
        &mut self.graph
    }

    /// The resolved dispatch order, by feature name.
    pub fn feature_order(&self) -> Vec<&'static str> {
        self.order.iter().map(|&i| self.features[i].name()).collect()
    }

    /// Typed read access to a registered feature, for analyzers that
    /// consume a feature's derived state (e.g. the occupancy lattice).
    pub fn feature<F: Feature>(&self) -> Option<&F> {
        self.features
            .iter()
            .find_map(|f| f.as_any().downcast_ref::<F>())
    }

    /// Rebuilds every feature's derived state from the current graph, in
    /// dispatch order. Must be called once after bulk setup and after
    /// any direct graph mutation.
    pub fn synchronize(&mut self) -> Result<(), EngineError> {
        debug!(monomers = self.graph.len(), "synchronizing features");
        for &i in &self.order {
            self.features[i].synchronize(&self.graph)?;
        }
        Ok(())
    }

    /// Check phase: consults every feature in dispatch order. Returns
    /// `Ok(false)` on the first veto; on `Ok(true)` the move's
    /// probability holds the product of every feature's factor.
    pub fn check_move(&self, mv: &mut Move) -> Result<bool, EngineError> {
        for &i in &self.order {
            if !self.features[i].check_move(&self.graph, mv)? {
                trace!(feature = self.features[i].name(), "move vetoed");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Apply phase: updates every feature's derived state in dispatch
    /// order, then commits the move to the graph. Callers must only
    /// invoke this for a move whose check phase returned `true`.
    pub fn apply_move(&mut self, mv: &Move) -> Result<(), EngineError> {
        for &i in &self.order {
            self.features[i].apply_move(&self.graph, mv)?;
        }
        self.commit(mv)
    }

    /// Dispatches one move through the full protocol.
    pub fn try_move<R: Rng>(
        &mut self,
        mv: &mut Move,
        rng: &mut R,
    ) -> Result<MoveOutcome, EngineError> {
        if !self.check_move(mv)? {
            return Ok(MoveOutcome::Vetoed);
        }
        if !accept_from_probability(mv.probability(), rng) {
            return Ok(MoveOutcome::Rejected);
        }
        self.apply_move(mv)?;
        Ok(MoveOutcome::Committed)
    }

    /// The graph mutation itself, last step of the apply phase.
    fn commit(&mut self, mv: &Move) -> Result<(), EngineError> {
        match *mv.kind() {
            MoveKind::Local { index, direction } => {
                self.graph.monomer_mut(index)?.position += direction;
            }
            MoveKind::Insertion {
                position,
                attributes,
            } => {
                self.graph
                    .add_monomer(Monomer::with_attributes(position, attributes));
            }
            MoveKind::Connect {
                index,
                partner,
                payload,
            } => {
                self.graph.connect(index, partner, payload)?;
            }
            MoveKind::Break { index, partner } => {
                self.graph.disconnect(index, partner)?;
            }
            MoveKind::Slide { index, direction } => {
                let target = slide_target(index, direction).ok_or_else(|| {
                    EngineError::Internal(format!("slide target underflow from index {index}"))
                })?;
                let label = self.graph.monomer_mut(index)?.attributes.label.take();
                self.graph.monomer_mut(target)?.attributes.label = label;
            }
        }
        Ok(())
    }
}

/// Target index of a label slide: the chain-consecutive neighbor in the
/// given direction.
#[inline]
pub(crate) fn slide_target(index: usize, direction: i8) -> Option<usize> {
    index.checked_add_signed(direction as isize)
}

/// Turns the accumulated move probability into the global accept/reject
/// decision: accept with probability `min(1, p)`. A pure function of the
/// probability and the draw; features never see the draw.
#[inline]
fn accept_from_probability<R: Rng>(probability: f64, rng: &mut R) -> bool {
    probability >= 1.0 || rng.gen_range(0.0..1.0) < probability
}
