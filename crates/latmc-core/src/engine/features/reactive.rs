use crate::core::lattice::PeriodicBox;
use crate::core::models::MonomerGraph;
use crate::engine::error::EngineError;
use crate::engine::feature::Feature;
use crate::engine::moves::{Move, MoveKind};
use std::any::Any;
use std::collections::BTreeSet;

/// Largest squared bond length the bond-fluctuation vector set allows;
/// a connect partner further away than this can never form a valid bond.
const MAX_BOND_LENGTH_SQ: i32 = 10;

/// Construction-time parameters of the reactive-bond feature, passed
/// explicitly instead of living in process-wide constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactiveBondConfig {
    /// Hard cap on the number of bonds any reactive monomer may carry.
    /// The graph itself enforces no cap; this feature does, as a
    /// recoverable veto.
    pub max_connectivity: u32,
}

impl Default for ReactiveBondConfig {
    fn default() -> Self {
        Self {
            max_connectivity: 3,
        }
    }
}

/// Reversible bond formation between reactive monomers.
///
/// Keeps the set of unsaturated reactive monomers (reactive flag set,
/// degree below the cap) incrementally up to date so move generators
/// can draw connect candidates in O(1) per draw. Connect checks enforce
/// the structural contract: both ends reactive, neither at its degree
/// cap, lattice-adjacent, not already bonded. All violations are
/// recoverable vetoes, never errors.
pub struct ReactiveBonds {
    config: ReactiveBondConfig,
    geometry: PeriodicBox,
    open: BTreeSet<usize>,
    synchronized: bool,
}

impl ReactiveBonds {
    pub const NAME: &'static str = "reactive-bonds";

    pub fn new(geometry: PeriodicBox, config: ReactiveBondConfig) -> Self {
        Self {
            config,
            geometry,
            open: BTreeSet::new(),
            synchronized: false,
        }
    }

    pub fn config(&self) -> ReactiveBondConfig {
        self.config
    }

    /// The unsaturated reactive monomers, in index order.
    pub fn open_monomers(&self) -> impl Iterator<Item = usize> + '_ {
        self.open.iter().copied()
    }

    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    fn require_synchronized(&self) -> Result<(), EngineError> {
        if self.synchronized {
            Ok(())
        } else {
            Err(EngineError::NotSynchronized { feature: Self::NAME })
        }
    }

    fn is_open(&self, graph: &MonomerGraph, index: usize) -> Result<bool, EngineError> {
        let monomer = graph.monomer(index)?;
        Ok(monomer.attributes.reactive
            && (monomer.num_links() as u32) < self.config.max_connectivity)
    }
}

impl Feature for ReactiveBonds {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check_move(&self, graph: &MonomerGraph, mv: &mut Move) -> Result<bool, EngineError> {
        match *mv.kind() {
            MoveKind::Connect { index, partner, .. } => {
                self.require_synchronized()?;
                if index == partner {
                    return Ok(false);
                }
                if !self.is_open(graph, index)? || !self.is_open(graph, partner)? {
                    return Ok(false);
                }
                if graph.are_connected(index, partner) {
                    return Ok(false);
                }
                let delta = self.geometry.minimum_image(
                    graph.monomer(partner)?.position - graph.monomer(index)?.position,
                );
                Ok(delta.dot(&delta) <= MAX_BOND_LENGTH_SQ)
            }
            MoveKind::Break { index, partner } => {
                self.require_synchronized()?;
                if !graph.are_connected(index, partner) {
                    return Ok(false);
                }
                // only bonds between reactive monomers are reversible
                Ok(graph.monomer(index)?.attributes.reactive
                    && graph.monomer(partner)?.attributes.reactive)
            }
            _ => Ok(true),
        }
    }

    fn apply_move(&mut self, graph: &MonomerGraph, mv: &Move) -> Result<(), EngineError> {
        match *mv.kind() {
            MoveKind::Connect { index, partner, .. } => {
                // degrees as they will be once the bond commits
                for end in [index, partner] {
                    let links_after = graph.monomer(end)?.num_links() as u32 + 1;
                    if links_after >= self.config.max_connectivity {
                        self.open.remove(&end);
                    }
                }
                Ok(())
            }
            MoveKind::Break { index, partner } => {
                for end in [index, partner] {
                    let monomer = graph.monomer(end)?;
                    let links_after = monomer.num_links().saturating_sub(1) as u32;
                    if monomer.attributes.reactive && links_after < self.config.max_connectivity {
                        self.open.insert(end);
                    }
                }
                Ok(())
            }
            MoveKind::Insertion { attributes, .. } => {
                if attributes.reactive && self.config.max_connectivity > 0 {
                    self.open.insert(graph.len());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn synchronize(&mut self, graph: &MonomerGraph) -> Result<(), EngineError> {
        self.open.clear();
        for (index, monomer) in graph.iter() {
            if monomer.attributes.reactive
                && (monomer.num_links() as u32) < self.config.max_connectivity
            {
                self.open.insert(index);
            }
        }
        self.synchronized = true;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
