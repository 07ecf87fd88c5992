use crate::core::models::MonomerGraph;
use crate::core::potentials::BendingTable;
use crate::engine::error::EngineError;
use crate::engine::feature::{Feature, FeatureConstraints};
use crate::engine::moves::{Move, MoveKind};
use nalgebra::Vector3;
use std::any::Any;

/// Where a monomer sits on its linear chain, as explicit bond-count
/// distances to the two chain ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainPosition {
    /// Bonds to walk to reach the first chain end.
    pub from_start: u32,
    /// Bonds to walk to reach the last chain end.
    pub from_end: u32,
    /// Whether the monomer lies on a linear chain at all. Branch points
    /// (more than two bonds) and isolated monomers do not.
    pub on_chain: bool,
}

impl ChainPosition {
    /// An interior chain monomer carries an angle of its own.
    pub fn is_interior(&self) -> bool {
        self.on_chain && self.from_start > 0 && self.from_end > 0
    }
}

/// Bending stiffness along linear chains.
///
/// Weights a local move by the product, over every chain angle the
/// moved monomer participates in, of `P(new) / P(old)`, where `P` comes
/// from a probability table keyed by the pair of bond vectors meeting
/// at the angle vertex (both taken pointing outward from the vertex).
/// Untabulated angles contribute the identity factor, so an empty table
/// makes the feature transparent.
///
/// Derived state is the per-monomer [`ChainPosition`] record, rebuilt on
/// synchronize and kept current across bond-structure moves.
pub struct BendingPotential {
    table: BendingTable,
    positions: Vec<ChainPosition>,
    synchronized: bool,
}

impl BendingPotential {
    pub const NAME: &'static str = "bending-potential";

    pub fn new(table: BendingTable) -> Self {
        Self {
            table,
            positions: Vec::new(),
            synchronized: false,
        }
    }

    pub fn table(&self) -> &BendingTable {
        &self.table
    }

    /// The chain record for a monomer, if synchronized.
    pub fn chain_position(&self, index: usize) -> Option<ChainPosition> {
        self.positions.get(index).copied()
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

    /// Probability ratio contributed by the angle at `vertex` when the
    /// monomer `moved` is displaced by `displacement`.
    fn angle_ratio(
        &self,
        graph: &MonomerGraph,
        vertex: usize,
        moved: usize,
        displacement: Vector3<i32>,
    ) -> Result<f64, EngineError> {
        let a = graph.neighbor(vertex, 0)?;
        let b = graph.neighbor(vertex, 1)?;

        let shifted = |index: usize| -> Result<Vector3<i32>, EngineError> {
            let position = graph.monomer(index)?.position;
            Ok(if index == moved {
                position + displacement
            } else {
                position
            })
        };

        let vertex_old = graph.monomer(vertex)?.position;
        let a_old = graph.monomer(a)?.position;
        let b_old = graph.monomer(b)?.position;
        let factor_old = self.table.factor(a_old - vertex_old, b_old - vertex_old);

        let vertex_new = shifted(vertex)?;
        let factor_new = self
            .table
            .factor(shifted(a)? - vertex_new, shifted(b)? - vertex_new);

        if factor_old <= 0.0 {
            return Err(EngineError::Internal(format!(
                "zero-probability angle at monomer {vertex} in the current configuration"
            )));
        }
        Ok(factor_new / factor_old)
    }

    fn rebuild(&mut self, graph: &MonomerGraph, mv: Option<&Move>) {
        self.positions = chain_positions(graph, mv);
    }
}

/// Bonded neighbors of `index` as the graph will look once `mv` commits.
///
/// Feature apply runs against the pre-move graph; bond-structure moves
/// are overlaid here so derived state can be rebuilt post-move.
fn effective_neighbors(graph: &MonomerGraph, mv: Option<&Move>, index: usize) -> Vec<usize> {
    let mut neighbors: Vec<usize> = graph[index].links().to_vec();
    match mv.map(Move::kind) {
        Some(&MoveKind::Connect {
            index: a, partner: b, ..
        }) if a != b => {
            if index == a && !neighbors.contains(&b) {
                neighbors.push(b);
            }
            if index == b && !neighbors.contains(&a) {
                neighbors.push(a);
            }
        }
        Some(&MoveKind::Break {
            index: a,
            partner: b,
        }) => {
            if index == a {
                neighbors.retain(|&n| n != b);
            }
            if index == b {
                neighbors.retain(|&n| n != a);
            }
        }
        _ => {}
    }
    neighbors
}

/// Walks every maximal linear chain (a path through monomers with at
/// most two bonds, starting at a one-bond end) and records each
/// member's distance to both chain ends.
fn chain_positions(graph: &MonomerGraph, mv: Option<&Move>) -> Vec<ChainPosition> {
    let extra = match mv.map(Move::kind) {
        Some(MoveKind::Insertion { .. }) => 1,
        _ => 0,
    };
    let len = graph.len() + extra;
    let mut positions = vec![ChainPosition::default(); len];
    let mut visited = vec![false; len];

    let degree = |i: usize| -> usize {
        if i < graph.len() {
            effective_neighbors(graph, mv, i).len()
        } else {
            0 // a freshly inserted monomer has no bonds yet
        }
    };

    for start in 0..graph.len() {
        if visited[start] || degree(start) != 1 {
            continue;
        }
        // walk from this chain end until the path stops being linear
        let mut sequence = vec![start];
        visited[start] = true;
        let mut previous = start;
        let mut current = effective_neighbors(graph, mv, start)[0];
        while degree(current) == 2 && !visited[current] {
            visited[current] = true;
            sequence.push(current);
            let next = effective_neighbors(graph, mv, current)
                .into_iter()
                .find(|&n| n != previous);
            match next {
                Some(next) => {
                    previous = current;
                    current = next;
                }
                None => break,
            }
        }
        if degree(current) == 1 && !visited[current] {
            visited[current] = true;
            sequence.push(current);
        }

        let length = sequence.len() as u32;
        for (offset, &member) in sequence.iter().enumerate() {
            positions[member] = ChainPosition {
                from_start: offset as u32,
                from_end: length - 1 - offset as u32,
                on_chain: true,
            };
        }
    }
    positions
}

impl Feature for BendingPotential {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn constraints(&self) -> FeatureConstraints {
        FeatureConstraints {
            before: &[],
            after: &[super::bond_vector_set::BondVectorSet::NAME],
        }
    }

    fn check_move(&self, graph: &MonomerGraph, mv: &mut Move) -> Result<bool, EngineError> {
        match *mv.kind() {
            MoveKind::Local { index, direction } => {
                if self.table.is_trivial() {
                    return Ok(true);
                }
                self.require_synchronized()?;

                let mut ratio = 1.0;
                let monomer = graph.monomer(index)?;
                let mut vertices: Vec<usize> = monomer.links().to_vec();
                vertices.push(index);
                for vertex in vertices {
                    let interior = self
                        .positions
                        .get(vertex)
                        .is_some_and(ChainPosition::is_interior);
                    if interior {
                        ratio *= self.angle_ratio(graph, vertex, index, direction)?;
                    }
                }
                mv.scale_probability(ratio);
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    fn apply_move(&mut self, graph: &MonomerGraph, mv: &Move) -> Result<(), EngineError> {
        match mv.kind() {
            MoveKind::Connect { .. } | MoveKind::Break { .. } | MoveKind::Insertion { .. } => {
                self.rebuild(graph, Some(mv));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn synchronize(&mut self, graph: &MonomerGraph) -> Result<(), EngineError> {
        self.rebuild(graph, None);
        self.synchronized = true;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
