use crate::core::lattice::PeriodicBox;
use crate::core::models::MonomerGraph;
use crate::core::potentials::bond_vectors::{INDEX_SPAN, bond_vector_index, classic_bfm_vectors};
use crate::engine::error::EngineError;
use crate::engine::feature::{Feature, FeatureConstraints};
use crate::engine::moves::{Move, MoveKind};
use nalgebra::Vector3;
use std::any::Any;

/// The allowed bond-vector set of the bond-fluctuation model.
///
/// Vetoes any local move that would stretch an incident bond outside
/// the set, and any connect move whose new bond vector is not in the
/// set. Bond vectors are measured as minimum-image separations, so
/// bonds remain valid across the periodic boundary.
///
/// The feature is stateless: it holds only the configured set, so
/// synchronize has nothing to rebuild.
pub struct BondVectorSet {
    geometry: PeriodicBox,
    allowed: Vec<bool>,
}

impl BondVectorSet {
    pub const NAME: &'static str = "bond-vector-set";

    /// The classic 108-vector set.
    pub fn new(geometry: PeriodicBox) -> Self {
        Self::with_vectors(geometry, classic_bfm_vectors())
    }

    /// A custom vector set. Vectors outside the encodable domain are
    /// ignored; the set should contain the negation of every member,
    /// since a bond is unordered.
    pub fn with_vectors<I>(geometry: PeriodicBox, vectors: I) -> Self
    where
        I: IntoIterator<Item = Vector3<i32>>,
    {
        let mut allowed = vec![false; INDEX_SPAN];
        for vector in vectors {
            if let Some(index) = bond_vector_index(vector) {
                allowed[index as usize] = true;
            }
        }
        Self { geometry, allowed }
    }

    /// Whether a separation vector is an allowed bond vector.
    pub fn contains(&self, vector: Vector3<i32>) -> bool {
        bond_vector_index(vector)
            .map(|index| self.allowed[index as usize])
            .unwrap_or(false)
    }

    fn bond_vector(&self, from: Vector3<i32>, to: Vector3<i32>) -> Vector3<i32> {
        self.geometry.minimum_image(to - from)
    }
}

impl Feature for BondVectorSet {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn constraints(&self) -> FeatureConstraints {
        FeatureConstraints {
            before: &[
                super::interaction::NearestNeighborInteraction::NAME,
                super::bending::BendingPotential::NAME,
            ],
            after: &[],
        }
    }

    fn check_move(&self, graph: &MonomerGraph, mv: &mut Move) -> Result<bool, EngineError> {
        match *mv.kind() {
            MoveKind::Local { index, direction } => {
                let monomer = graph.monomer(index)?;
                let new_position = monomer.position + direction;
                for &neighbor in monomer.links() {
                    let stretched =
                        self.bond_vector(new_position, graph.monomer(neighbor)?.position);
                    if !self.contains(stretched) {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            MoveKind::Connect { index, partner, .. } => {
                if index == partner {
                    return Ok(true); // the graph treats self-bonds as a no-op
                }
                let from = graph.monomer(index)?.position;
                let to = graph.monomer(partner)?.position;
                Ok(self.contains(self.bond_vector(from, to)))
            }
            _ => Ok(true),
        }
    }

    fn apply_move(&mut self, _graph: &MonomerGraph, _mv: &Move) -> Result<(), EngineError> {
        Ok(())
    }

    fn synchronize(&mut self, _graph: &MonomerGraph) -> Result<(), EngineError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
