use crate::core::lattice::{FOOTPRINT, Lattice, PeriodicBox};
use crate::core::models::MonomerGraph;
use crate::engine::error::EngineError;
use crate::engine::feature::Feature;
use crate::engine::moves::{Move, MoveKind};
use nalgebra::Vector3;
use std::any::Any;
use tracing::debug;

/// The excluded-volume rule: no two monomer footprints may overlap.
///
/// Owns the primary occupancy lattice. A local move only needs the four
/// cells of the face the footprint advances into; an insertion checks
/// the full eight-cell footprint. The occupancy lattice is derived
/// state: it must be built once from the graph
/// ([`synchronize`](Feature::synchronize)) before any check, and a
/// failed bulk fill leaves the feature unusable until a fresh
/// synchronize succeeds.
pub struct ExcludedVolume {
    lattice: Lattice<bool>,
    synchronized: bool,
}

impl ExcludedVolume {
    pub const NAME: &'static str = "excluded-volume";

    pub fn new(geometry: PeriodicBox) -> Self {
        Self {
            lattice: Lattice::new(geometry),
            synchronized: false,
        }
    }

    /// Read-only occupancy lattice access for analyzers.
    pub fn lattice(&self) -> &Lattice<bool> {
        &self.lattice
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
}

/// The four footprint-face offsets perpendicular to a unit step.
///
/// For the advancing face these are the cells newly occupied after the
/// step; for the trailing face, the cells vacated. Returns `None` for a
/// direction that is not a single axis unit step.
fn face_offsets(direction: Vector3<i32>, advancing: bool) -> Option<[Vector3<i32>; 4]> {
    if direction.abs().sum() != 1 {
        return None;
    }
    let axis = if direction.x != 0 {
        0
    } else if direction.y != 0 {
        1
    } else {
        2
    };
    let fixed = match (advancing, direction[axis]) {
        (true, 1) => 2,
        (true, -1) => -1,
        (false, 1) => 0,
        (false, -1) => 1,
        _ => return None,
    };

    let mut offsets = [Vector3::zeros(); 4];
    let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
    for (slot, (a, b)) in [(0, 0), (1, 0), (0, 1), (1, 1)].into_iter().enumerate() {
        let mut offset = Vector3::zeros();
        offset[axis] = fixed;
        offset[u] = a;
        offset[v] = b;
        offsets[slot] = offset;
    }
    Some(offsets)
}

type FacePair = ([Vector3<i32>; 4], [Vector3<i32>; 4]);

fn unit_step_faces(direction: Vector3<i32>) -> Result<FacePair, EngineError> {
    match (face_offsets(direction, true), face_offsets(direction, false)) {
        (Some(advancing), Some(trailing)) => Ok((advancing, trailing)),
        _ => Err(EngineError::Internal(format!(
            "local move direction {direction:?} is not a single axis unit step"
        ))),
    }
}

impl Feature for ExcludedVolume {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check_move(&self, graph: &MonomerGraph, mv: &mut Move) -> Result<bool, EngineError> {
        match *mv.kind() {
            MoveKind::Local { index, direction } => {
                self.require_synchronized()?;
                let position = graph.monomer(index)?.position;
                let (advancing, _) = unit_step_faces(direction)?;
                Ok(advancing
                    .iter()
                    .all(|offset| self.lattice.is_vacant(position + offset)))
            }
            MoveKind::Insertion { position, .. } => {
                self.require_synchronized()?;
                Ok(FOOTPRINT
                    .iter()
                    .all(|&offset| self.lattice.is_vacant(position + Vector3::from(offset))))
            }
            _ => Ok(true),
        }
    }

    fn apply_move(&mut self, graph: &MonomerGraph, mv: &Move) -> Result<(), EngineError> {
        match *mv.kind() {
            MoveKind::Local { index, direction } => {
                self.require_synchronized()?;
                let position = graph.monomer(index)?.position;
                let (advancing, trailing) = unit_step_faces(direction)?;
                for offset in trailing {
                    self.lattice.set(position + offset, false);
                }
                for offset in advancing {
                    self.lattice.set(position + offset, true);
                }
                Ok(())
            }
            MoveKind::Insertion { position, .. } => {
                self.require_synchronized()?;
                for offset in FOOTPRINT {
                    self.lattice.set(position + Vector3::from(offset), true);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn synchronize(&mut self, graph: &MonomerGraph) -> Result<(), EngineError> {
        self.synchronized = false;
        self.lattice.clear();
        for (index, monomer) in graph.iter() {
            for offset in FOOTPRINT {
                let cell = monomer.position + Vector3::from(offset);
                if !self.lattice.is_vacant(cell) {
                    let folded = self.lattice.periodic_box().fold(cell);
                    debug!(index, ?folded, "occupancy collision during bulk fill");
                    return Err(EngineError::MultipleOccupation {
                        x: folded.x,
                        y: folded.y,
                        z: folded.z,
                    });
                }
                self.lattice.set(cell, true);
            }
        }
        self.synchronized = true;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Attributes, Monomer};

    fn geometry() -> PeriodicBox {
        PeriodicBox::new(16, 16, 16).unwrap()
    }

    fn synchronized_feature(graph: &MonomerGraph) -> ExcludedVolume {
        let mut feature = ExcludedVolume::new(geometry());
        feature.synchronize(graph).unwrap();
        feature
    }

    fn graph_with_positions(positions: &[[i32; 3]]) -> MonomerGraph {
        let mut graph = MonomerGraph::new();
        for &p in positions {
            graph.add_monomer(Monomer::new(Vector3::from(p)));
        }
        graph
    }

    #[test]
    fn check_before_synchronize_is_a_setup_error() {
        let graph = graph_with_positions(&[[0, 0, 0]]);
        let feature = ExcludedVolume::new(geometry());
        let mut mv = Move::local(0, Vector3::new(1, 0, 0));

        let result = feature.check_move(&graph, &mut mv);
        assert!(matches!(
            result,
            Err(EngineError::NotSynchronized {
                feature: ExcludedVolume::NAME
            })
        ));
    }

    #[test]
    fn step_into_free_space_passes_and_apply_shifts_the_footprint() {
        let graph = graph_with_positions(&[[0, 0, 0]]);
        let mut feature = synchronized_feature(&graph);

        let mut mv = Move::local(0, Vector3::new(1, 0, 0));
        assert!(feature.check_move(&graph, &mut mv).unwrap());
        assert_eq!(mv.probability(), 1.0);

        feature.apply_move(&graph, &mv).unwrap();
        // vacated trailing face
        assert!(feature.lattice().is_vacant(Vector3::new(0, 0, 0)));
        assert!(feature.lattice().is_vacant(Vector3::new(0, 1, 1)));
        // newly occupied advancing face
        assert!(!feature.lattice().is_vacant(Vector3::new(2, 0, 0)));
        assert!(!feature.lattice().is_vacant(Vector3::new(2, 1, 1)));
        // unchanged shared cells
        assert!(!feature.lattice().is_vacant(Vector3::new(1, 0, 0)));
    }

    #[test]
    fn step_into_an_occupied_face_is_vetoed() {
        // second monomer sits flush against the first along +x
        let graph = graph_with_positions(&[[0, 0, 0], [2, 0, 0]]);
        let feature = synchronized_feature(&graph);

        let mut blocked = Move::local(0, Vector3::new(1, 0, 0));
        assert!(!feature.check_move(&graph, &mut blocked).unwrap());

        let mut free = Move::local(0, Vector3::new(-1, 0, 0));
        assert!(feature.check_move(&graph, &mut free).unwrap());
    }

    #[test]
    fn periodic_wrap_blocks_across_the_boundary() {
        let graph = graph_with_positions(&[[14, 0, 0], [0, 0, 0]]);
        let feature = synchronized_feature(&graph);

        // advancing face of monomer 0 at x=16 folds onto x=0, occupied
        let mut mv = Move::local(0, Vector3::new(1, 0, 0));
        assert!(!feature.check_move(&graph, &mut mv).unwrap());
    }

    #[test]
    fn overlapping_insertion_is_rejected_and_lattice_unchanged() {
        let graph = graph_with_positions(&[[4, 4, 4]]);
        let feature = synchronized_feature(&graph);

        // overlaps the existing footprint in one corner cell
        let mut mv = Move::insertion(Vector3::new(5, 5, 5), Attributes::default());
        assert!(!feature.check_move(&graph, &mut mv).unwrap());
        assert!(feature.lattice().is_vacant(Vector3::new(6, 6, 6)));

        let mut clear = Move::insertion(Vector3::new(8, 4, 4), Attributes::default());
        assert!(feature.check_move(&graph, &mut clear).unwrap());
    }

    #[test]
    fn bulk_fill_with_overlapping_monomers_reports_multiple_occupation() {
        let graph = graph_with_positions(&[[3, 3, 3], [4, 3, 3]]);
        let mut feature = ExcludedVolume::new(geometry());

        let result = feature.synchronize(&graph);
        assert!(matches!(
            result,
            Err(EngineError::MultipleOccupation { x: 4, y: 3, z: 3 })
        ));
        assert!(!feature.is_synchronized());
    }

    #[test]
    fn failed_fill_recovers_after_a_clean_synchronize() {
        let mut graph = graph_with_positions(&[[3, 3, 3], [4, 3, 3]]);
        let mut feature = ExcludedVolume::new(geometry());
        assert!(feature.synchronize(&graph).is_err());

        graph[1].position = Vector3::new(8, 3, 3);
        feature.synchronize(&graph).unwrap();
        assert!(feature.is_synchronized());
    }

    #[test]
    fn malformed_direction_is_fatal_not_a_veto() {
        let graph = graph_with_positions(&[[0, 0, 0]]);
        let feature = synchronized_feature(&graph);

        let mut diagonal = Move::local(0, Vector3::new(1, 1, 0));
        assert!(matches!(
            feature.check_move(&graph, &mut diagonal),
            Err(EngineError::Internal(_))
        ));
    }

    #[test]
    fn bond_moves_are_outside_this_features_concern() {
        let graph = graph_with_positions(&[[0, 0, 0], [4, 0, 0]]);
        let feature = ExcludedVolume::new(geometry());

        // identity even before synchronize: the feature has no opinion
        let mut mv = Move::connect(0, 1);
        assert!(feature.check_move(&graph, &mut mv).unwrap());
        assert_eq!(mv.probability(), 1.0);
    }
}
