use crate::core::models::MonomerGraph;
use crate::engine::error::EngineError;
use crate::engine::feature::Feature;
use crate::engine::moves::{Move, MoveKind};
use crate::engine::simulation::slide_target;
use std::any::Any;
use std::collections::HashMap;

/// Bookkeeping for sliding labels.
///
/// A label is a unique id carried by at most one monomer at a time; a
/// slide move hands it to the chain-consecutive neighbor. This feature
/// keeps the reverse map (label id to carrier index) incrementally up
/// to date and enforces the slide contract: the source carries a label,
/// the destination exists, is bonded to the source, and is free.
pub struct LabelBookkeeping {
    locations: HashMap<u32, usize>,
    synchronized: bool,
}

impl LabelBookkeeping {
    pub const NAME: &'static str = "label-bookkeeping";

    pub fn new() -> Self {
        Self {
            locations: HashMap::new(),
            synchronized: false,
        }
    }

    /// The monomer currently carrying a label.
    pub fn location_of(&self, label: u32) -> Option<usize> {
        self.locations.get(&label).copied()
    }

    /// All `(label, carrier)` pairs.
    pub fn labeled_monomers(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.locations.iter().map(|(&label, &index)| (label, index))
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

impl Default for LabelBookkeeping {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for LabelBookkeeping {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check_move(&self, graph: &MonomerGraph, mv: &mut Move) -> Result<bool, EngineError> {
        match *mv.kind() {
            MoveKind::Slide { index, direction } => {
                self.require_synchronized()?;
                if graph.monomer(index)?.attributes.label.is_none() {
                    return Ok(false);
                }
                let Some(target) = slide_target(index, direction) else {
                    return Ok(false);
                };
                let Ok(destination) = graph.monomer(target) else {
                    return Ok(false);
                };
                Ok(graph.are_connected(index, target) && destination.attributes.label.is_none())
            }
            MoveKind::Insertion { attributes, .. } => match attributes.label {
                Some(label) => {
                    self.require_synchronized()?;
                    Ok(!self.locations.contains_key(&label))
                }
                None => Ok(true),
            },
            _ => Ok(true),
        }
    }

    fn apply_move(&mut self, graph: &MonomerGraph, mv: &Move) -> Result<(), EngineError> {
        match *mv.kind() {
            MoveKind::Slide { index, direction } => {
                let label = graph.monomer(index)?.attributes.label.ok_or_else(|| {
                    EngineError::Internal(format!("slide applied to unlabeled monomer {index}"))
                })?;
                let target = slide_target(index, direction).ok_or_else(|| {
                    EngineError::Internal(format!("slide target underflow from index {index}"))
                })?;
                self.locations.insert(label, target);
                Ok(())
            }
            MoveKind::Insertion { attributes, .. } => {
                if let Some(label) = attributes.label {
                    self.locations.insert(label, graph.len());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn synchronize(&mut self, graph: &MonomerGraph) -> Result<(), EngineError> {
        self.synchronized = false;
        self.locations.clear();
        for (index, monomer) in graph.iter() {
            if let Some(label) = monomer.attributes.label {
                if self.locations.insert(label, index).is_some() {
                    return Err(EngineError::DuplicateLabel { label });
                }
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
    use nalgebra::Vector3;

    fn labeled_monomer(position: [i32; 3], label: Option<u32>) -> Monomer {
        Monomer::with_attributes(
            Vector3::from(position),
            Attributes {
                label,
                ..Attributes::default()
            },
        )
    }

    /// A bonded dimer with a label on the first monomer.
    fn labeled_dimer() -> MonomerGraph {
        let mut graph = MonomerGraph::new();
        graph.add_monomer(labeled_monomer([0, 0, 0], Some(4)));
        graph.add_monomer(labeled_monomer([2, 0, 0], None));
        graph.connect(0, 1, 0).unwrap();
        graph
    }

    fn synchronized_feature(graph: &MonomerGraph) -> LabelBookkeeping {
        let mut feature = LabelBookkeeping::new();
        feature.synchronize(graph).unwrap();
        feature
    }

    #[test]
    fn slide_to_a_free_bonded_neighbor_passes_and_updates_the_map() {
        let graph = labeled_dimer();
        let mut feature = synchronized_feature(&graph);
        assert_eq!(feature.location_of(4), Some(0));

        let mut mv = Move::slide(0, 1);
        assert!(feature.check_move(&graph, &mut mv).unwrap());
        feature.apply_move(&graph, &mv).unwrap();
        assert_eq!(feature.location_of(4), Some(1));
    }

    #[test]
    fn slide_without_a_label_or_bond_is_vetoed() {
        let mut graph = labeled_dimer();
        graph.add_monomer(labeled_monomer([4, 0, 0], None));
        let feature = synchronized_feature(&graph);

        // monomer 1 carries no label
        let mut unlabeled = Move::slide(1, 1);
        assert!(!feature.check_move(&graph, &mut unlabeled).unwrap());

        // monomer 0 is not bonded to a predecessor
        let mut off_chain = Move::slide(0, -1);
        assert!(!feature.check_move(&graph, &mut off_chain).unwrap());
    }

    #[test]
    fn slide_onto_an_occupied_neighbor_is_vetoed() {
        let mut graph = MonomerGraph::new();
        graph.add_monomer(labeled_monomer([0, 0, 0], Some(1)));
        graph.add_monomer(labeled_monomer([2, 0, 0], Some(2)));
        graph.connect(0, 1, 0).unwrap();
        let feature = synchronized_feature(&graph);

        let mut mv = Move::slide(0, 1);
        assert!(!feature.check_move(&graph, &mut mv).unwrap());
    }

    #[test]
    fn slide_past_the_end_of_the_graph_is_vetoed() {
        let mut graph = MonomerGraph::new();
        graph.add_monomer(labeled_monomer([0, 0, 0], None));
        graph.add_monomer(labeled_monomer([2, 0, 0], Some(4)));
        graph.connect(0, 1, 0).unwrap();
        let feature = synchronized_feature(&graph);

        let mut mv = Move::slide(1, 1);
        assert!(!feature.check_move(&graph, &mut mv).unwrap());
    }

    #[test]
    fn inserting_a_duplicate_label_is_vetoed() {
        let graph = labeled_dimer();
        let feature = synchronized_feature(&graph);

        let mut duplicate = Move::insertion(
            Vector3::new(8, 0, 0),
            Attributes {
                label: Some(4),
                ..Attributes::default()
            },
        );
        assert!(!feature.check_move(&graph, &mut duplicate).unwrap());

        let mut fresh = Move::insertion(
            Vector3::new(8, 0, 0),
            Attributes {
                label: Some(5),
                ..Attributes::default()
            },
        );
        assert!(feature.check_move(&graph, &mut fresh).unwrap());
    }

    #[test]
    fn synchronize_rejects_duplicate_labels() {
        let mut graph = MonomerGraph::new();
        graph.add_monomer(labeled_monomer([0, 0, 0], Some(9)));
        graph.add_monomer(labeled_monomer([4, 0, 0], Some(9)));
        let mut feature = LabelBookkeeping::new();

        assert!(matches!(
            feature.synchronize(&graph),
            Err(EngineError::DuplicateLabel { label: 9 })
        ));
        assert!(!feature.is_synchronized());
    }
}
