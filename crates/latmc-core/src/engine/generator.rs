use super::moves::Move;
use crate::core::models::MonomerGraph;
use nalgebra::Vector3;
use rand::Rng;
use rand::seq::SliceRandom;

/// The six single-step translation directions of the simple-cubic
/// lattice.
pub const UNIT_STEPS: [[i32; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Draws a uniformly random local move: a uniform monomer index and one
/// of the six axis unit steps. Returns `None` for an empty graph.
pub fn propose_local<R: Rng>(graph: &MonomerGraph, rng: &mut R) -> Option<Move> {
    if graph.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..graph.len());
    let step = UNIT_STEPS[rng.gen_range(0..UNIT_STEPS.len())];
    Some(Move::local(index, Vector3::from(step)))
}

/// Draws a random connect proposal from a candidate list of unsaturated
/// reactive monomers (as maintained by the reactive-bond feature).
///
/// Picks one candidate uniformly and pairs it with another uniform
/// candidate. The structural validity of the pair (adjacency, degree,
/// reactivity) is entirely the feature chain's concern; this only
/// produces proposals.
pub fn propose_connect<R: Rng>(candidates: &[usize], rng: &mut R) -> Option<Move> {
    if candidates.len() < 2 {
        return None;
    }
    let picked: Vec<usize> = candidates.choose_multiple(rng, 2).copied().collect();
    Some(Move::connect(picked[0], picked[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Monomer;
    use crate::engine::moves::MoveKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn local_proposals_cover_valid_indices_and_unit_steps() {
        let mut graph = MonomerGraph::new();
        for i in 0..4 {
            graph.add_monomer(Monomer::new(Vector3::new(i * 2, 0, 0)));
        }
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let mv = propose_local(&graph, &mut rng).unwrap();
            match mv.kind() {
                MoveKind::Local { index, direction } => {
                    assert!(*index < graph.len());
                    assert_eq!(direction.abs().sum(), 1);
                }
                other => panic!("unexpected kind {other:?}"),
            }
        }
    }

    #[test]
    fn empty_graph_yields_no_local_proposal() {
        let graph = MonomerGraph::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(propose_local(&graph, &mut rng).is_none());
    }

    #[test]
    fn connect_proposals_pick_two_distinct_candidates() {
        let candidates = vec![3, 5, 9];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let mv = propose_connect(&candidates, &mut rng).unwrap();
            match mv.kind() {
                MoveKind::Connect { index, partner, .. } => {
                    assert_ne!(index, partner);
                    assert!(candidates.contains(index));
                    assert!(candidates.contains(partner));
                }
                other => panic!("unexpected kind {other:?}"),
            }
        }
        assert!(propose_connect(&[1], &mut rng).is_none());
    }
}
