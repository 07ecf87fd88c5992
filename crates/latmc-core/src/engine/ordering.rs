use super::error::EngineError;
use super::feature::Feature;
use std::collections::HashMap;

/// Resolves the declared before/after constraints of a feature set into
/// one fixed dispatch order.
///
/// The sort is stable with respect to registration order: among
/// features whose constraints do not force an order, the one registered
/// first runs first. Constraints naming unregistered features are
/// ignored. Returns the feature indices in dispatch order, or a
/// [`EngineError::DependencyCycle`] naming the features involved.
pub(crate) fn resolve_order(features: &[Box<dyn Feature>]) -> Result<Vec<usize>, EngineError> {
    let position: HashMap<&'static str, usize> = features
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name(), i))
        .collect();

    // edges[i] holds the features that must run after i
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); features.len()];
    let mut indegree: Vec<usize> = vec![0; features.len()];

    for (i, feature) in features.iter().enumerate() {
        let constraints = feature.constraints();
        for name in constraints.before {
            if let Some(&j) = position.get(name) {
                edges[i].push(j);
                indegree[j] += 1;
            }
        }
        for name in constraints.after {
            if let Some(&j) = position.get(name) {
                edges[j].push(i);
                indegree[i] += 1;
            }
        }
    }

    let mut order = Vec::with_capacity(features.len());
    let mut placed = vec![false; features.len()];
    while order.len() < features.len() {
        // lowest registration index among the ready features
        let next = (0..features.len()).find(|&i| !placed[i] && indegree[i] == 0);
        let Some(next) = next else {
            let cycle: Vec<&'static str> = (0..features.len())
                .filter(|&i| !placed[i])
                .map(|i| features[i].name())
                .collect();
            return Err(EngineError::DependencyCycle { features: cycle });
        };
        placed[next] = true;
        order.push(next);
        for &succ in &edges[next] {
            indegree[succ] -= 1;
        }
    }
    Ok(order)
}
