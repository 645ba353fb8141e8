use crate::error::{AnalysisError, Result};
use crate::store::{ConstructId, ModelRegistry};
use crate::validation::{ModelIssue, ModelIssueKind};

/// Performs a Topological Sort using Depth-First Search (DFS).
///
/// Returns construct ids where every cause appears before its effects.
/// Constructs are visited in declaration order, so the result is stable for
/// a given model.
pub fn sort(registry: &ModelRegistry) -> Result<Vec<ConstructId>> {
    let count = registry.count();
    let mut order = Vec::with_capacity(count);
    let mut state = vec![VisitState::None; count];

    // Edges are stored Target -> Parents, so post-order on parents yields
    // [cause, ..., effect].
    for i in 0..count {
        if state[i] == VisitState::None {
            visit(ConstructId::new(i), registry, &mut state, &mut order)?;
        }
    }

    Ok(order)
}

#[derive(Clone, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting, // Used for cycle detection
    Visited,
}

fn visit(
    node: ConstructId,
    registry: &ModelRegistry,
    state: &mut Vec<VisitState>,
    order: &mut Vec<ConstructId>,
) -> Result<()> {
    let idx = node.index();

    match state[idx] {
        VisitState::Visited => return Ok(()),
        VisitState::Visiting => {
            let name = registry.names[idx].clone();
            return Err(AnalysisError::model(ModelIssue::new(
                ModelIssueKind::Cycle,
                name,
                "construct lies on a directed cycle",
            )));
        }
        VisitState::None => state[idx] = VisitState::Visiting,
    }

    for &parent in registry.get_parents(node) {
        visit(parent, registry, state, order)?;
    }

    state[idx] = VisitState::Visited;
    order.push(node);
    Ok(())
}

/// Position of every construct inside `order`, indexed by construct id.
pub fn positions(order: &[ConstructId]) -> Vec<usize> {
    let mut pos = vec![usize::MAX; order.len()];
    for (i, id) in order.iter().enumerate() {
        pos[id.index()] = i;
    }
    pos
}
