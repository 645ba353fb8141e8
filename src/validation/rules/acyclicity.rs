//! Rule for acyclicity of the structural model.
//!
//! Uses Tarjan's SCC so that each cycle is reported once with all of its
//! member constructs, instead of only the first back edge a DFS happens to hit.

use crate::store::ModelSpec;
use crate::validation::error::{ModelIssue, ModelIssueKind};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

pub(crate) fn validate_acyclic(spec: &ModelSpec) -> Vec<ModelIssue> {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for construct in &spec.constructs {
        let name = construct.name.as_str();
        index.entry(name).or_insert_with(|| graph.add_node(name));
    }

    for (source, target) in &spec.paths {
        // Self-loops and dangling endpoints belong to the structure rule.
        if source == target {
            continue;
        }
        if let (Some(&a), Some(&b)) = (index.get(source.as_str()), index.get(target.as_str())) {
            graph.update_edge(a, b, ());
        }
    }

    tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|mut scc| {
            scc.sort();
            let names: Vec<&str> = scc.iter().map(|&n| graph[n]).collect();
            ModelIssue::new(
                ModelIssueKind::Cycle,
                names.join(" <-> "),
                format!("paths among {} form a directed cycle", names.join(", ")),
            )
        })
        .collect()
}
