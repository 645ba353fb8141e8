use super::types::*;
use std::collections::HashMap;

/// Dense columnar storage of a compiled model.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    // Columnar Arrays
    pub names: Vec<String>,
    pub indicators: Vec<Vec<String>>,

    // Topology (CSR parents + linked-list children)
    pub parents_flat: Vec<ConstructId>,
    pub parents_ranges: Vec<(u32, u32)>, // (start, count)
    pub first_child: Vec<u32>,
    pub child_targets: Vec<ConstructId>,
    pub next_child: Vec<u32>,

    // Lookup
    pub name_index: HashMap<String, ConstructId>,
}

impl ModelRegistry {
    /// Lays out constructs and edges. Edges must reference valid ids.
    ///
    /// Parents keep the declaration order of their paths, which is also the
    /// column order of every regression design built from this registry.
    pub fn build(constructs: &[LatentConstruct], edges: &[PathEdge]) -> Self {
        let count = constructs.len();
        let mut grouped: Vec<Vec<ConstructId>> = vec![Vec::new(); count];
        for edge in edges {
            grouped[edge.target.index()].push(edge.source);
        }

        let mut reg = Self {
            names: Vec::with_capacity(count),
            indicators: Vec::with_capacity(count),
            parents_flat: Vec::with_capacity(edges.len()),
            parents_ranges: Vec::with_capacity(count),
            first_child: vec![u32::MAX; count],
            child_targets: Vec::with_capacity(edges.len()),
            next_child: Vec::with_capacity(edges.len()),
            name_index: HashMap::with_capacity(count),
        };

        // 1. Constructs + parents (CSR append)
        for (construct, parents) in constructs.iter().zip(&grouped) {
            let start = reg.parents_flat.len() as u32;
            reg.parents_flat.extend_from_slice(parents);
            reg.parents_ranges.push((start, parents.len() as u32));
            reg.names.push(construct.name.clone());
            reg.indicators.push(construct.indicators.clone());
        }

        // 2. Children (linked-list prepend). Inserting in reverse makes
        // traversal yield children in declaration order.
        for edge in edges.iter().rev() {
            let p_idx = edge.source.index();
            let head = reg.first_child[p_idx];
            let new_edge = reg.child_targets.len() as u32;
            reg.child_targets.push(edge.target);
            reg.next_child.push(head);
            reg.first_child[p_idx] = new_edge;
        }

        reg.name_index = reg.names.iter().enumerate().map(|(i, n)| (n.clone(), ConstructId::new(i))).collect();
        reg
    }

    pub fn count(&self) -> usize { self.names.len() }

    pub fn id_of(&self, name: &str) -> Option<ConstructId> {
        self.name_index.get(name).copied()
    }

    #[inline(always)]
    pub fn get_parents(&self, id: ConstructId) -> &[ConstructId] {
        let (start, count) = self.parents_ranges[id.index()];
        &self.parents_flat[start as usize..(start + count) as usize]
    }

    pub fn children(&self, id: ConstructId) -> Children<'_> {
        Children { registry: self, edge_idx: self.first_child[id.index()] }
    }
}

/// Walks the child linked list of one construct.
pub struct Children<'a> {
    registry: &'a ModelRegistry,
    edge_idx: u32,
}

impl Iterator for Children<'_> {
    type Item = ConstructId;

    fn next(&mut self) -> Option<ConstructId> {
        if self.edge_idx == u32::MAX {
            return None;
        }
        let idx = self.edge_idx as usize;
        self.edge_idx = self.registry.next_child[idx];
        Some(self.registry.child_targets[idx])
    }
}
