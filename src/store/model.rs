//! model.rs
//! The immutable, validated model snapshot an analysis run works on.

use super::registry::{Children, ModelRegistry};
use super::spec::ModelSpec;
use super::types::*;
use crate::analysis::topology;
use crate::error::{AnalysisError, Result};
use crate::validation::ModelValidator;
use std::collections::HashSet;

/// Measurement model + structural DAG, compiled from a [`ModelSpec`].
///
/// A `PathModel` is never mutated. Editing the `ModelSpec` and rebuilding yields a
/// new snapshot, so a run in flight keeps the model it started with.
#[derive(Debug, Clone)]
pub struct PathModel {
    registry: ModelRegistry,
    paths: Vec<PathEdge>,
    order: Vec<ConstructId>,
    positions: Vec<usize>,
    revision: u64,
}

impl PathModel {
    /// Validates the definition and lays it out for estimation.
    ///
    /// Fails with `ModelDefinition` for self-loops, undefined endpoints,
    /// cycles and duplicates, and with `EmptyConstruct` for a construct that
    /// has no indicators.
    pub fn build(spec: &ModelSpec) -> Result<Self> {
        ModelValidator::new(spec)
            .validate()
            .map_err(|issues| AnalysisError::ModelDefinition { issues })?;

        if let Some(empty) = spec.constructs.iter().find(|c| c.indicators.is_empty()) {
            return Err(AnalysisError::EmptyConstruct { construct: empty.name.clone() });
        }

        let id_of = |name: &str| spec.constructs.iter().position(|c| c.name == name).map(ConstructId::new);
        let paths: Vec<PathEdge> = spec
            .paths
            .iter()
            .filter_map(|(s, t)| Some(PathEdge { source: id_of(s.as_str())?, target: id_of(t.as_str())? }))
            .collect();

        let registry = ModelRegistry::build(&spec.constructs, &paths);
        let order = topology::sort(&registry)?;
        let positions = topology::positions(&order);

        Ok(Self { registry, paths, order, positions, revision: spec.revision })
    }

    /// Rebuilds this model without the given indicator columns.
    pub fn without_indicators(&self, dropped: &HashSet<&str>) -> Result<Self> {
        let mut spec = self.to_spec();
        for construct in &mut spec.constructs {
            construct.indicators.retain(|i| !dropped.contains(i.as_str()));
            if construct.indicators.is_empty() {
                return Err(AnalysisError::EmptyConstruct { construct: construct.name.clone() });
            }
        }
        Self::build(&spec)
    }

    /// Recovers an editable definition (at the same revision).
    pub fn to_spec(&self) -> ModelSpec {
        ModelSpec {
            constructs: (0..self.construct_count())
                .map(|i| LatentConstruct {
                    name: self.registry.names[i].clone(),
                    indicators: self.registry.indicators[i].clone(),
                })
                .collect(),
            paths: self.paths.iter().map(|p| (self.name(p.source).to_string(), self.name(p.target).to_string())).collect(),
            revision: self.revision,
        }
    }

    pub fn construct_count(&self) -> usize { self.registry.count() }
    pub fn revision(&self) -> u64 { self.revision }
    pub fn name(&self, id: ConstructId) -> &str { &self.registry.names[id.index()] }
    pub fn id_of(&self, name: &str) -> Option<ConstructId> { self.registry.id_of(name) }
    pub fn indicators(&self, id: ConstructId) -> &[String] { &self.registry.indicators[id.index()] }
    pub fn parents(&self, id: ConstructId) -> &[ConstructId] { self.registry.get_parents(id) }
    pub fn children(&self, id: ConstructId) -> Children<'_> { self.registry.children(id) }

    /// Structural paths in declaration order. A path's position here is its
    /// index in every per-path result vector.
    pub fn paths(&self) -> &[PathEdge] { &self.paths }

    pub fn path_index(&self, source: ConstructId, target: ConstructId) -> Option<usize> {
        self.paths.iter().position(|p| p.source == source && p.target == target)
    }

    /// Constructs in topological order (causes before effects).
    pub fn topological_order(&self) -> &[ConstructId] { &self.order }

    /// Position of a construct within [`Self::topological_order`].
    pub fn topological_position(&self, id: ConstructId) -> usize { self.positions[id.index()] }

    pub fn constructs(&self) -> impl Iterator<Item = ConstructId> + '_ {
        (0..self.construct_count()).map(ConstructId::new)
    }

    /// A construct is endogenous iff at least one path points into it.
    pub fn is_endogenous(&self, id: ConstructId) -> bool { !self.parents(id).is_empty() }

    /// Endogenous constructs in topological order.
    pub fn endogenous(&self) -> impl Iterator<Item = ConstructId> + '_ {
        self.order.iter().copied().filter(move |&id| self.is_endogenous(id))
    }

    pub fn indicator_columns(&self) -> impl Iterator<Item = &str> {
        self.registry.indicators.iter().flatten().map(String::as_str)
    }
}
