//! Direct, indirect and total effects between every connected construct pair.
//!
//! Routes are enumerated once per model into an [`EffectPlan`]; evaluating the
//! plan against a coefficient vector is then a flat loop of products, which is
//! what the bootstrap does for every resample.

use crate::inference::Significance;
use crate::store::{ConstructId, PathModel};
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// One directed route of length ≥ 2, stored as structural path indices.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub edges: SmallVec<[usize; 4]>,
    pub constructs: SmallVec<[ConstructId; 5]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairPlan {
    pub source: ConstructId,
    pub target: ConstructId,
    /// Path index of the direct edge, if the pair has one.
    pub direct: Option<usize>,
    pub routes: Vec<RoutePlan>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectPlan {
    pairs: Vec<PairPlan>,
}

impl EffectPlan {
    /// Enumerates every directed simple path of the model by DFS from each
    /// construct. Pairs are ordered by the topological positions of
    /// (source, target).
    pub fn new(model: &PathModel) -> Self {
        let mut pairs = Vec::new();
        for &source in model.topological_order() {
            let mut found: BTreeMap<usize, PairPlan> = BTreeMap::new();
            let mut edges: SmallVec<[usize; 4]> = SmallVec::new();
            let mut nodes: SmallVec<[ConstructId; 5]> = SmallVec::from_elem(source, 1);
            walk(model, source, &mut edges, &mut nodes, &mut found);
            pairs.extend(found.into_values());
        }
        Self { pairs }
    }

    pub fn pairs(&self) -> &[PairPlan] { &self.pairs }
    pub fn len(&self) -> usize { self.pairs.len() }
    pub fn is_empty(&self) -> bool { self.pairs.is_empty() }

    pub fn pair_index(&self, source: ConstructId, target: ConstructId) -> Option<usize> {
        self.pairs.iter().position(|p| p.source == source && p.target == target)
    }

    /// Writes each pair's indirect and total effect for the given per-path
    /// coefficients.
    pub fn evaluate_into(&self, coefficients: &[f64], indirect: &mut [f64], total: &mut [f64]) {
        for (i, pair) in self.pairs.iter().enumerate() {
            let ind: f64 = pair.routes.iter().map(|r| route_product(&r.edges, coefficients)).sum();
            indirect[i] = ind;
            total[i] = pair.direct.map_or(0.0, |d| coefficients[d]) + ind;
        }
    }

    /// Full effect records, with route detail, for one coefficient vector.
    pub fn evaluate(&self, model: &PathModel, coefficients: &[f64]) -> Vec<EffectRecord> {
        self.pairs
            .iter()
            .map(|pair| {
                let routes: Vec<RouteEffect> = pair
                    .routes
                    .iter()
                    .map(|r| RouteEffect {
                        constructs: r.constructs.iter().map(|&c| model.name(c).to_string()).collect(),
                        paths: r.edges.to_vec(),
                        product: route_product(&r.edges, coefficients),
                    })
                    .collect();
                let direct = pair.direct.map(|d| coefficients[d]);
                let indirect: f64 = routes.iter().map(|r| r.product).sum();
                EffectRecord {
                    source: model.name(pair.source).to_string(),
                    target: model.name(pair.target).to_string(),
                    direct_path: pair.direct,
                    direct,
                    indirect,
                    total: direct.unwrap_or(0.0) + indirect,
                    routes,
                    indirect_significance: None,
                    total_significance: None,
                }
            })
            .collect()
    }
}

fn walk(
    model: &PathModel,
    node: ConstructId,
    edges: &mut SmallVec<[usize; 4]>,
    nodes: &mut SmallVec<[ConstructId; 5]>,
    found: &mut BTreeMap<usize, PairPlan>,
) {
    let source = nodes[0];
    for child in model.children(node) {
        let Some(edge) = model.path_index(node, child) else { continue };
        edges.push(edge);
        nodes.push(child);

        let entry = found.entry(model.topological_position(child)).or_insert_with(|| PairPlan {
            source,
            target: child,
            direct: None,
            routes: Vec::new(),
        });
        if edges.len() == 1 {
            entry.direct = Some(edge);
        } else {
            entry.routes.push(RoutePlan { edges: edges.clone(), constructs: nodes.clone() });
        }
        walk(model, child, edges, nodes, found);

        nodes.pop();
        edges.pop();
    }
}

#[inline]
fn route_product(edges: &[usize], coefficients: &[f64]) -> f64 {
    edges.iter().map(|&e| coefficients[e]).product()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEffect {
    /// Constructs along the route, source first.
    pub constructs: Vec<String>,
    /// Structural path indices along the route.
    pub paths: Vec<usize>,
    pub product: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectRecord {
    pub source: String,
    pub target: String,
    pub direct_path: Option<usize>,
    /// `None` when the pair has no direct edge.
    pub direct: Option<f64>,
    pub indirect: f64,
    pub total: f64,
    pub routes: Vec<RouteEffect>,
    pub indirect_significance: Option<Significance>,
    pub total_significance: Option<Significance>,
}

impl EffectRecord {
    pub fn has_indirect(&self) -> bool { !self.routes.is_empty() }
}

/// Effect records for the model's fitted path coefficients.
pub fn decompose(model: &PathModel, coefficients: &[f64]) -> Vec<EffectRecord> {
    EffectPlan::new(model).evaluate(model, coefficients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ModelSpec;

    fn diamond() -> PathModel {
        let spec = ModelSpec::new()
            .with_construct("D", ["d1"])
            .with_construct("A", ["a1"])
            .with_construct("B", ["b1"])
            .with_construct("C", ["c1"])
            .with_path("A", "B")
            .with_path("A", "C")
            .with_path("B", "D")
            .with_path("C", "D");
        PathModel::build(&spec).unwrap()
    }

    fn record<'a>(records: &'a [EffectRecord], s: &str, t: &str) -> &'a EffectRecord {
        records.iter().find(|r| r.source == s && r.target == t).expect("pair present")
    }

    #[test]
    fn test_diamond_routes_are_summed() {
        let model = diamond();
        let coefs = [0.5, 0.4, 0.3, 0.2];
        let records = decompose(&model, &coefs);
        let ad = record(&records, "A", "D");
        assert_eq!(ad.direct, None);
        assert_eq!(ad.routes.len(), 2);
        assert!((ad.indirect - (0.5 * 0.3 + 0.4 * 0.2)).abs() < 1e-15);
        assert_eq!(ad.total, ad.indirect);
        assert_eq!(ad.routes[0].constructs, vec!["A", "B", "D"]);
    }

    #[test]
    fn test_pairs_without_connection_are_absent() {
        let model = diamond();
        let records = decompose(&model, &[1.0; 4]);
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| !(r.source == "B" && r.target == "C")));
    }

    #[test]
    fn test_pairs_follow_topological_positions() {
        let model = diamond();
        let plan = EffectPlan::new(&model);
        let keys: Vec<(usize, usize)> = plan
            .pairs()
            .iter()
            .map(|p| (model.topological_position(p.source), model.topological_position(p.target)))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_evaluate_into_matches_records() {
        let model = diamond();
        let plan = EffectPlan::new(&model);
        let coefs = [0.9, -0.2, 0.6, 0.7];
        let mut indirect = vec![0.0; plan.len()];
        let mut total = vec![0.0; plan.len()];
        plan.evaluate_into(&coefs, &mut indirect, &mut total);
        for (i, rec) in plan.evaluate(&model, &coefs).iter().enumerate() {
            assert_eq!(rec.indirect, indirect[i]);
            assert_eq!(rec.total, total[i]);
        }
    }
}
