//! Mediation verdicts for construct pairs with both a direct edge and at
//! least one indirect route.

use super::decomposer::EffectRecord;
use crate::config::MediationTest;
use crate::inference::PathSignificance;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediationType {
    None,
    Partial,
    Full,
}

impl std::fmt::Display for MediationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MediationType::None => "No mediation",
            MediationType::Partial => "Partial mediation",
            MediationType::Full => "Full mediation",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediationVerdict {
    pub source: String,
    pub target: String,
    pub verdict: MediationType,
    pub direct_p_value: f64,
    /// Routes whose legs are all significant, as construct names.
    pub significant_routes: Vec<Vec<String>>,
    pub test: MediationTest,
}

pub struct MediationClassifier {
    alpha: f64,
    test: MediationTest,
}

impl MediationClassifier {
    pub fn new(alpha: f64, test: MediationTest) -> Self {
        Self { alpha, test }
    }

    /// `paths` holds the bootstrap significance of every structural path,
    /// indexed by path position.
    pub fn classify(&self, effects: &[EffectRecord], paths: &[PathSignificance]) -> Vec<MediationVerdict> {
        effects
            .iter()
            .filter_map(|record| {
                let direct = record.direct_path?;
                if !record.has_indirect() {
                    return None;
                }
                Some(self.classify_pair(record, paths[direct].stats.p_value, paths))
            })
            .collect()
    }

    fn classify_pair(&self, record: &EffectRecord, direct_p: f64, paths: &[PathSignificance]) -> MediationVerdict {
        let significant = |p: f64| p <= self.alpha;
        let significant_routes: Vec<Vec<String>> = record
            .routes
            .iter()
            .filter(|route| route.paths.iter().all(|&e| significant(paths[e].stats.p_value)))
            .map(|route| route.constructs.clone())
            .collect();

        let mediated = match self.test {
            MediationTest::LegWise => !significant_routes.is_empty(),
            MediationTest::ProductBootstrap => {
                record.indirect_significance.as_ref().is_some_and(|s| significant(s.p_value))
            }
        };

        let verdict = match (mediated, significant(direct_p)) {
            (false, _) => MediationType::None,
            (true, false) => MediationType::Full,
            (true, true) => MediationType::Partial,
        };

        MediationVerdict {
            source: record.source.clone(),
            target: record.target.clone(),
            verdict,
            direct_p_value: direct_p,
            significant_routes,
            test: self.test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::decomposer::RouteEffect;
    use crate::inference::Significance;
    use rstest::rstest;

    fn sig(p: f64) -> Significance {
        Significance { original: 0.5, mean: 0.5, std_dev: 0.1, t_value: 5.0, p_value: p, df: 50, resamples: 100 }
    }

    fn paths(p_ab: f64, p_bc: f64, p_ac: f64) -> Vec<PathSignificance> {
        [("A", "B", p_ab), ("B", "C", p_bc), ("A", "C", p_ac)]
            .iter()
            .enumerate()
            .map(|(i, (s, t, p))| PathSignificance { source: s.to_string(), target: t.to_string(), path: i, stats: sig(*p) })
            .collect()
    }

    fn triangle(indirect_p: Option<f64>) -> EffectRecord {
        EffectRecord {
            source: "A".into(),
            target: "C".into(),
            direct_path: Some(2),
            direct: Some(0.1),
            indirect: 0.25,
            total: 0.35,
            routes: vec![RouteEffect { constructs: vec!["A".into(), "B".into(), "C".into()], paths: vec![0, 1], product: 0.25 }],
            indirect_significance: indirect_p.map(sig),
            total_significance: None,
        }
    }

    #[rstest]
    #[case(0.01, 0.01, 0.40, MediationType::Full)]
    #[case(0.01, 0.01, 0.01, MediationType::Partial)]
    #[case(0.01, 0.20, 0.01, MediationType::None)]
    #[case(0.30, 0.01, 0.40, MediationType::None)]
    #[case(0.05, 0.05, 0.06, MediationType::Full)]
    fn test_leg_wise_rule(#[case] p_ab: f64, #[case] p_bc: f64, #[case] p_ac: f64, #[case] expected: MediationType) {
        let classifier = MediationClassifier::new(0.05, MediationTest::LegWise);
        let verdicts = classifier.classify(&[triangle(None)], &paths(p_ab, p_bc, p_ac));
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].verdict, expected);
    }

    #[test]
    fn test_product_test_uses_indirect_distribution() {
        let classifier = MediationClassifier::new(0.05, MediationTest::ProductBootstrap);
        // One leg fails on its own, but the product term is significant.
        let verdicts = classifier.classify(&[triangle(Some(0.01))], &paths(0.01, 0.08, 0.5));
        assert_eq!(verdicts[0].verdict, MediationType::Full);
        assert!(verdicts[0].significant_routes.is_empty());
    }

    #[test]
    fn test_pairs_without_direct_edge_get_no_verdict() {
        let mut record = triangle(None);
        record.direct_path = None;
        record.direct = None;
        let classifier = MediationClassifier::new(0.05, MediationTest::LegWise);
        assert!(classifier.classify(&[record], &paths(0.01, 0.01, 0.01)).is_empty());
    }
}
