//! One hypothesis per structural path, decided on its bootstrap p-value.
//!
//! Hypotheses are directional: a path is supported only when it is
//! significant and positive.

use crate::inference::PathSignificance;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Positive,
    Negative,
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    Supported,
    NotSupported,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisResult {
    /// `H1`, `H2`, ... in path declaration order.
    pub label: String,
    pub source: String,
    pub target: String,
    pub estimate: f64,
    pub t_value: f64,
    pub p_value: f64,
    pub direction: Direction,
    pub decision: Decision,
}

/// Builds the table for `paths` at significance level `alpha`.
pub fn hypothesis_table(paths: &[PathSignificance], alpha: f64) -> Vec<HypothesisResult> {
    paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let beta = p.stats.original;
            let direction = if beta > 0.0 {
                Direction::Positive
            } else if beta < 0.0 {
                Direction::Negative
            } else {
                Direction::Zero
            };
            HypothesisResult {
                label: format!("H{}", i + 1),
                source: p.source.clone(),
                target: p.target.clone(),
                estimate: beta,
                t_value: p.stats.t_value,
                p_value: p.stats.p_value,
                direction,
                decision: if p.stats.p_value <= alpha && beta > 0.0 {
                    Decision::Supported
                } else {
                    Decision::NotSupported
                },
            }
        })
        .collect()
}
