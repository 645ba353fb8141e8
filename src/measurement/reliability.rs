//! Internal-consistency summaries for each construct's retained indicators.

use crate::compute::kernel;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructReliability {
    pub construct: String,
    /// Number of valid indicators the summary is based on.
    pub indicators: usize,
    /// Cronbach's alpha. Undefined for fewer than two items or a constant sum.
    pub cronbach_alpha: Option<f64>,
    /// (Σλ)² / ((Σλ)² + Σ(1 − λ²)) over the indicator loadings λ.
    pub composite_reliability: Option<f64>,
    /// Average variance extracted, mean(λ²).
    pub average_variance_extracted: Option<f64>,
}

impl ConstructReliability {
    /// `columns` are the valid items (complete cases only) and `loadings` their
    /// composite correlations, in the same order.
    pub fn assess(construct: &str, columns: &[&[f64]], loadings: &[f64]) -> Self {
        Self {
            construct: construct.to_string(),
            indicators: columns.len(),
            cronbach_alpha: cronbach_alpha(columns),
            composite_reliability: composite_reliability(loadings),
            average_variance_extracted: average_variance_extracted(loadings),
        }
    }

    /// Conventional cut-offs: CR ≥ 0.7 and AVE ≥ 0.5.
    pub fn is_acceptable(&self) -> bool {
        matches!(
            (self.composite_reliability, self.average_variance_extracted),
            (Some(cr), Some(ave)) if cr >= 0.7 && ave >= 0.5
        )
    }
}

pub fn cronbach_alpha(columns: &[&[f64]]) -> Option<f64> {
    let k = columns.len();
    if k < 2 {
        return None;
    }
    let rows = columns[0].len();
    let totals: Vec<f64> = (0..rows).map(|r| columns.iter().map(|c| c[r]).sum()).collect();
    let total_var = kernel::variance(&totals);
    if total_var <= 0.0 {
        return None;
    }
    let item_var: f64 = columns.iter().map(|c| kernel::variance(c)).sum();
    let k = k as f64;
    Some(k / (k - 1.0) * (1.0 - item_var / total_var))
}

pub fn composite_reliability(loadings: &[f64]) -> Option<f64> {
    if loadings.is_empty() {
        return None;
    }
    let sum: f64 = loadings.iter().sum();
    let error: f64 = loadings.iter().map(|l| 1.0 - l * l).sum();
    let num = sum * sum;
    if num + error == 0.0 {
        return None;
    }
    Some(num / (num + error))
}

pub fn average_variance_extracted(loadings: &[f64]) -> Option<f64> {
    if loadings.is_empty() {
        return None;
    }
    Some(loadings.iter().map(|l| l * l).sum::<f64>() / loadings.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_items_have_perfect_alpha() {
        let item = [1.0, 2.0, 4.0, 3.0];
        let alpha = cronbach_alpha(&[&item, &item, &item]).unwrap();
        assert!((alpha - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_alpha_undefined_for_single_item() {
        assert_eq!(cronbach_alpha(&[&[1.0, 2.0]]), None);
    }

    #[test]
    fn test_cr_and_ave_from_loadings() {
        let loadings = [0.8, 0.7, 0.9];
        let ave = average_variance_extracted(&loadings).unwrap();
        assert!((ave - (0.64 + 0.49 + 0.81) / 3.0).abs() < 1e-12);
        let cr = composite_reliability(&loadings).unwrap();
        let expected = 2.4 * 2.4 / (2.4 * 2.4 + (0.36 + 0.51 + 0.19));
        assert!((cr - expected).abs() < 1e-12);
        let summary = ConstructReliability::assess("A", &[], &loadings);
        assert!(summary.is_acceptable());
    }

    #[test]
    fn test_no_loadings_is_not_acceptable() {
        let summary = ConstructReliability::assess("A", &[], &[]);
        assert_eq!(summary.composite_reliability, None);
        assert!(!summary.is_acceptable());
    }
}
