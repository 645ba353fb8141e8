//! Indicator validity: each indicator's correlation with its construct's
//! composite score.

use super::reliability::ConstructReliability;
use crate::compute::kernel;
use crate::compute::scores::complete_case_rows;
use crate::config::{AnalysisConfig, ValidityPolicy};
use crate::error::{AnalysisError, Result};
use crate::store::{DataTable, PathModel};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorValidity {
    pub construct: String,
    pub indicator: String,
    pub correlation: f64,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidityReport {
    pub threshold: f64,
    pub policy: ValidityPolicy,
    /// Complete-case respondents the correlations were computed on.
    pub respondents: usize,
    pub indicators: Vec<IndicatorValidity>,
    pub reliability: Vec<ConstructReliability>,
}

impl ValidityReport {
    pub fn invalid(&self) -> impl Iterator<Item = &IndicatorValidity> {
        self.indicators.iter().filter(|i| !i.valid)
    }

    pub fn is_clean(&self) -> bool { self.invalid().next().is_none() }

    pub fn indicator(&self, name: &str) -> Option<&IndicatorValidity> {
        self.indicators.iter().find(|i| i.indicator == name)
    }

    /// First construct (in model order) with no valid indicator.
    pub fn first_empty_construct(&self) -> Option<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.indicators {
            if !seen.contains(&row.construct.as_str()) {
                seen.push(&row.construct);
            }
        }
        seen.into_iter()
            .find(|c| !self.indicators.iter().any(|i| i.construct == *c && i.valid))
    }
}

pub struct MeasurementValidator {
    threshold: f64,
    policy: ValidityPolicy,
}

impl MeasurementValidator {
    pub fn new(threshold: f64, policy: ValidityPolicy) -> Self {
        Self { threshold, policy }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.validity_threshold, config.validity_policy)
    }

    /// Correlates every indicator with its composite and flags the weak ones.
    ///
    /// Indicator failures are rows of the report, never errors; only a schema
    /// problem fails here.
    pub fn evaluate(&self, model: &PathModel, table: &DataTable) -> Result<ValidityReport> {
        let rows = complete_case_rows(model, table)?;
        let mut indicators = Vec::new();
        let mut reliability = Vec::new();

        for id in model.constructs() {
            let construct = model.name(id);
            let names = model.indicators(id);
            let columns: Vec<Vec<f64>> = table
                .select(names.iter().map(String::as_str))?
                .into_iter()
                .map(|col| rows.iter().map(|&r| col[r]).collect())
                .collect();
            let composite = row_means(&columns, None);

            let mut loadings = Vec::new();
            let mut valid_columns = Vec::new();
            for (j, (name, column)) in names.iter().zip(&columns).enumerate() {
                let correlation = match self.policy {
                    ValidityPolicy::LeaveOneOut if columns.len() > 1 => {
                        indicator_correlation(column, &row_means(&columns, Some(j)))
                    }
                    _ => indicator_correlation(column, &composite),
                };
                let valid = correlation.abs() >= self.threshold;
                if valid {
                    loadings.push(correlation);
                    valid_columns.push(column.as_slice());
                } else {
                    warn!(construct, indicator = %name, correlation, threshold = self.threshold, "Indicator below validity threshold");
                }
                indicators.push(IndicatorValidity {
                    construct: construct.to_string(),
                    indicator: name.clone(),
                    correlation,
                    valid,
                });
            }
            reliability.push(ConstructReliability::assess(construct, &valid_columns, &loadings));
        }

        debug!(respondents = rows.len(), indicators = indicators.len(), "Validity evaluated");
        Ok(ValidityReport { threshold: self.threshold, policy: self.policy, respondents: rows.len(), indicators, reliability })
    }

    /// [`Self::evaluate`], failing with `EmptyConstruct` when some construct
    /// has no valid indicator left.
    pub fn validate(&self, model: &PathModel, table: &DataTable) -> Result<ValidityReport> {
        let report = self.evaluate(model, table)?;
        if let Some(construct) = report.first_empty_construct() {
            return Err(AnalysisError::EmptyConstruct { construct: construct.to_string() });
        }
        Ok(report)
    }
}

impl PathModel {
    /// A new snapshot without the indicators the report flags invalid.
    pub fn pruned(&self, report: &ValidityReport) -> Result<PathModel> {
        let dropped: HashSet<&str> = report.invalid().map(|i| i.indicator.as_str()).collect();
        if dropped.is_empty() {
            return Ok(self.clone());
        }
        self.without_indicators(&dropped)
    }
}

/// Row-wise mean of `columns`, optionally leaving one column out.
fn row_means(columns: &[Vec<f64>], skip: Option<usize>) -> Vec<f64> {
    let rows = columns.first().map_or(0, Vec::len);
    let used: Vec<&Vec<f64>> =
        columns.iter().enumerate().filter(|(j, _)| Some(*j) != skip).map(|(_, c)| c).collect();
    let width = used.len() as f64;
    (0..rows).map(|r| used.iter().map(|c| c[r]).sum::<f64>() / width).collect()
}

/// Pearson correlation of an indicator with a composite.
///
/// A composite identical to the indicator (a lone indicator) correlates
/// perfectly; any other zero-variance side has no linear association.
fn indicator_correlation(indicator: &[f64], composite: &[f64]) -> f64 {
    if indicator == composite {
        return 1.0;
    }
    kernel::pearson(indicator, composite).unwrap_or(0.0)
}
