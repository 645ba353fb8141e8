//! Run configuration.
//!
//! Every key is optional in the JSON form; absent keys take the defaults
//! below. `validate` is called by the pipeline before any work starts.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the composite an indicator is correlated against is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityPolicy {
    /// Composite includes the indicator under test.
    #[default]
    Inclusive,
    /// Composite is the mean of the construct's other indicators.
    LeaveOneOut,
}

/// Which evidence establishes an indirect effect when classifying mediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediationTest {
    /// Every edge on some route is individually significant.
    #[default]
    LegWise,
    /// The bootstrapped indirect effect of the pair is significant.
    ProductBootstrap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub bootstrap_iterations: usize,
    pub significance_level: f64,
    pub validity_threshold: f64,
    pub random_seed: Option<u64>,
    pub validity_policy: ValidityPolicy,
    pub mediation_test: MediationTest,
    pub prune_invalid_indicators: bool,
    /// Size of the bootstrap thread pool. `None` uses the global rayon pool.
    pub workers: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bootstrap_iterations: 5000,
            significance_level: 0.05,
            validity_threshold: 0.5,
            random_seed: None,
            validity_policy: ValidityPolicy::Inclusive,
            mediation_test: MediationTest::LegWise,
            prune_invalid_indicators: true,
            workers: None,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::ConfigRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.bootstrap_iterations = iterations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bootstrap_iterations < 2 {
            return Err(AnalysisError::InvalidConfig("bootstrap_iterations must be at least 2".into()));
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "significance_level must lie in (0, 1), got {}",
                self.significance_level
            )));
        }
        if !(self.validity_threshold > 0.0 && self.validity_threshold < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "validity_threshold must lie in (0, 1), got {}",
                self.validity_threshold
            )));
        }
        if self.workers == Some(0) {
            return Err(AnalysisError::InvalidConfig("workers must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_absent_keys_take_defaults() {
        let config = AnalysisConfig::from_json_str(r#"{"random_seed": 42}"#).unwrap();
        assert_eq!(config.random_seed, Some(42));
        assert_eq!(config.bootstrap_iterations, 5000);
        assert_eq!(config.validity_threshold, 0.5);
        assert!(config.prune_invalid_indicators);
    }

    #[test]
    fn test_policies_use_snake_case() {
        let config = AnalysisConfig::from_json_str(
            r#"{"validity_policy": "leave_one_out", "mediation_test": "product_bootstrap"}"#,
        )
        .unwrap();
        assert_eq!(config.validity_policy, ValidityPolicy::LeaveOneOut);
        assert_eq!(config.mediation_test, MediationTest::ProductBootstrap);
    }

    #[rstest]
    #[case(r#"{"bootstrap_iterations": 0}"#)]
    #[case(r#"{"bootstrap_iterations": 1}"#)]
    #[case(r#"{"significance_level": 1.0}"#)]
    #[case(r#"{"validity_threshold": 0.0}"#)]
    #[case(r#"{"workers": 0}"#)]
    #[case(r#"{"validity_policy": "sideways"}"#)]
    fn test_out_of_range_values_rejected(#[case] json: &str) {
        let err = AnalysisConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)), "got {err:?}");
    }
}
