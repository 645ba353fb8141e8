//! The analysis pipeline.
//!
//! Every stage takes the previous stage's value and returns a new one. The
//! model is held behind an `Arc`, so edits to the `ModelSpec` it came from
//! only show up in runs built from a fresh `PathModel`.

use crate::compute::{fit, LatentScoreComputer, StructuralEstimates};
use crate::config::AnalysisConfig;
use crate::effects::{hypothesis_table, EffectPlan, EffectRecord, HypothesisResult, MediationClassifier, MediationVerdict};
use crate::error::Result;
use crate::inference::{BootstrapResult, CancellationToken, SignificanceEngine};
use crate::measurement::{MeasurementValidator, ValidityReport};
use crate::store::{DataTable, PathModel};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// What a snapshot was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provenance {
    pub model_revision: u64,
    pub data_fingerprint: u64,
    pub config: AnalysisConfig,
}

/// The complete, immutable result of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    pub provenance: Provenance,
    pub validity: ValidityReport,
    /// Indicators removed before scoring, when pruning is enabled.
    pub dropped_indicators: Vec<String>,
    /// Respondents that survived complete-case filtering.
    pub respondents: usize,
    pub estimates: StructuralEstimates,
    pub bootstrap: BootstrapResult,
    pub effects: Vec<EffectRecord>,
    pub mediation: Vec<MediationVerdict>,
    pub hypotheses: Vec<HypothesisResult>,
}

impl AnalysisSnapshot {
    pub fn effect(&self, source: &str, target: &str) -> Option<&EffectRecord> {
        self.effects.iter().find(|e| e.source == source && e.target == target)
    }

    pub fn mediation_for(&self, source: &str, target: &str) -> Option<&MediationVerdict> {
        self.mediation.iter().find(|m| m.source == source && m.target == target)
    }

    /// Fitted coefficient of the path `source -> target`.
    pub fn coefficient(&self, source: &str, target: &str) -> Option<f64> {
        self.estimates
            .equation(target)?
            .coefficients
            .iter()
            .find(|c| c.source == source)
            .map(|c| c.estimate)
    }
}

pub struct PathAnalysis {
    model: Arc<PathModel>,
    config: AnalysisConfig,
}

impl PathAnalysis {
    pub fn new(model: Arc<PathModel>, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    pub fn model(&self) -> &Arc<PathModel> { &self.model }
    pub fn config(&self) -> &AnalysisConfig { &self.config }

    /// Indicator validity on its own, so a caller can review and prune before
    /// a full run.
    pub fn validate_measurement(&self, table: &DataTable) -> Result<ValidityReport> {
        MeasurementValidator::from_config(&self.config).evaluate(&self.model, table)
    }

    pub fn run(&self, table: &DataTable) -> Result<AnalysisSnapshot> {
        self.run_with_cancel(table, &CancellationToken::new())
    }

    pub fn run_with_cancel(&self, table: &DataTable, cancel: &CancellationToken) -> Result<AnalysisSnapshot> {
        let config = &self.config;
        table.select(self.model.indicator_columns())?;

        let validity = MeasurementValidator::from_config(config).validate(&self.model, table)?;
        info!(invalid = validity.invalid().count(), "Measurement validated");

        let (model, dropped_indicators) = if config.prune_invalid_indicators && !validity.is_clean() {
            let dropped = validity.invalid().map(|i| i.indicator.clone()).collect();
            (Arc::new(self.model.pruned(&validity)?), dropped)
        } else {
            (Arc::clone(&self.model), Vec::new())
        };

        let scores = LatentScoreComputer::new(&model).compute(table)?;
        let estimates = fit(&scores, &model)?;
        info!(respondents = scores.respondents(), equations = estimates.equations.len(), "Structural model estimated");

        let plan = EffectPlan::new(&model);
        let bootstrap = SignificanceEngine::new(&model, &plan, config).run(&scores, &estimates, cancel)?;

        let mut effects = plan.evaluate(&model, &estimates.path_coefficients);
        for (i, record) in effects.iter_mut().enumerate() {
            if record.has_indirect() {
                record.indirect_significance = Some(bootstrap.indirect[i].clone());
            }
            record.total_significance = Some(bootstrap.total[i].clone());
        }

        let mediation =
            MediationClassifier::new(config.significance_level, config.mediation_test).classify(&effects, &bootstrap.paths);
        let hypotheses = hypothesis_table(&bootstrap.paths, config.significance_level);
        info!(pairs = effects.len(), verdicts = mediation.len(), "Effects decomposed");

        Ok(AnalysisSnapshot {
            provenance: Provenance {
                model_revision: self.model.revision(),
                data_fingerprint: table.fingerprint(),
                config: config.clone(),
            },
            validity,
            dropped_indicators,
            respondents: scores.respondents(),
            estimates,
            bootstrap,
            effects,
            mediation,
            hypotheses,
        })
    }
}
