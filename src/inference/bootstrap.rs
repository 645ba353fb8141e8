//! Respondent-level bootstrap of every structural path and every pair's
//! indirect and total effect.
//!
//! Iteration `i` draws its resample from an RNG seeded with
//! `iteration_seed(base, i)`. Iterations are grouped into fixed chunks that
//! run on a rayon pool, and chunk statistics are merged in chunk order, so a
//! seeded run is bit-identical whatever the number of workers.

use super::accumulator::{merge_all, RunningStats};
use super::cancel::CancellationToken;
use super::distribution::two_tailed_p;
use crate::compute::estimator::{fit, StructuralEstimates};
use crate::compute::ols::t_statistic;
use crate::compute::scores::ScoreTable;
use crate::config::AnalysisConfig;
use crate::effects::EffectPlan;
use crate::error::{AnalysisError, Result};
use crate::store::PathModel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

const CHUNK: usize = 64;

/// Bootstrap summary of one statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Significance {
    /// Value on the full (non-resampled) data.
    pub original: f64,
    pub mean: f64,
    pub std_dev: f64,
    /// `original / std_dev`.
    pub t_value: f64,
    pub p_value: f64,
    pub df: usize,
    /// Resamples that contributed.
    pub resamples: u64,
}

impl Significance {
    /// With fewer than two resamples the spread is unknown, so t is NaN and
    /// the p-value is 1.
    fn from_stats(original: f64, stats: &RunningStats, df: usize) -> Self {
        let std_dev = if stats.count() < 2 { f64::NAN } else { stats.std_dev() };
        let t_value = if std_dev.is_nan() { f64::NAN } else { t_statistic(original, std_dev) };
        Self {
            original,
            mean: stats.mean(),
            std_dev,
            t_value,
            p_value: two_tailed_p(t_value, df as f64),
            df,
            resamples: stats.count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSignificance {
    pub source: String,
    pub target: String,
    /// Index of the path in declaration order.
    pub path: usize,
    #[serde(flatten)]
    pub stats: Significance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapResult {
    pub iterations: usize,
    /// Base seed actually used, so an unseeded run can be replayed.
    pub seed: u64,
    /// Resamples skipped because their design was singular.
    pub skipped_resamples: usize,
    /// One entry per structural path, in declaration order.
    pub paths: Vec<PathSignificance>,
    /// Indirect effect of each [`EffectPlan`] pair, in plan order.
    pub indirect: Vec<Significance>,
    /// Total effect of each [`EffectPlan`] pair, in plan order.
    pub total: Vec<Significance>,
}

pub struct SignificanceEngine<'a> {
    model: &'a PathModel,
    plan: &'a EffectPlan,
    iterations: usize,
    seed: Option<u64>,
    workers: Option<usize>,
}

impl<'a> SignificanceEngine<'a> {
    pub fn new(model: &'a PathModel, plan: &'a EffectPlan, config: &AnalysisConfig) -> Self {
        Self {
            model,
            plan,
            iterations: config.bootstrap_iterations,
            seed: config.random_seed,
            workers: config.workers,
        }
    }

    pub fn run(
        &self,
        scores: &ScoreTable,
        original: &StructuralEstimates,
        cancel: &CancellationToken,
    ) -> Result<BootstrapResult> {
        let base = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let chunks = self.iterations.div_ceil(CHUNK);
        info!(iterations = self.iterations, seed = base, chunks, "Starting bootstrap");

        let work = || {
            (0..chunks)
                .into_par_iter()
                .map(|c| self.run_chunk(c, base, scores, cancel))
                .collect::<Result<Vec<ChunkStats>>>()
        };
        let parts = match self.workers {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| AnalysisError::InvalidConfig(format!("cannot start {n} bootstrap workers: {e}")))?
                .install(work)?,
            None => work()?,
        };
        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        let mut totals = ChunkStats::new(self.model.paths().len(), self.plan.len());
        for part in &parts {
            totals.merge(part);
        }

        let usable = self.iterations - totals.skipped;
        if totals.skipped > 0 {
            warn!(skipped = totals.skipped, usable, "Singular bootstrap resamples skipped");
        }
        if usable < 2 {
            if let Some(err) = totals.first_error.take() {
                return Err(err);
            }
        }

        Ok(self.summarize(base, original, &totals))
    }

    fn run_chunk(&self, chunk: usize, base: u64, scores: &ScoreTable, cancel: &CancellationToken) -> Result<ChunkStats> {
        let n = scores.respondents();
        let start = chunk * CHUNK;
        let end = (start + CHUNK).min(self.iterations);

        let mut stats = ChunkStats::new(self.model.paths().len(), self.plan.len());
        let mut sample = ScoreTable::empty();
        let mut indices = Vec::with_capacity(n);
        let mut indirect = vec![0.0; self.plan.len()];
        let mut total = vec![0.0; self.plan.len()];

        for i in start..end {
            if cancel.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            let mut rng = StdRng::seed_from_u64(iteration_seed(base, i as u64));
            indices.clear();
            indices.extend((0..n).map(|_| rng.gen_range(0..n)));
            scores.resample_into(&indices, &mut sample);

            match fit(&sample, self.model) {
                Ok(est) => {
                    for (acc, &b) in stats.paths.iter_mut().zip(&est.path_coefficients) {
                        acc.push(b);
                    }
                    self.plan.evaluate_into(&est.path_coefficients, &mut indirect, &mut total);
                    for (acc, &v) in stats.indirect.iter_mut().zip(&indirect) {
                        acc.push(v);
                    }
                    for (acc, &v) in stats.total.iter_mut().zip(&total) {
                        acc.push(v);
                    }
                }
                Err(e) => {
                    stats.skipped += 1;
                    stats.first_error.get_or_insert(e);
                }
            }
        }
        Ok(stats)
    }

    fn summarize(&self, base: u64, original: &StructuralEstimates, totals: &ChunkStats) -> BootstrapResult {
        let model = self.model;
        let path_df = original.path_df(model.paths().len());

        let paths = model
            .paths()
            .iter()
            .enumerate()
            .map(|(i, edge)| PathSignificance {
                source: model.name(edge.source).to_string(),
                target: model.name(edge.target).to_string(),
                path: i,
                stats: Significance::from_stats(original.path_coefficients[i], &totals.paths[i], path_df[i]),
            })
            .collect();

        let mut indirect_orig = vec![0.0; self.plan.len()];
        let mut total_orig = vec![0.0; self.plan.len()];
        self.plan.evaluate_into(&original.path_coefficients, &mut indirect_orig, &mut total_orig);

        // Effects are reported against the degrees of freedom of the target's
        // equation.
        let pair_df: Vec<usize> = self
            .plan
            .pairs()
            .iter()
            .map(|p| original.equation(model.name(p.target)).map_or(0, |eq| eq.df))
            .collect();

        let indirect = (0..self.plan.len())
            .map(|i| Significance::from_stats(indirect_orig[i], &totals.indirect[i], pair_df[i]))
            .collect();
        let total = (0..self.plan.len())
            .map(|i| Significance::from_stats(total_orig[i], &totals.total[i], pair_df[i]))
            .collect();

        debug!(skipped = totals.skipped, "Bootstrap summarized");
        BootstrapResult { iterations: self.iterations, seed: base, skipped_resamples: totals.skipped, paths, indirect, total }
    }
}

struct ChunkStats {
    paths: Vec<RunningStats>,
    indirect: Vec<RunningStats>,
    total: Vec<RunningStats>,
    skipped: usize,
    first_error: Option<AnalysisError>,
}

impl ChunkStats {
    fn new(paths: usize, pairs: usize) -> Self {
        Self {
            paths: vec![RunningStats::new(); paths],
            indirect: vec![RunningStats::new(); pairs],
            total: vec![RunningStats::new(); pairs],
            skipped: 0,
            first_error: None,
        }
    }

    fn merge(&mut self, other: &ChunkStats) {
        merge_all(&mut self.paths, &other.paths);
        merge_all(&mut self.indirect, &other.indirect);
        merge_all(&mut self.total, &other.total);
        self.skipped += other.skipped;
        if self.first_error.is_none() {
            self.first_error.clone_from(&other.first_error);
        }
    }
}

/// SplitMix64 finaliser over (base seed, iteration).
pub fn iteration_seed(base: u64, iteration: u64) -> u64 {
    let mut z = base ^ iteration.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::scores::LatentScoreComputer;
    use crate::store::{DataTable, ModelSpec};

    fn setup() -> (PathModel, DataTable) {
        let model = PathModel::build(
            &ModelSpec::new().with_construct("X", ["x1"]).with_construct("Y", ["y1"]).with_path("X", "Y"),
        )
        .unwrap();
        let x: Vec<f64> = (0..40).map(|i| (i % 7) as f64 + (i % 3) as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().enumerate().map(|(i, v)| 0.6 * v + ((i * 13) % 5) as f64 * 0.2).collect();
        (model, DataTable::from_columns(vec![("x1", x), ("y1", y)]).unwrap())
    }

    fn run(model: &PathModel, table: &DataTable, config: &AnalysisConfig) -> Result<BootstrapResult> {
        let scores = LatentScoreComputer::new(model).compute(table)?;
        let original = fit(&scores, model)?;
        let plan = EffectPlan::new(model);
        SignificanceEngine::new(model, &plan, config).run(&scores, &original, &CancellationToken::new())
    }

    #[test]
    fn test_seeded_runs_are_identical_across_worker_counts() {
        let (model, table) = setup();
        let one = AnalysisConfig { workers: Some(1), ..AnalysisConfig::default() }.with_seed(7).with_iterations(300);
        let four = AnalysisConfig { workers: Some(4), ..one.clone() };
        assert_eq!(run(&model, &table, &one).unwrap(), run(&model, &table, &four).unwrap());
    }

    #[test]
    fn test_different_seeds_differ() {
        let (model, table) = setup();
        let a = run(&model, &table, &AnalysisConfig::default().with_seed(1).with_iterations(200)).unwrap();
        let b = run(&model, &table, &AnalysisConfig::default().with_seed(2).with_iterations(200)).unwrap();
        assert_ne!(a.paths[0].stats.mean, b.paths[0].stats.mean);
    }

    #[test]
    fn test_strong_path_is_significant() {
        let (model, table) = setup();
        let result = run(&model, &table, &AnalysisConfig::default().with_seed(3).with_iterations(500)).unwrap();
        let path = &result.paths[0];
        assert_eq!(path.stats.resamples, 500);
        assert_eq!(path.stats.df, 38);
        assert!(path.stats.p_value < 0.05, "p = {}", path.stats.p_value);
    }

    #[test]
    fn test_cancelled_run_reports_cancelled() {
        let (model, table) = setup();
        let scores = LatentScoreComputer::new(&model).compute(&table).unwrap();
        let original = fit(&scores, &model).unwrap();
        let plan = EffectPlan::new(&model);
        let token = CancellationToken::new();
        token.cancel();
        let config = AnalysisConfig::default().with_seed(1).with_iterations(100);
        let err = SignificanceEngine::new(&model, &plan, &config).run(&scores, &original, &token).unwrap_err();
        assert_eq!(err, AnalysisError::Cancelled);
    }

    #[test]
    fn test_single_resample_is_never_significant() {
        let (model, table) = setup();
        let result = run(&model, &table, &AnalysisConfig::default().with_seed(42).with_iterations(1)).unwrap();
        let path = &result.paths[0];
        assert_eq!(path.stats.resamples, 1);
        assert!(path.stats.std_dev.is_nan());
        assert!(path.stats.t_value.is_nan());
        assert_eq!(path.stats.p_value, 1.0);
        assert!(result.total.iter().all(|s| s.p_value == 1.0));
    }

    fn two_valued_parent() -> (PathModel, DataTable) {
        let model = PathModel::build(
            &ModelSpec::new().with_construct("X", ["x1"]).with_construct("Y", ["y1"]).with_path("X", "Y"),
        )
        .unwrap();
        let x = vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let y = vec![1.0, 1.5, 0.5, 2.0, 1.2, 3.0];
        (model, DataTable::from_columns(vec![("x1", x), ("y1", y)]).unwrap())
    }

    #[test]
    fn test_constant_parent_resamples_are_skipped_and_counted() {
        let (model, table) = two_valued_parent();
        let result = run(&model, &table, &AnalysisConfig::default().with_seed(11).with_iterations(200)).unwrap();
        let path = &result.paths[0];
        assert!(result.skipped_resamples > 0);
        assert_eq!(path.stats.resamples as usize + result.skipped_resamples, 200);
    }

    #[test]
    fn test_all_singular_resamples_report_the_design() {
        let (model, table) = setup();
        let original = fit(&LatentScoreComputer::new(&model).compute(&table).unwrap(), &model).unwrap();
        let flat = DataTable::from_columns(vec![("x1", vec![2.0; 10]), ("y1", (0..10).map(f64::from).collect())]).unwrap();
        let scores = LatentScoreComputer::new(&model).compute(&flat).unwrap();
        let plan = EffectPlan::new(&model);
        let config = AnalysisConfig::default().with_seed(5).with_iterations(50);
        let err = SignificanceEngine::new(&model, &plan, &config)
            .run(&scores, &original, &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err, AnalysisError::SingularDesign { construct: "Y".into(), parents: vec!["X".into()] });
    }

    #[test]
    fn test_iteration_seeds_are_distinct() {
        let seeds: std::collections::HashSet<u64> = (0..1000).map(|i| iteration_seed(42, i)).collect();
        assert_eq!(seeds.len(), 1000);
    }
}
