//! Synthetic respondent data: blank Likert templates and datasets with
//! planted path coefficients.

use crate::error::{AnalysisError, Result};
use crate::store::{DataTable, PathModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Random 1–5 Likert answers for every indicator of the model, preceded by a
/// 1-based `id` column.
pub fn likert_template(respondents: usize, model: &PathModel, seed: u64) -> Result<DataTable> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut columns = vec![("id".to_string(), (1..=respondents).map(|i| i as f64).collect::<Vec<_>>())];
    for name in model.indicator_columns() {
        let values = (0..respondents).map(|_| f64::from(rng.gen_range(1u8..=5))).collect();
        columns.push((name.to_string(), values));
    }
    DataTable::from_columns(columns)
}

/// Generates data whose construct scores follow chosen path coefficients.
///
/// Exogenous indicators are drawn uniformly from [1, 5] and the construct's
/// score is their mean. An endogenous score is Σ β·parent + uniform noise in
/// `[-noise, noise]`, and each of its indicators is that score plus uniform
/// noise in `[-indicator_noise, indicator_noise]`.
pub struct SyntheticBuilder<'a> {
    model: &'a PathModel,
    respondents: usize,
    coefficients: HashMap<(String, String), f64>,
    noise: f64,
    indicator_noise: f64,
    seed: u64,
}

impl<'a> SyntheticBuilder<'a> {
    pub fn new(model: &'a PathModel, respondents: usize) -> Self {
        Self { model, respondents, coefficients: HashMap::new(), noise: 0.1, indicator_noise: 0.0, seed: 0 }
    }

    /// Plants `beta` on the path `source -> target`. Unplanted paths are 0.
    pub fn path(mut self, source: &str, target: &str, beta: f64) -> Self {
        self.coefficients.insert((source.to_string(), target.to_string()), beta);
        self
    }

    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn indicator_noise(mut self, noise: f64) -> Self {
        self.indicator_noise = noise;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(&self) -> Result<DataTable> {
        let model = self.model;
        for (source, target) in self.coefficients.keys() {
            let planted = model
                .id_of(source)
                .zip(model.id_of(target))
                .and_then(|(s, t)| model.path_index(s, t));
            if planted.is_none() {
                return Err(AnalysisError::InvalidConfig(format!("no path '{source}' -> '{target}' to plant")));
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = self.respondents;
        let mut scores: Vec<Vec<f64>> = vec![Vec::new(); model.construct_count()];
        let mut columns: Vec<(String, Vec<f64>)> = Vec::new();

        for &id in model.topological_order() {
            let indicators = model.indicators(id);
            if model.is_endogenous(id) {
                let mut score = vec![0.0; n];
                for &parent in model.parents(id) {
                    let key = (model.name(parent).to_string(), model.name(id).to_string());
                    let beta = self.coefficients.get(&key).copied().unwrap_or(0.0);
                    for (s, p) in score.iter_mut().zip(&scores[parent.index()]) {
                        *s += beta * p;
                    }
                }
                for s in &mut score {
                    *s += symmetric(&mut rng, self.noise);
                }
                for name in indicators {
                    let values = score.iter().map(|s| s + symmetric(&mut rng, self.indicator_noise)).collect();
                    columns.push((name.clone(), values));
                }
                scores[id.index()] = score;
            } else {
                let items: Vec<Vec<f64>> =
                    indicators.iter().map(|_| (0..n).map(|_| rng.gen_range(1.0..=5.0)).collect()).collect();
                let width = items.len() as f64;
                scores[id.index()] = (0..n).map(|r| items.iter().map(|c| c[r]).sum::<f64>() / width).collect();
                columns.extend(indicators.iter().cloned().zip(items));
            }
        }

        DataTable::from_columns(columns)
    }
}

fn symmetric(rng: &mut StdRng, half_width: f64) -> f64 {
    if half_width > 0.0 {
        rng.gen_range(-half_width..=half_width)
    } else {
        0.0
    }
}
