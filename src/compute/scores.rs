//! Composite construct scores.

use crate::error::{AnalysisError, Result};
use crate::store::{complete_rows, ConstructId, DataTable, PathModel};
use serde::Serialize;
use tracing::debug;

/// One score column per construct (indexed by `ConstructId`), one row per
/// retained respondent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    /// Row numbers of the source table that survived complete-case filtering.
    retained_rows: Vec<usize>,
}

impl ScoreTable {
    pub fn respondents(&self) -> usize { self.retained_rows.len() }
    pub fn retained_rows(&self) -> &[usize] { &self.retained_rows }
    pub fn column(&self, id: ConstructId) -> &[f64] { &self.columns[id.index()] }

    pub fn column_by_name(&self, name: &str) -> Option<&[f64]> {
        self.names.iter().position(|n| n == name).map(|i| self.columns[i].as_slice())
    }

    /// Fills `out` with the rows at `indices`, keeping whole respondent rows
    /// together. `out` is reused across calls to avoid reallocating.
    pub fn resample_into(&self, indices: &[usize], out: &mut ScoreTable) {
        out.names.clone_from(&self.names);
        out.columns.resize_with(self.columns.len(), Vec::new);
        for (src, dst) in self.columns.iter().zip(out.columns.iter_mut()) {
            dst.clear();
            dst.extend(indices.iter().map(|&r| src[r]));
        }
        out.retained_rows.clear();
        out.retained_rows.extend(indices.iter().map(|&r| self.retained_rows[r]));
    }

    pub fn empty() -> Self {
        Self { names: Vec::new(), columns: Vec::new(), retained_rows: Vec::new() }
    }
}

/// Computes mean-composite scores under complete-case filtering.
pub struct LatentScoreComputer<'a> {
    model: &'a PathModel,
}

impl<'a> LatentScoreComputer<'a> {
    pub fn new(model: &'a PathModel) -> Self {
        Self { model }
    }

    /// Drops every respondent with a missing value in any model indicator,
    /// then scores each construct as the mean of its indicators.
    ///
    /// Fails with `DataSchema` for absent columns and with `InsufficientData`
    /// when some equation would have no residual degrees of freedom.
    pub fn compute(&self, table: &DataTable) -> Result<ScoreTable> {
        let rows = complete_case_rows(self.model, table)?;
        self.check_sample_size(rows.len())?;

        let mut names = Vec::with_capacity(self.model.construct_count());
        let mut columns = Vec::with_capacity(self.model.construct_count());
        for id in self.model.constructs() {
            let indicators = table.select(self.model.indicators(id).iter().map(String::as_str))?;
            let width = indicators.len() as f64;
            let scores: Vec<f64> = rows
                .iter()
                .map(|&r| indicators.iter().map(|col| col[r]).sum::<f64>() / width)
                .collect();
            names.push(self.model.name(id).to_string());
            columns.push(scores);
        }

        debug!(respondents = rows.len(), dropped = table.row_count() - rows.len(), "Scored constructs");
        Ok(ScoreTable { names, columns, retained_rows: rows })
    }

    fn check_sample_size(&self, respondents: usize) -> Result<()> {
        let limiting = self
            .model
            .endogenous()
            .map(|id| (id, self.model.parents(id).len() + 2))
            .max_by_key(|&(_, required)| required);
        match limiting {
            Some((id, required)) if respondents < required => Err(AnalysisError::InsufficientData {
                construct: self.model.name(id).to_string(),
                respondents,
                required,
            }),
            _ => Ok(()),
        }
    }
}

/// Rows with a finite value in every indicator column of the model.
pub fn complete_case_rows(model: &PathModel, table: &DataTable) -> Result<Vec<usize>> {
    let columns = table.select(model.indicator_columns())?;
    Ok(complete_rows(&columns, table.row_count()))
}
