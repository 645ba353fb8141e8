//! Structural estimation: one OLS equation per endogenous construct.

use super::ols::ols;
use super::scores::ScoreTable;
use crate::error::{AnalysisError, Result};
use crate::store::{ConstructId, PathModel};
use serde::Serialize;
use smallvec::SmallVec;

/// A parent's coefficient inside one equation, with analytic inference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathCoefficient {
    pub source: String,
    /// Index of the structural path in declaration order.
    pub path: usize,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionEquation {
    pub construct: String,
    pub intercept: f64,
    pub intercept_se: f64,
    pub coefficients: Vec<PathCoefficient>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub df: usize,
    pub respondents: usize,
}

/// All equations of a model plus a flat coefficient vector indexed by path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralEstimates {
    /// One equation per endogenous construct, in topological order.
    pub equations: Vec<RegressionEquation>,
    /// `path_coefficients[i]` is the coefficient of `model.paths()[i]`.
    pub path_coefficients: Vec<f64>,
}

impl StructuralEstimates {
    pub fn equation(&self, construct: &str) -> Option<&RegressionEquation> {
        self.equations.iter().find(|e| e.construct == construct)
    }

    /// Residual degrees of freedom of the equation that estimates each path.
    pub fn path_df(&self, path_count: usize) -> Vec<usize> {
        let mut df = vec![0; path_count];
        for eq in &self.equations {
            for c in &eq.coefficients {
                df[c.path] = eq.df;
            }
        }
        df
    }
}

/// Estimates every structural equation from a score table.
///
/// This is the single estimation routine: the one-shot fit and every
/// bootstrap resample go through it.
pub fn fit(scores: &ScoreTable, model: &PathModel) -> Result<StructuralEstimates> {
    let mut equations = Vec::new();
    let mut path_coefficients = vec![0.0; model.paths().len()];

    for target in model.endogenous() {
        let equation = fit_equation(scores, model, target)?;
        for c in &equation.coefficients {
            path_coefficients[c.path] = c.estimate;
        }
        equations.push(equation);
    }

    Ok(StructuralEstimates { equations, path_coefficients })
}

fn fit_equation(scores: &ScoreTable, model: &PathModel, target: ConstructId) -> Result<RegressionEquation> {
    let parents = model.parents(target);
    let xs: SmallVec<[&[f64]; 8]> = parents.iter().map(|&p| scores.column(p)).collect();

    let singular = || AnalysisError::SingularDesign {
        construct: model.name(target).to_string(),
        parents: parents.iter().map(|&p| model.name(p).to_string()).collect(),
    };
    let fit = ols(scores.column(target), &xs).ok_or_else(singular)?;

    let mut coefficients = Vec::with_capacity(parents.len());
    for (i, &parent) in parents.iter().enumerate() {
        let path = model.path_index(parent, target).ok_or_else(singular)?;
        coefficients.push(PathCoefficient {
            source: model.name(parent).to_string(),
            path,
            estimate: fit.coefficients[i],
            std_error: fit.std_errors[i],
            t_value: fit.t_values[i],
            p_value: fit.p_values[i],
        });
    }

    Ok(RegressionEquation {
        construct: model.name(target).to_string(),
        intercept: fit.intercept,
        intercept_se: fit.intercept_se,
        coefficients,
        r_squared: fit.r_squared,
        adj_r_squared: fit.adj_r_squared,
        df: fit.df,
        respondents: fit.n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::scores::LatentScoreComputer;
    use crate::store::{DataTable, ModelSpec};

    fn collider() -> PathModel {
        PathModel::build(
            &ModelSpec::new()
                .with_construct("Y", ["y1"])
                .with_construct("X1", ["x1"])
                .with_construct("X2", ["x2"])
                .with_path("X2", "Y")
                .with_path("X1", "Y"),
        )
        .unwrap()
    }

    #[test]
    fn test_coefficients_land_at_their_path_index() {
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x2 = vec![3.0, 1.0, 2.0, 6.0, 4.0, 5.0];
        let y: Vec<f64> = x1.iter().zip(&x2).map(|(a, b)| 0.4 * a + 0.9 * b).collect();
        let table = DataTable::from_columns(vec![("y1", y), ("x1", x1), ("x2", x2)]).unwrap();
        let model = collider();
        let scores = LatentScoreComputer::new(&model).compute(&table).unwrap();
        let est = fit(&scores, &model).unwrap();
        assert_eq!(est.equations.len(), 1);
        assert!((est.path_coefficients[0] - 0.9).abs() < 1e-10);
        assert!((est.path_coefficients[1] - 0.4).abs() < 1e-10);
        assert_eq!(est.path_df(2), vec![3, 3]);
    }

    #[test]
    fn test_collinear_parents_name_construct_and_parents() {
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let x2: Vec<f64> = x1.iter().map(|v| 2.0 * v + 1.0).collect();
        let table =
            DataTable::from_columns(vec![("y1", vec![1.0, 3.0, 2.0, 5.0, 4.0]), ("x1", x1), ("x2", x2)]).unwrap();
        let model = collider();
        let scores = LatentScoreComputer::new(&model).compute(&table).unwrap();
        let err = fit(&scores, &model).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::SingularDesign { construct: "Y".into(), parents: vec!["X2".into(), "X1".into()] }
        );
    }
}
