//! Numeric core: composite scores and structural OLS estimation.

pub mod estimator;
pub mod kernel;
pub mod linalg;
pub mod ols;
pub mod scores;

pub use self::estimator::{fit, PathCoefficient, RegressionEquation, StructuralEstimates};
pub use self::scores::{LatentScoreComputer, ScoreTable};
