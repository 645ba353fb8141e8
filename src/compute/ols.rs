//! Ordinary least squares with an intercept.
//!
//! The intercept is profiled out by centring every column, so the normal
//! equations are only `k × k` in the number of predictors.

use super::kernel;
use super::linalg::invert_cross_products;
use crate::inference::distribution::two_tailed_p;
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub t_values: Vec<f64>,
    pub p_values: Vec<f64>,
    pub intercept: f64,
    pub intercept_se: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// Residual degrees of freedom, n − k − 1.
    pub df: usize,
    pub n: usize,
}

/// Regresses `y` on `xs` plus an intercept.
///
/// Returns `None` when the centred cross-product matrix is singular (a
/// constant or collinear predictor). Callers guarantee `n ≥ k + 2`.
pub fn ols(y: &[f64], xs: &[&[f64]]) -> Option<OlsFit> {
    let n = y.len();
    let k = xs.len();

    let (yc, y_mean) = kernel::centered(y);
    let (xc, x_means): (Vec<Vec<f64>>, Vec<f64>) = xs.iter().map(|x| kernel::centered(x)).unzip();

    let mut xtx = DMatrix::zeros(k, k);
    for i in 0..k {
        for j in i..k {
            let v = kernel::dot(&xc[i], &xc[j]);
            xtx[(i, j)] = v;
            xtx[(j, i)] = v;
        }
    }
    let xty = DVector::from_iterator(k, xc.iter().map(|x| kernel::dot(x, &yc)));

    let inv = invert_cross_products(xtx)?;
    let coefficients: Vec<f64> = (&inv * &xty).iter().copied().collect();
    let intercept = y_mean - coefficients.iter().zip(&x_means).map(|(b, m)| b * m).sum::<f64>();

    let mut residuals = yc;
    for (b, x) in coefficients.iter().zip(&xc) {
        for (r, v) in residuals.iter_mut().zip(x) {
            *r -= b * v;
        }
    }
    let sse = kernel::dot(&residuals, &residuals);
    let sst = {
        let (c, _) = kernel::centered(y);
        kernel::dot(&c, &c)
    };

    let df = n.saturating_sub(k + 1);
    let sigma2 = if df > 0 { sse / df as f64 } else { f64::NAN };

    let std_errors: Vec<f64> = (0..k).map(|i| (sigma2 * inv[(i, i)]).max(0.0).sqrt()).collect();
    let t_values: Vec<f64> = coefficients.iter().zip(&std_errors).map(|(b, se)| t_statistic(*b, *se)).collect();
    let p_values = t_values.iter().map(|&t| two_tailed_p(t, df as f64)).collect();

    let means = DVector::from_column_slice(&x_means);
    let intercept_se = (sigma2 * (1.0 / n as f64 + means.dot(&(&inv * &means)))).max(0.0).sqrt();

    let r_squared = if sst > 0.0 { (1.0 - sse / sst).clamp(0.0, 1.0) } else { 0.0 };
    let adj_r_squared = if df > 0 && n > 1 {
        1.0 - (1.0 - r_squared) * (n - 1) as f64 / df as f64
    } else {
        r_squared
    };

    Some(OlsFit {
        coefficients,
        std_errors,
        t_values,
        p_values,
        intercept,
        intercept_se,
        r_squared,
        adj_r_squared,
        df,
        n,
    })
}

/// `estimate / se`, with a zero standard error mapped to ±∞ (or 0 for a zero
/// estimate).
pub fn t_statistic(estimate: f64, se: f64) -> f64 {
    if se > 0.0 {
        estimate / se
    } else if estimate == 0.0 {
        0.0
    } else {
        estimate.signum() * f64::INFINITY
    }
}
