//! Inversion of the normal equations.
//!
//! Designs have one column per parent construct, so `k` is small. The
//! cross-product matrix is factored with nalgebra's partially pivoted LU and
//! the pivots are checked against a tolerance relative to the diagonal.

use nalgebra::DMatrix;

/// Pivots smaller than this fraction of the largest diagonal entry are
/// treated as zero.
pub const RELATIVE_PIVOT_TOLERANCE: f64 = 1e-10;

/// Inverse of a symmetric cross-product matrix.
///
/// Returns `None` when the matrix is singular or numerically so.
pub fn invert_cross_products(xtx: DMatrix<f64>) -> Option<DMatrix<f64>> {
    if xtx.is_empty() {
        return Some(xtx);
    }
    let scale = xtx.diagonal().amax();
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    let tolerance = RELATIVE_PIVOT_TOLERANCE * scale;

    let lu = xtx.lu();
    if lu.u().diagonal().iter().any(|pivot| pivot.abs() <= tolerance) {
        return None;
    }
    lu.try_inverse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_times_matrix_is_identity() {
        let m = DMatrix::from_row_slice(3, 3, &[4.0, 2.0, 0.5, 2.0, 3.0, 1.0, 0.5, 1.0, 2.0]);
        let inv = invert_cross_products(m.clone()).unwrap();
        let product = &m * &inv;
        assert!((product - DMatrix::<f64>::identity(3, 3)).amax() < 1e-12);
    }

    #[test]
    fn test_pivoting_handles_dominant_off_diagonal() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let inv = invert_cross_products(m).unwrap();
        let expected = DMatrix::from_row_slice(2, 2, &[-1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0, -1.0 / 3.0]);
        assert!((inv - expected).amax() < 1e-12);
    }

    #[test]
    fn test_zero_variance_column_is_singular() {
        let m = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 0.0, 3.0]);
        assert!(invert_cross_products(m).is_none());
    }

    #[test]
    fn test_collinear_matrix_is_singular() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(invert_cross_products(m).is_none());
    }

    #[test]
    fn test_near_collinear_matrix_is_singular() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0 + 1e-13]);
        assert!(invert_cross_products(m).is_none());
    }

    #[test]
    fn test_zero_matrix_is_singular() {
        assert!(invert_cross_products(DMatrix::zeros(2, 2)).is_none());
    }
}
