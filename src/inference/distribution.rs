//! Student's t reference distribution via `statrs`.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Two-tailed p-value of a t statistic with `df` degrees of freedom.
///
/// An infinite statistic gives 0 and an undefined one (NaN, or df ≤ 0) gives
/// 1, so degenerate inputs never read as significant by accident.
pub fn two_tailed_p(t: f64, df: f64) -> f64 {
    if t.is_nan() || df <= 0.0 {
        return 1.0;
    }
    if t.is_infinite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 10.0, 1.0)]
    #[case(2.228, 10.0, 0.05)]
    #[case(-2.228, 10.0, 0.05)]
    #[case(1.96, 1e6, 0.05)]
    fn test_known_critical_values(#[case] t: f64, #[case] df: f64, #[case] expected: f64) {
        assert!((two_tailed_p(t, df) - expected).abs() < 1e-3, "p = {}", two_tailed_p(t, df));
    }

    #[rstest]
    #[case(f64::INFINITY, 0.0)]
    #[case(f64::NEG_INFINITY, 0.0)]
    #[case(f64::NAN, 1.0)]
    fn test_degenerate_statistics(#[case] t: f64, #[case] expected: f64) {
        assert_eq!(two_tailed_p(t, 20.0), expected);
    }

    #[test]
    fn test_non_positive_df_is_never_significant() {
        assert_eq!(two_tailed_p(50.0, 0.0), 1.0);
    }
}
