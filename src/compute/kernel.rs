//! SIMD reductions over respondent columns.
//!
//! Columns are processed four lanes at a time with `wide::f64x4`; the tail is
//! folded in scalar code. Lane sums are reduced in a fixed order, so a given
//! input always produces the same bits.

use wide::f64x4;

#[inline(always)]
fn lanes(chunk: &[f64]) -> f64x4 {
    f64x4::from([chunk[0], chunk[1], chunk[2], chunk[3]])
}

/// Σ aᵢ·bᵢ over the common prefix of both slices.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    let (a, b) = (&a[..len], &b[..len]);
    let mut acc = f64x4::splat(0.0);
    let mut ca = a.chunks_exact(4);
    let mut cb = b.chunks_exact(4);
    for (x, y) in (&mut ca).zip(&mut cb) {
        acc += lanes(x) * lanes(y);
    }
    let tail: f64 = ca.remainder().iter().zip(cb.remainder()).map(|(x, y)| x * y).sum();
    acc.reduce_add() + tail
}

pub fn sum(a: &[f64]) -> f64 {
    let mut acc = f64x4::splat(0.0);
    let mut chunks = a.chunks_exact(4);
    for x in &mut chunks {
        acc += lanes(x);
    }
    acc.reduce_add() + chunks.remainder().iter().sum::<f64>()
}

pub fn mean(a: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    sum(a) / a.len() as f64
}

/// Copy of `a` shifted to mean zero, together with the mean removed.
pub fn centered(a: &[f64]) -> (Vec<f64>, f64) {
    let m = mean(a);
    (a.iter().map(|v| v - m).collect(), m)
}

/// True when every value equals the first (an empty column is constant).
pub fn is_constant(a: &[f64]) -> bool {
    match a.first() {
        Some(first) => a.iter().all(|v| v == first),
        None => true,
    }
}

/// Sample variance (n − 1 denominator). Zero for fewer than two values.
pub fn variance(a: &[f64]) -> f64 {
    if a.len() < 2 {
        return 0.0;
    }
    let (c, _) = centered(a);
    dot(&c, &c) / (a.len() - 1) as f64
}

/// Pearson correlation. `None` when either column has no variance.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if is_constant(a) || is_constant(b) {
        return None;
    }
    let (ca, _) = centered(a);
    let (cb, _) = centered(b);
    let sxy = dot(&ca, &cb);
    let sxx = dot(&ca, &ca);
    let syy = dot(&cb, &cb);
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}
