//! Resampling-based significance for path coefficients and effects.

pub mod accumulator;
pub mod bootstrap;
pub mod cancel;
pub mod distribution;

pub use self::bootstrap::{BootstrapResult, PathSignificance, Significance, SignificanceEngine};
pub use self::cancel::CancellationToken;
