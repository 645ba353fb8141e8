//! Structural path analysis over survey data.
//!
//! Indicators are averaged into construct scores, each endogenous construct
//! is regressed on its direct causes, and path significance comes from a
//! respondent-level bootstrap. Effects between every connected pair are then
//! decomposed and classified for mediation.

pub mod analysis;
pub mod compute;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod inference;
pub mod logging;
pub mod measurement;
pub mod store;
pub mod synthetic;
pub mod validation;
pub mod display {
    pub mod report;
}
#[cfg(feature = "python")]
pub mod bindings {
    pub mod python;
}

pub use crate::config::{AnalysisConfig, MediationTest, ValidityPolicy};
pub use crate::engine::{AnalysisSnapshot, PathAnalysis, Provenance};
pub use crate::error::{AnalysisError, Result};
pub use crate::inference::CancellationToken;
pub use crate::store::{DataTable, ModelSpec, PathModel};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Defines the `_core` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    bindings::python::register(m)
}
