use crate::config::AnalysisConfig;
use crate::display::report;
use crate::engine::{AnalysisSnapshot, PathAnalysis};
use crate::error::AnalysisError;
use crate::store::{DataTable, ModelSpec, PathModel};
use crate::synthetic;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::sync::Arc;

fn to_py_err(e: AnalysisError) -> PyErr {
    match e {
        AnalysisError::Cancelled | AnalysisError::SingularDesign { .. } => PyRuntimeError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

#[pyclass(name = "_ModelSpec")]
#[derive(Debug, Clone, Default)]
pub struct PyModelSpec {
    inner: ModelSpec,
}

#[pymethods]
impl PyModelSpec {
    #[new]
    pub fn new() -> Self { Self::default() }

    #[staticmethod]
    pub fn from_json(json: &str) -> PyResult<Self> {
        ModelSpec::from_json_str(json).map(|inner| Self { inner }).map_err(to_py_err)
    }

    pub fn to_json(&self) -> String { self.inner.to_json_string() }

    pub fn add_construct(&mut self, name: &str, indicators: Vec<String>) {
        self.inner.add_construct(name, indicators);
    }

    pub fn set_indicators(&mut self, name: &str, indicators: Vec<String>) -> PyResult<()> {
        self.inner.set_indicators(name, indicators).map_err(to_py_err)
    }

    pub fn remove_indicator(&mut self, construct: &str, indicator: &str) -> PyResult<bool> {
        self.inner.remove_indicator(construct, indicator).map_err(to_py_err)
    }

    pub fn rename_construct(&mut self, old: &str, new: &str) -> PyResult<()> {
        self.inner.rename_construct(old, new).map_err(to_py_err)
    }

    pub fn remove_construct(&mut self, name: &str) -> bool { self.inner.remove_construct(name) }
    pub fn add_path(&mut self, source: &str, target: &str) -> bool { self.inner.add_path(source, target) }
    pub fn remove_path(&mut self, source: &str, target: &str) -> bool { self.inner.remove_path(source, target) }
    pub fn revision(&self) -> u64 { self.inner.revision }

    /// Raises `ValueError` listing every problem of the definition.
    pub fn validate(&self) -> PyResult<()> {
        PathModel::build(&self.inner).map(|_| ()).map_err(to_py_err)
    }
}

/// Holds the last snapshot so Python can pull JSON or the text report.
#[pyclass(name = "_Snapshot")]
#[derive(Debug, Clone)]
pub struct PySnapshot {
    inner: AnalysisSnapshot,
}

#[pymethods]
impl PySnapshot {
    pub fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner).map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    pub fn report(&self) -> String { report::format_report(&self.inner) }

    pub fn coefficient(&self, source: &str, target: &str) -> Option<f64> { self.inner.coefficient(source, target) }
}

#[pyfunction]
#[pyo3(signature = (spec, header, rows, config_json=None))]
fn run_analysis(
    spec: &PyModelSpec,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    config_json: Option<&str>,
) -> PyResult<PySnapshot> {
    let config = match config_json {
        Some(json) => AnalysisConfig::from_json_str(json).map_err(to_py_err)?,
        None => AnalysisConfig::default(),
    };
    let header: Vec<&str> = header.iter().map(String::as_str).collect();
    let table = DataTable::from_text_rows(&header, rows).map_err(to_py_err)?;
    let model = PathModel::build(&spec.inner).map_err(to_py_err)?;
    let snapshot = PathAnalysis::new(Arc::new(model), config)
        .and_then(|analysis| analysis.run(&table))
        .map_err(to_py_err)?;
    Ok(PySnapshot { inner: snapshot })
}

/// Header and rows of a random Likert questionnaire for the model.
#[pyfunction]
fn likert_template(spec: &PyModelSpec, respondents: usize, seed: u64) -> PyResult<(Vec<String>, Vec<Vec<f64>>)> {
    let model = PathModel::build(&spec.inner).map_err(to_py_err)?;
    let table = synthetic::likert_template(respondents, &model, seed).map_err(to_py_err)?;
    let header = table.header().to_vec();
    let rows = (0..table.row_count())
        .map(|r| header.iter().filter_map(|h| table.column(h).map(|c| c[r])).collect())
        .collect();
    Ok((header, rows))
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyModelSpec>()?;
    m.add_class::<PySnapshot>()?;
    m.add_function(wrap_pyfunction!(run_analysis, m)?)?;
    m.add_function(wrap_pyfunction!(likert_template, m)?)?;
    Ok(())
}
