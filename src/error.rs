//! The error taxonomy shared by every stage of an analysis run.
use crate::validation::ModelIssue;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid model definition: {}", join_issues(.issues))]
    ModelDefinition { issues: Vec<ModelIssue> },
    #[error("Indicator columns missing from the data: {}", .missing.join(", "))]
    DataSchema { missing: Vec<String> },
    #[error("Only {respondents} complete respondents remain; the equation for '{construct}' needs at least {required}")]
    InsufficientData { construct: String, respondents: usize, required: usize },
    #[error("Construct '{construct}' has no valid indicators left")]
    EmptyConstruct { construct: String },
    #[error("Collinear predictors for '{construct}' (parents: {})", .parents.join(", "))]
    SingularDesign { construct: String, parents: Vec<String> },
    #[error("Analysis cancelled")]
    Cancelled,
    #[error("Malformed data table: {0}")]
    MalformedTable(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to read '{}': {message}", .path.display())]
    ConfigRead { path: PathBuf, message: String },
}

impl AnalysisError {
    pub(crate) fn model(issue: ModelIssue) -> Self {
        AnalysisError::ModelDefinition { issues: vec![issue] }
    }
}

fn join_issues(issues: &[ModelIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
