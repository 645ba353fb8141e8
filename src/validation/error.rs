//! Defines the issue types reported by the model validator.
use serde::Serialize;
use std::fmt;

/// The specific category of a model definition issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ModelIssueKind {
    /// A path whose source and target are the same construct.
    SelfLoop,
    /// A path endpoint that names no defined construct.
    UndefinedConstruct,
    /// Two or more constructs that reach each other through the paths.
    Cycle,
    /// The same construct name declared twice.
    DuplicateConstruct,
    /// The same (source, target) pair declared twice.
    DuplicatePath,
    /// An indicator column assigned to more than one construct.
    DuplicateIndicator,
    /// A blank construct or indicator name.
    EmptyName,
    /// The definition could not be parsed at all.
    Malformed,
}

/// A structured issue report from the model validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelIssue {
    /// The category of the issue.
    pub kind: ModelIssueKind,
    /// The construct, path or indicator the issue is about (e.g. `"A -> B"`).
    pub subject: String,
    /// A human-readable message explaining the issue.
    pub message: String,
}

impl ModelIssue {
    pub fn new(kind: ModelIssueKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind, subject: subject.into(), message: message.into() }
    }
}

impl fmt::Display for ModelIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}
