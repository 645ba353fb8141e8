//! The central validator that orchestrates the execution of all model rules.
use super::error::ModelIssue;
use super::rules::{acyclicity, measurement, structure};
use crate::store::ModelSpec;

/// The orchestrator for model definition checks.
///
/// Like a linter, it collects every issue before "compilation" into a
/// `PathModel` rather than stopping at the first one.
pub struct ModelValidator<'a> {
    spec: &'a ModelSpec,
}

impl<'a> ModelValidator<'a> {
    pub fn new(spec: &'a ModelSpec) -> Self {
        Self { spec }
    }

    /// Executes all registered rules against the definition.
    ///
    /// # Returns
    /// - `Ok(())` if the definition is well formed.
    /// - `Err(Vec<ModelIssue>)` containing all issues discovered.
    pub fn validate(&self) -> Result<(), Vec<ModelIssue>> {
        let mut issues = Vec::new();
        issues.extend(measurement::validate_constructs(self.spec));
        issues.extend(structure::validate_paths(self.spec));
        // Cycle detection only considers edges the structure rule accepted.
        issues.extend(acyclicity::validate_acyclic(self.spec));

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ModelIssueKind;

    fn kinds(spec: &ModelSpec) -> Vec<ModelIssueKind> {
        ModelValidator::new(spec).validate().unwrap_err().into_iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_well_formed_definition_passes() {
        let spec = ModelSpec::new()
            .with_construct("A", ["a1", "a2"])
            .with_construct("B", ["b1", "b2"])
            .with_path("A", "B");
        assert!(ModelValidator::new(&spec).validate().is_ok());
    }

    #[test]
    fn test_collects_all_issues_in_one_pass() {
        let spec = ModelSpec::new()
            .with_construct("A", ["a1"])
            .with_construct("B", ["a1"])
            .with_path("A", "A")
            .with_path("A", "Ghost");
        let found = kinds(&spec);
        assert!(found.contains(&ModelIssueKind::DuplicateIndicator));
        assert!(found.contains(&ModelIssueKind::SelfLoop));
        assert!(found.contains(&ModelIssueKind::UndefinedConstruct));
    }

    #[test]
    fn test_two_node_cycle_is_reported_once() {
        let spec = ModelSpec::new()
            .with_construct("A", ["a1"])
            .with_construct("B", ["b1"])
            .with_path("A", "B")
            .with_path("B", "A");
        let issues = ModelValidator::new(&spec).validate().unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, ModelIssueKind::Cycle);
        assert_eq!(issues[0].subject, "A <-> B");
    }
}
