//! Rule for the measurement side: unique construct names, and every indicator
//! column assigned to exactly one construct.

use crate::store::ModelSpec;
use crate::validation::error::{ModelIssue, ModelIssueKind};
use std::collections::HashMap;

pub(crate) fn validate_constructs(spec: &ModelSpec) -> Vec<ModelIssue> {
    let mut issues = Vec::new();
    let mut construct_names: HashMap<&str, usize> = HashMap::new();
    let mut owners: HashMap<&str, &str> = HashMap::new();

    for construct in &spec.constructs {
        let name = construct.name.as_str();
        if name.trim().is_empty() {
            issues.push(ModelIssue::new(ModelIssueKind::EmptyName, "<unnamed>", "construct name is blank"));
        }
        let seen = construct_names.entry(name).or_insert(0);
        *seen += 1;
        if *seen == 2 {
            issues.push(ModelIssue::new(ModelIssueKind::DuplicateConstruct, name, "construct is declared more than once"));
        }

        for indicator in &construct.indicators {
            if indicator.trim().is_empty() {
                issues.push(ModelIssue::new(ModelIssueKind::EmptyName, name, "indicator name is blank"));
                continue;
            }
            if let Some(owner) = owners.insert(indicator.as_str(), name) {
                issues.push(ModelIssue::new(
                    ModelIssueKind::DuplicateIndicator,
                    indicator.as_str(),
                    format!("indicator is assigned to both '{}' and '{}'", owner, name),
                ));
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_indicator_names_both_owners() {
        let spec = ModelSpec::new().with_construct("A", ["x1"]).with_construct("B", ["x1", "b2"]);
        let issues = validate_constructs(&spec);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, ModelIssueKind::DuplicateIndicator);
        assert_eq!(issues[0].message, "indicator is assigned to both 'A' and 'B'");
    }

    #[test]
    fn test_repeated_construct_reported_once() {
        let spec = ModelSpec::new()
            .with_construct("A", ["a1"])
            .with_construct("A", ["a2"])
            .with_construct("A", ["a3"]);
        let issues = validate_constructs(&spec);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, ModelIssueKind::DuplicateConstruct);
    }
}
