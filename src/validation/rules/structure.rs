//! Rule for structural path endpoints.

use crate::store::ModelSpec;
use crate::validation::error::{ModelIssue, ModelIssueKind};
use std::collections::HashSet;

/// Every path must join two distinct, defined constructs, and appear once.
pub(crate) fn validate_paths(spec: &ModelSpec) -> Vec<ModelIssue> {
    let defined: HashSet<&str> = spec.constructs.iter().map(|c| c.name.as_str()).collect();
    let mut seen = HashSet::new();
    let mut issues = Vec::new();

    for (source, target) in &spec.paths {
        let subject = format!("{} -> {}", source, target);

        if source == target {
            issues.push(ModelIssue::new(
                ModelIssueKind::SelfLoop,
                subject.clone(),
                "a construct cannot be a cause of itself",
            ));
        }
        for endpoint in [source, target] {
            if !defined.contains(endpoint.as_str()) {
                issues.push(ModelIssue::new(
                    ModelIssueKind::UndefinedConstruct,
                    subject.clone(),
                    format!("'{}' is not a defined construct", endpoint),
                ));
            }
        }
        if !seen.insert((source.as_str(), target.as_str())) {
            issues.push(ModelIssue::new(ModelIssueKind::DuplicatePath, subject, "path is declared more than once"));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_endpoint_names_the_construct() {
        let spec = ModelSpec::new().with_construct("A", ["a1"]).with_path("A", "Q");
        let issues = validate_paths(&spec);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].subject, "A -> Q");
        assert!(issues[0].message.contains("'Q'"));
    }

    #[test]
    fn test_duplicate_path_detected() {
        let mut spec = ModelSpec::new().with_construct("A", ["a1"]).with_construct("B", ["b1"]);
        spec.paths = vec![("A".into(), "B".into()), ("A".into(), "B".into())];
        let issues = validate_paths(&spec);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, ModelIssueKind::DuplicatePath);
    }
}
