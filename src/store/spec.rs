//! spec.rs
//! The editable model definition. Model-editing collaborators mutate a
//! `ModelSpec`; an analysis run only ever sees the `PathModel` compiled from it.

use super::types::LatentConstruct;
use crate::error::{AnalysisError, Result};
use crate::validation::{ModelIssue, ModelIssueKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub constructs: Vec<LatentConstruct>,
    /// Structural paths as (source, target) construct names, in declaration order.
    #[serde(default)]
    pub paths: Vec<(String, String)>,
    /// Bumped on every edit so results can be tied to the model version.
    #[serde(default)]
    pub revision: u64,
}

impl ModelSpec {
    pub fn new() -> Self { Self::default() }

    /// Parses a definition such as
    /// `{"constructs":[{"name":"A","indicators":["a1"]}],"paths":[["A","B"]]}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            AnalysisError::model(ModelIssue::new(ModelIssueKind::Malformed, "model", e.to_string()))
        })
    }

    pub fn to_json_string(&self) -> String {
        // A spec holds only strings and integers, so serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn with_construct<S: Into<String>>(mut self, name: &str, indicators: impl IntoIterator<Item = S>) -> Self {
        self.add_construct(name, indicators);
        self
    }

    pub fn with_path(mut self, source: &str, target: &str) -> Self {
        self.add_path(source, target);
        self
    }

    pub fn construct(&self, name: &str) -> Option<&LatentConstruct> {
        self.constructs.iter().find(|c| c.name == name)
    }

    pub fn add_construct<S: Into<String>>(&mut self, name: &str, indicators: impl IntoIterator<Item = S>) {
        self.constructs.push(LatentConstruct::new(name, indicators));
        self.revision += 1;
    }

    /// Replaces the indicator list of an existing construct.
    pub fn set_indicators<S: Into<String>>(&mut self, name: &str, indicators: impl IntoIterator<Item = S>) -> Result<()> {
        let indicators: Vec<String> = indicators.into_iter().map(Into::into).collect();
        if indicators.is_empty() {
            return Err(AnalysisError::EmptyConstruct { construct: name.to_string() });
        }
        let construct = self.construct_mut(name)?;
        construct.indicators = indicators;
        self.revision += 1;
        Ok(())
    }

    /// Removes one indicator. A construct always keeps at least one indicator.
    pub fn remove_indicator(&mut self, construct: &str, indicator: &str) -> Result<bool> {
        let entry = self.construct_mut(construct)?;
        let Some(pos) = entry.indicators.iter().position(|i| i == indicator) else {
            return Ok(false);
        };
        if entry.indicators.len() == 1 {
            return Err(AnalysisError::EmptyConstruct { construct: construct.to_string() });
        }
        entry.indicators.remove(pos);
        self.revision += 1;
        Ok(true)
    }

    /// Renames a construct and rewrites every path that references it.
    pub fn rename_construct(&mut self, old: &str, new: &str) -> Result<()> {
        if old != new && self.construct(new).is_some() {
            return Err(AnalysisError::model(ModelIssue::new(
                ModelIssueKind::DuplicateConstruct,
                new,
                "a construct with this name already exists",
            )));
        }
        self.construct_mut(old)?.name = new.to_string();
        for (source, target) in &mut self.paths {
            if source == old { *source = new.to_string(); }
            if target == old { *target = new.to_string(); }
        }
        self.revision += 1;
        Ok(())
    }

    /// Removes a construct together with every path touching it.
    pub fn remove_construct(&mut self, name: &str) -> bool {
        let before = self.constructs.len();
        self.constructs.retain(|c| c.name != name);
        if self.constructs.len() == before {
            return false;
        }
        self.paths.retain(|(s, t)| s != name && t != name);
        self.revision += 1;
        true
    }

    /// Appends a path. Returns `false` if the identical path is already declared.
    pub fn add_path(&mut self, source: &str, target: &str) -> bool {
        if self.paths.iter().any(|(s, t)| s == source && t == target) {
            return false;
        }
        self.paths.push((source.to_string(), target.to_string()));
        self.revision += 1;
        true
    }

    pub fn remove_path(&mut self, source: &str, target: &str) -> bool {
        let before = self.paths.len();
        self.paths.retain(|(s, t)| !(s == source && t == target));
        let removed = self.paths.len() != before;
        if removed { self.revision += 1; }
        removed
    }

    /// Every indicator column named by the model, in declaration order.
    pub fn indicator_columns(&self) -> impl Iterator<Item = &str> {
        self.constructs.iter().flat_map(|c| c.indicators.iter().map(String::as_str))
    }

    fn construct_mut(&mut self, name: &str) -> Result<&mut LatentConstruct> {
        self.constructs.iter_mut().find(|c| c.name == name).ok_or_else(|| {
            AnalysisError::model(ModelIssue::new(
                ModelIssueKind::UndefinedConstruct,
                name,
                format!("'{}' is not a defined construct", name),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelSpec {
        ModelSpec::new()
            .with_construct("A", ["a1", "a2"])
            .with_construct("B", ["b1"])
            .with_path("A", "B")
    }

    #[test]
    fn test_every_edit_bumps_revision() {
        let mut spec = sample();
        let start = spec.revision;
        spec.set_indicators("B", ["b1", "b2"]).unwrap();
        spec.remove_indicator("A", "a2").unwrap();
        spec.rename_construct("A", "X").unwrap();
        assert_eq!(spec.revision, start + 3);
    }

    #[test]
    fn test_removing_last_indicator_is_rejected() {
        let mut spec = sample();
        let err = spec.remove_indicator("B", "b1").unwrap_err();
        assert_eq!(err, AnalysisError::EmptyConstruct { construct: "B".into() });
        assert_eq!(spec.construct("B").unwrap().indicators, vec!["b1".to_string()]);
    }

    #[test]
    fn test_rename_rewrites_paths() {
        let mut spec = sample();
        spec.rename_construct("B", "Outcome").unwrap();
        assert_eq!(spec.paths, vec![("A".to_string(), "Outcome".to_string())]);
    }

    #[test]
    fn test_remove_construct_drops_its_paths() {
        let mut spec = sample();
        assert!(spec.remove_construct("A"));
        assert!(spec.paths.is_empty());
    }

    #[test]
    fn test_duplicate_path_is_not_added_twice() {
        let mut spec = sample();
        assert!(!spec.add_path("A", "B"));
        assert_eq!(spec.paths.len(), 1);
    }

    #[test]
    fn test_json_round_trip_of_definition() {
        let json = r#"{"constructs":[{"name":"A","indicators":["a1","a2"]},{"name":"B","indicators":["b1"]}],"paths":[["A","B"]]}"#;
        let spec = ModelSpec::from_json_str(json).unwrap();
        assert_eq!(spec.paths, vec![("A".to_string(), "B".to_string())]);
        assert_eq!(spec.indicator_columns().collect::<Vec<_>>(), vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn test_malformed_json_is_a_model_definition_error() {
        let err = ModelSpec::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, AnalysisError::ModelDefinition { .. }));
    }
}
