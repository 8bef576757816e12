//! The three state containers of the workbench, each keyed by function name.
//!
//! Updates take the container by value and hand back the new one, so every
//! transition can be tested without a running server.

use crate::descriptor::FunctionDescriptor;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct FunctionList {
    functions: Vec<FunctionDescriptor>,
}

impl FunctionList {
    /// Replaces the list wholesale.
    pub fn replace(self, functions: Vec<FunctionDescriptor>) -> Self {
        Self { functions }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionDescriptor> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct InputState {
    values: BTreeMap<String, HashMap<String, String>>,
}

impl InputState {
    pub fn set_parameter_value(
        mut self,
        function_name: &str,
        parameter_name: &str,
        value: impl Into<String>,
    ) -> Self {
        self.values
            .entry(function_name.to_string())
            .or_default()
            .insert(parameter_name.to_string(), value.into());
        self
    }

    pub fn values_for(&self, function_name: &str) -> Option<&HashMap<String, String>> {
        self.values.get(function_name)
    }

    /// Absent entries read as the empty string.
    pub fn value(&self, function_name: &str, parameter_name: &str) -> &str {
        self.values
            .get(function_name)
            .and_then(|params| params.get(parameter_name))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ResultState {
    results: BTreeMap<String, String>,
}

impl ResultState {
    pub fn store(mut self, function_name: &str, serialized: String) -> Self {
        self.results.insert(function_name.to_string(), serialized);
        self
    }

    pub fn get(&self, function_name: &str) -> Option<&str> {
        self.results.get(function_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

/// Hands out per-function invocation numbers so that only the response to the
/// most recently issued request of a function gets applied.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    issued: HashMap<String, u64>,
}

impl RequestSequencer {
    pub fn next(&mut self, function_name: &str) -> u64 {
        let counter = self.issued.entry(function_name.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    pub fn is_latest(&self, function_name: &str, sequence: u64) -> bool {
        self.issued.get(function_name).copied() == Some(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_state_isolation() {
        let inputs = InputState::default()
            .set_parameter_value("A", "x", "1")
            .set_parameter_value("B", "x", "2");
        assert_eq!(inputs.value("A", "x"), "1");
        assert_eq!(inputs.value("B", "x"), "2");
    }

    #[test]
    fn test_input_state_overwrite_keeps_other_parameters() {
        let inputs = InputState::default()
            .set_parameter_value("A", "x", "1")
            .set_parameter_value("A", "y", "2")
            .set_parameter_value("A", "x", "3");
        assert_eq!(inputs.value("A", "x"), "3");
        assert_eq!(inputs.value("A", "y"), "2");
    }

    #[test]
    fn test_input_state_absent_reads_empty() {
        let inputs = InputState::default();
        assert_eq!(inputs.value("A", "x"), "");
        assert!(inputs.values_for("A").is_none());
    }

    #[test]
    fn test_result_state_store_only_touches_own_slot() {
        let before = ResultState::default()
            .store("A", "1".to_string())
            .store("B", r#"{"k":"v"}"#.to_string());
        let after = before.clone().store("A", "2".to_string());
        assert_eq!(after.get("A"), Some("2"));
        assert_eq!(after.get("B"), before.get("B"));
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_function_list_replace_is_idempotent() {
        let payload = vec![
            FunctionDescriptor::new("a", "/api/a/{x}"),
            FunctionDescriptor::new("b", "/api/b"),
        ];
        let once = FunctionList::default().replace(payload.clone());
        let twice = once.clone().replace(payload);
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 2);
        assert_eq!(twice.get("a").unwrap().parameters, vec!["x"]);
        assert!(twice.get("c").is_none());
    }

    #[test]
    fn test_request_sequencer() {
        let mut sequencer = RequestSequencer::default();
        let first = sequencer.next("A");
        let second = sequencer.next("A");
        let other = sequencer.next("B");
        assert!(!sequencer.is_latest("A", first));
        assert!(sequencer.is_latest("A", second));
        assert!(sequencer.is_latest("B", other));
        assert!(!sequencer.is_latest("C", 1));
    }
}
