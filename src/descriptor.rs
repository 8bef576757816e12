use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

/// One entry of the discovery response. Fields other than `name` and `path`
/// are ignored.
#[derive(Deserialize, Debug, Clone)]
pub struct StepEntry {
    pub name: String,
    pub path: String,
}

/// A remote function the workbench can invoke.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub path_template: String,
    /// `{...}` tokens of `path_template`, left to right, duplicates included.
    pub parameters: Vec<String>,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, path_template: impl Into<String>) -> Self {
        let path_template = path_template.into();
        let parameters = extract_parameters(&path_template);
        Self {
            name: name.into(),
            path_template,
            parameters,
        }
    }

    /// Parameter names with duplicates collapsed, in order of first appearance.
    /// This is what the dashboard renders as input fields.
    pub fn distinct_parameters(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for param in &self.parameters {
            if !seen.contains(&param.as_str()) {
                seen.push(param.as_str());
            }
        }
        seen
    }
}

impl From<StepEntry> for FunctionDescriptor {
    fn from(entry: StepEntry) -> Self {
        FunctionDescriptor::new(entry.name, entry.path)
    }
}

pub fn extract_parameters(path_template: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(path_template)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Result of filling a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutedPath {
    pub path: String,
    /// Parameters with no collected value; they were substituted as "".
    pub missing: Vec<String>,
}

/// Replaces the first occurrence of `{param}` for each parameter of the
/// descriptor, in order. With `encode` set the values are URL-component
/// encoded, otherwise they are inserted verbatim.
pub fn substitute_path(
    descriptor: &FunctionDescriptor,
    values: Option<&HashMap<String, String>>,
    encode: bool,
) -> SubstitutedPath {
    let mut path = descriptor.path_template.clone();
    let mut missing = Vec::new();

    for param in &descriptor.parameters {
        let value = match values.and_then(|v| v.get(param)) {
            Some(value) => value.as_str(),
            None => {
                if !missing.contains(param) {
                    missing.push(param.clone());
                }
                ""
            }
        };
        let replacement = if encode {
            urlencoding::encode(value).into_owned()
        } else {
            value.to_string()
        };
        path = path.replacen(&format!("{{{}}}", param), &replacement, 1);
    }

    SubstitutedPath { path, missing }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_parameters() {
        assert_eq!(
            extract_parameters("/users/{id}/orders/{orderId}"),
            vec!["id", "orderId"]
        );
        assert_eq!(extract_parameters("/api/steps"), Vec::<String>::new());
        assert_eq!(extract_parameters("/api/flow/run/{a}/{b}/{a}"), vec!["a", "b", "a"]);
        // Empty braces are not a placeholder.
        assert_eq!(extract_parameters("/x/{}/{y}"), vec!["y"]);
    }

    #[test]
    fn test_distinct_parameters() {
        let descriptor = FunctionDescriptor::new("f", "/f/{a}/{b}/{a}");
        assert_eq!(descriptor.parameters, vec!["a", "b", "a"]);
        assert_eq!(descriptor.distinct_parameters(), vec!["a", "b"]);
    }

    #[test]
    fn test_step_entry_ignores_extra_fields() {
        let entry: StepEntry = serde_json::from_str(
            r#"{"name": "summarize", "path": "/api/flow/summarize/{url}", "tags": ["x"]}"#,
        )
        .unwrap();
        let descriptor = FunctionDescriptor::from(entry);
        assert_eq!(descriptor.name, "summarize");
        assert_eq!(descriptor.parameters, vec!["url"]);
    }

    #[test]
    fn test_substitute_single_parameter() {
        let descriptor = FunctionDescriptor::new("item", "/items/{id}");
        let result = substitute_path(&descriptor, Some(&values(&[("id", "42")])), true);
        assert_eq!(result.path, "/items/42");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_substitute_in_order() {
        let descriptor = FunctionDescriptor::new("order", "/users/{id}/orders/{orderId}");
        let result = substitute_path(
            &descriptor,
            Some(&values(&[("id", "7"), ("orderId", "99")])),
            false,
        );
        assert_eq!(result.path, "/users/7/orders/99");
    }

    #[test]
    fn test_substitute_duplicate_placeholder_uses_same_value() {
        let descriptor = FunctionDescriptor::new("pair", "/pair/{x}/{x}");
        let result = substitute_path(&descriptor, Some(&values(&[("x", "1")])), false);
        assert_eq!(result.path, "/pair/1/1");
    }

    #[test]
    fn test_substitute_encoding() {
        let descriptor = FunctionDescriptor::new("echo", "/echo/{text}");
        let input = values(&[("text", "a b/c")]);
        assert_eq!(substitute_path(&descriptor, Some(&input), true).path, "/echo/a%20b%2Fc");
        assert_eq!(substitute_path(&descriptor, Some(&input), false).path, "/echo/a b/c");
    }

    #[test]
    fn test_substitute_missing_values() {
        let descriptor = FunctionDescriptor::new("order", "/users/{id}/orders/{orderId}");
        let result = substitute_path(&descriptor, Some(&values(&[("id", "7")])), true);
        assert_eq!(result.path, "/users/7/orders/");
        assert_eq!(result.missing, vec!["orderId"]);

        let result = substitute_path(&descriptor, None, true);
        assert_eq!(result.path, "/users//orders/");
        assert_eq!(result.missing, vec!["id", "orderId"]);
    }
}
