//! Template parameter substitution for mappings.
//!
//! Property paths and precondition values may contain `{name}` placeholders,
//! e.g. `title.{locale}`. They are substituted once, when a field is registered.

use std::{collections::BTreeMap, fmt};

use serde_json::Value;

/// Source of template parameter values.
pub trait ParameterSource: fmt::Debug + Send + Sync {
    /// Substitutes placeholders in `template`.
    ///
    /// Placeholders the source does not know are left as written.
    fn inject(&self, template: &str) -> String;

    /// Substitutes placeholders in every string of a sequence.
    fn inject_all(&self, templates: &[String]) -> Vec<String> {
        templates.iter().map(|t| self.inject(t)).collect()
    }
}

/// A parameter source that substitutes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParameters;

impl ParameterSource for NoParameters {
    fn inject(&self, template: &str) -> String {
        template.to_string()
    }
}

/// A map-backed parameter source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    /// Parameter values by name.
    values: BTreeMap<String, String>,
}

impl Parameters {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, returning the set.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Returns a parameter value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Iterates parameter names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl From<BTreeMap<String, String>> for Parameters {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

impl ParameterSource for Parameters {
    fn inject(&self, template: &str) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            result.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = &after[..close];
                    match self.get(name) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push('{');
                            result.push_str(name);
                            result.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }
}

/// Substitutes placeholders in every string inside a JSON value.
///
/// Object keys are substituted too, so property names inside a fixed
/// sub-query can be templated.
pub fn inject_value(source: &dyn ParameterSource, value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(source.inject(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| inject_value(source, v)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (source.inject(k), inject_value(source, v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Returns the first `{name}` placeholder left in `text`, if any.
pub fn find_placeholder(text: &str) -> Option<&str> {
    let open = text.find('{')?;
    let close = text[open..].find('}')?;
    let name = &text[open + 1..open + close];
    (!name.is_empty()).then_some(name)
}
