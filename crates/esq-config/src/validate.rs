//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::{collections::BTreeSet, fmt};

use esq_compile::Precondition;
use serde_json::Value;

use crate::{Config, FieldConfig};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// No fields are defined.
    NoFieldsDefined,
    /// A field uses a placeholder no parameter defines.
    UnresolvedPlaceholder {
        /// Name of the field.
        field: String,
        /// Placeholder name, without braces.
        placeholder: String,
    },
    /// A parameter is defined but no field uses it.
    UnusedParameter {
        /// Name of the parameter.
        name: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFieldsDefined => {
                write!(f, "no fields are defined in configuration")
            }
            Self::UnresolvedPlaceholder { field, placeholder } => {
                write!(
                    f,
                    "field '{field}' uses placeholder '{{{placeholder}}}' but no such parameter is defined"
                )
            }
            Self::UnusedParameter { name } => {
                write!(f, "parameter '{name}' is not used by any field")
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
///
/// This checks for:
/// - Empty configuration (no fields defined)
/// - Placeholders no parameter resolves
/// - Parameters no field uses
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    if config.fields.is_empty() {
        return vec![ConfigWarning::NoFieldsDefined];
    }

    let mut warnings = Vec::new();
    let mut used = BTreeSet::new();

    for field in &config.fields {
        let names: BTreeSet<String> = templates(field)
            .iter()
            .flat_map(|template| placeholders(template))
            .map(str::to_string)
            .collect();
        for name in names {
            if !config.params.contains_key(&name) {
                warnings.push(ConfigWarning::UnresolvedPlaceholder {
                    field: field.name.clone(),
                    placeholder: name.clone(),
                });
            }
            used.insert(name);
        }
    }

    for name in config.params.keys() {
        if !used.contains(name) {
            warnings.push(ConfigWarning::UnusedParameter { name: name.clone() });
        }
    }

    warnings
}

/// Returns every string of a field that placeholders are substituted into.
fn templates(field: &FieldConfig) -> Vec<String> {
    let mut templates = vec![field.property.clone()];
    templates.extend(field.nesting.iter().map(|level| level.path.clone()));
    templates.extend(field.join.iter().map(|level| level.child_type.clone()));
    for precondition in &field.preconditions {
        match precondition {
            Precondition::Value { values, .. } => {
                values.iter().for_each(|v| collect_strings(v, &mut templates));
            }
            Precondition::Query(query) => {
                for (key, value) in query {
                    templates.push(key.clone());
                    collect_strings(value, &mut templates);
                }
            }
        }
    }
    templates
}

/// Collects every string and object key inside a JSON value.
fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => {
            for (key, value) in map {
                out.push(key.clone());
                collect_strings(value, out);
            }
        }
        _ => {}
    }
}

/// Returns the names of all `{name}` placeholders in `text`.
fn placeholders(text: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        if close > 0 {
            names.push(&after[..close]);
        }
        rest = &after[close + 1..];
    }
    names
}
