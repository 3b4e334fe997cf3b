//! Registration order and parameter overrides.
//!
//! A value precondition resolves its target when the field is registered, so
//! targets must be registered first.

use std::collections::{BTreeMap, BTreeSet};

use crate::{ConfigError, FieldConfig};

/// Parses a `key=value` parameter override.
pub fn parse_param(param: &str) -> Result<(String, String), ConfigError> {
    let invalid = || ConfigError::InvalidParameter {
        param: param.to_string(),
    };
    let (key, value) = param.split_once('=').ok_or_else(invalid)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid());
    }
    Ok((key.to_string(), value.to_string()))
}

/// Orders fields so every precondition target precedes the fields using it.
///
/// Fields are otherwise visited in the order given.
pub fn registration_order(fields: &[FieldConfig]) -> Result<Vec<&FieldConfig>, ConfigError> {
    let by_name: BTreeMap<&str, &FieldConfig> =
        fields.iter().map(|field| (field.name.as_str(), field)).collect();

    let mut traversal = Traversal {
        by_name,
        done: BTreeSet::new(),
        path: Vec::new(),
        sorted: Vec::with_capacity(fields.len()),
    };
    for field in fields {
        traversal.visit(field)?;
    }
    Ok(traversal.sorted)
}

/// Depth-first traversal state.
struct Traversal<'a> {
    /// Every field by name.
    by_name: BTreeMap<&'a str, &'a FieldConfig>,
    /// Fields already placed.
    done: BTreeSet<&'a str>,
    /// Fields on the current traversal path.
    path: Vec<&'a str>,
    /// Placed fields, targets first.
    sorted: Vec<&'a FieldConfig>,
}

impl<'a> Traversal<'a> {
    /// Places `field` after all of its precondition targets.
    fn visit(&mut self, field: &'a FieldConfig) -> Result<(), ConfigError> {
        let name = field.name.as_str();
        if self.done.contains(name) {
            return Ok(());
        }
        if let Some(start) = self.path.iter().position(|&n| n == name) {
            let mut cycle: Vec<String> = self.path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(name.to_string());
            return Err(ConfigError::PreconditionCycle { cycle });
        }

        self.path.push(name);
        for target in field.precondition_targets() {
            let target_field =
                self.by_name
                    .get(target)
                    .copied()
                    .ok_or_else(|| ConfigError::UndefinedField {
                        field: name.to_string(),
                        target: target.to_string(),
                    })?;
            self.visit(target_field)?;
        }
        self.path.pop();

        self.done.insert(name);
        self.sorted.push(field);
        Ok(())
    }
}
