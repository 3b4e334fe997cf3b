//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules and converting TOML fragments into query
//! documents.

use std::{
    collections::{BTreeMap, btree_map::Entry},
    path::{Path, PathBuf},
};

use esq_compile::{Document, FieldOptions, JoinLevel, NestingLevel, Precondition};
use serde_json::{Number, Value as JsonValue};
use toml::{Table, Value};

use crate::{
    Config, ConfigError, FieldConfig,
    parse::{RawConfig, RawField, RawPrecondition},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first
/// (closest to CWD), lowest precedence last (global config).
///
/// Merge rules:
/// - Params: merged by name, first definition wins
/// - Fields: merged by name, first definition wins completely
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let mut params = BTreeMap::new();
    let mut fields = BTreeMap::new();

    for parsed in configs {
        for (name, value) in parsed.config.params.iter().flatten() {
            params.entry(name.clone()).or_insert_with(|| value.clone());
        }

        for (name, raw) in parsed.config.field.iter().flatten() {
            if let Entry::Vacant(entry) = fields.entry(name.clone()) {
                entry.insert(convert_field(name, raw, &parsed.path)?);
            }
        }
    }

    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(Path::to_path_buf);

    Ok(Config {
        params,
        fields: fields.into_values().collect(),
        config_root,
    })
}

/// Converts a raw field into its resolved form.
fn convert_field(name: &str, raw: &RawField, source: &Path) -> Result<FieldConfig, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidField {
        field: name.to_string(),
        path: source.to_path_buf(),
        message,
    };

    if raw.property.trim().is_empty() {
        return Err(invalid("property is empty".into()));
    }

    let nested_options = raw.nested_options.clone().unwrap_or_default();
    if let Some(path) = nested_options.keys().find(|path| !raw.nested.contains(path)) {
        return Err(invalid(format!("nested_options for undeclared path '{path}'")));
    }
    let join_options = raw.join_options.clone().unwrap_or_default();
    if let Some(child) = join_options.keys().find(|child| !raw.join.contains(child)) {
        return Err(invalid(format!("join_options for undeclared type '{child}'")));
    }

    let nesting = raw
        .nested
        .iter()
        .map(|path| NestingLevel {
            path: path.clone(),
            options: nested_options.get(path).map(to_document).unwrap_or_default(),
        })
        .collect();
    let join = raw
        .join
        .iter()
        .map(|child| JoinLevel {
            child_type: child.clone(),
            options: join_options.get(child).map(to_document).unwrap_or_default(),
        })
        .collect();

    let options = raw
        .options
        .as_ref()
        .map(|options| FieldOptions {
            query: options.query.as_ref().map(to_document).unwrap_or_default(),
            sort: options.sort.as_ref().map(to_document).unwrap_or_default(),
        })
        .unwrap_or_default();

    let preconditions = raw
        .precondition
        .iter()
        .flatten()
        .map(|precondition| convert_precondition(precondition).map_err(&invalid))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(FieldConfig {
        name: name.to_string(),
        property: raw.property.clone(),
        nesting,
        join,
        converter: raw.converter,
        options,
        preconditions,
        source: source.to_path_buf(),
    })
}

/// Converts a raw precondition, describing what is wrong on failure.
fn convert_precondition(raw: &RawPrecondition) -> Result<Precondition, String> {
    match (&raw.field, &raw.value, &raw.query) {
        (Some(field), Some(value), None) => {
            let values = match value {
                Value::Array(values) => values.iter().map(to_json).collect(),
                single => vec![to_json(single)],
            };
            Ok(Precondition::value(field.clone(), values))
        }
        (None, None, Some(query)) => Ok(Precondition::Query(to_document(query))),
        (Some(field), None, None) => Err(format!("precondition on '{field}' has no value")),
        _ => Err("precondition needs either field and value, or query".into()),
    }
}

/// Converts a TOML table into a query document.
fn to_document(table: &Table) -> Document {
    table
        .iter()
        .map(|(key, value)| (key.clone(), to_json(value)))
        .collect()
}

/// Converts a TOML value into JSON. Datetimes become strings.
fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Datetime(dt) => JsonValue::String(dt.to_string()),
        Value::Array(values) => JsonValue::Array(values.iter().map(to_json).collect()),
        Value::Table(table) => JsonValue::Object(to_document(table)),
    }
}
