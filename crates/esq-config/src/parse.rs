//! Configuration file parsing.
//!
//! Parses individual `.esq.toml` files into intermediate `RawConfig` structures
//! that keep every setting optional until the files are merged.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;
use toml::{Table, Value};

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// When true, stop discovery here and ignore parent and global configs.
    pub root: Option<bool>,
    /// Template parameters substituted into mappings.
    pub params: Option<BTreeMap<String, String>>,
    /// Field definitions: name -> mapping.
    pub field: Option<BTreeMap<String, RawField>>,
}

/// Raw field mapping from TOML.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawField {
    /// Backend property path, may contain `{param}` placeholders.
    pub property: String,
    /// Nested-object paths, outermost first. A single path may be given
    /// without an array.
    #[serde(default)]
    #[serde_as(as = "OneOrMany<_>")]
    pub nested: Vec<String>,
    /// Parent/child types, outermost first.
    #[serde(default)]
    #[serde_as(as = "OneOrMany<_>")]
    pub join: Vec<String>,
    /// Keys merged into the `nested` wrapper, by nested path.
    pub nested_options: Option<BTreeMap<String, Table>>,
    /// Keys merged into the `has_child` wrapper, by child type.
    pub join_options: Option<BTreeMap<String, Table>>,
    /// Value converter applied to every value.
    pub converter: Option<ConverterName>,
    /// Backend fragments merged into the field's queries and sort entry.
    pub options: Option<RawOptions>,
    /// Fixed constraints applied with every clause of the field.
    pub precondition: Option<Vec<RawPrecondition>>,
}

/// Built-in value converters selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterName {
    /// Lowercases string values.
    Lowercase,
}

/// Raw field options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawOptions {
    /// Merged into every query built for the field.
    pub query: Option<Table>,
    /// Merged into the field's sort entry.
    pub sort: Option<Table>,
}

/// Raw precondition: either `field` + `value`, or `query`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawPrecondition {
    /// Field whose mapping applies to `value`.
    pub field: Option<String>,
    /// One value, or an array of values (any of which must hold).
    pub value: Option<Value>,
    /// Fixed sub-query.
    pub query: Option<Table>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.root.is_none());
        assert!(config.params.is_none());
        assert!(config.field.is_none());
    }

    #[test]
    fn test_parses_minimal_field() {
        let config = parse_config(
            r#"
[field.price]
property = "price"
"#,
        )
        .unwrap();
        let fields = config.field.unwrap();
        let price = &fields["price"];
        assert_eq!(price.property, "price");
        assert!(price.nested.is_empty());
        assert!(price.join.is_empty());
        assert!(price.converter.is_none());
        assert!(price.precondition.is_none());
    }

    #[test]
    fn test_parses_levels_as_one_or_many() {
        let config = parse_config(
            r#"
[field.size]
property = "variants.stock.size"
nested = ["variants", "variants.stock"]
join = "offer"
converter = "lowercase"
nested_options."variants.stock" = { score_mode = "max" }
"#,
        )
        .unwrap();
        let fields = config.field.unwrap();
        let size = &fields["size"];

        assert_eq!(size.nested, vec!["variants", "variants.stock"]);
        assert_eq!(size.join, vec!["offer"]);
        assert_eq!(size.converter, Some(ConverterName::Lowercase));
        let nested_options = size.nested_options.as_ref().unwrap();
        assert_eq!(
            nested_options["variants.stock"]["score_mode"].as_str(),
            Some("max")
        );
        assert!(size.join_options.is_none());
    }

    #[test]
    fn test_parses_join_and_field_options() {
        let config = parse_config(
            r#"
[field.price]
property = "amount"
join = "offer"

[field.price.join_options.offer]
score_mode = "min"

[field.price.options.query]
range = { amount = { boost = 2.0 } }

[field.price.options.sort]
missing = "_last"
"#,
        )
        .unwrap();
        let fields = config.field.unwrap();
        let price = &fields["price"];

        let join_options = price.join_options.as_ref().unwrap();
        assert_eq!(join_options["offer"]["score_mode"].as_str(), Some("min"));
        let field_options = price.options.as_ref().unwrap();
        assert!(field_options.query.as_ref().unwrap().contains_key("range"));
        assert_eq!(
            field_options.sort.as_ref().unwrap()["missing"].as_str(),
            Some("_last")
        );
    }

    #[test]
    fn test_parses_preconditions() {
        let config = parse_config(
            r#"
[params]
locale = "en"

[field.title]
property = "title.{locale}"

[[field.title.precondition]]
field = "lang"
value = "{locale}"

[[field.title.precondition]]
query = { exists = { field = "title" } }
"#,
        )
        .unwrap();
        assert_eq!(config.params.unwrap()["locale"], "en");
        let fields = config.field.unwrap();
        let preconditions = fields["title"].precondition.as_ref().unwrap();
        assert_eq!(preconditions.len(), 2);
        assert_eq!(preconditions[0].field.as_deref(), Some("lang"));
        assert_eq!(preconditions[0].value.as_ref().unwrap().as_str(), Some("{locale}"));
        assert!(preconditions[1].query.as_ref().unwrap().contains_key("exists"));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(parse_config("[field.a]\nproperty = \"a\"\nnest = \"x\"\n").is_err());
        assert!(parse_config("[settings]\nlimit = 3\n").is_err());
    }

    #[test]
    fn test_rejects_field_without_property() {
        assert!(parse_config("[field.a]\nnested = \"x\"\n").is_err());
    }

    #[test]
    fn test_parse_error_carries_path() {
        let err = parse_config_str("[field.a", Path::new("/tmp/.esq.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().contains("/tmp/.esq.toml"));
    }
}
