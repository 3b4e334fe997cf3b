//! Field mapping configuration for esq.
//!
//! Mappings live in TOML files named `.esq.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory,
//! collecting any `.esq.toml` files found, then loading `~/.esq.toml` as the
//! global config with lowest precedence.
//!
//! A loaded [`Config`] turns into a [`FieldRegistry`] (and from there a
//! [`QueryCompiler`]) with [`Config::build_registry`].

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod registry;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
use esq_compile::{
    FieldDefinition, FieldOptions, FieldRegistry, JoinLevel, LowercaseConverter, NestingLevel,
    Parameters, Precondition, QueryCompiler,
};
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    ConverterName, RawConfig, RawField, RawOptions, RawPrecondition, parse_config_file,
    parse_config_str,
};
pub use registry::parse_param;
use registry::registration_order;
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Top-level merged configuration.
///
/// This represents the fully resolved configuration after merging all
/// discovered `.esq.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Template parameters, by name.
    pub params: BTreeMap<String, String>,
    /// Field mappings, sorted by name.
    pub fields: Vec<FieldConfig>,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.esq.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Returns the field with the given name.
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns the configured parameters with `overrides` applied on top.
    pub fn parameters(&self, overrides: &[(String, String)]) -> Parameters {
        let mut params = self.params.clone();
        params.extend(overrides.iter().cloned());
        Parameters::from(params)
    }

    /// Builds a registry holding every configured field.
    ///
    /// Fields are registered alphabetically, except that precondition targets
    /// are registered before the fields referencing them.
    pub fn build_registry(
        &self,
        overrides: &[(String, String)],
    ) -> Result<FieldRegistry, ConfigError> {
        let mut registry = FieldRegistry::with_parameters(self.parameters(overrides));
        for field in registration_order(&self.fields)? {
            registry.register(field.definition())?;
        }
        Ok(registry)
    }

    /// Builds a compiler over [`build_registry`](Self::build_registry).
    pub fn compiler(&self, overrides: &[(String, String)]) -> Result<QueryCompiler, ConfigError> {
        Ok(QueryCompiler::new(self.build_registry(overrides)?))
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - Empty configuration (no fields defined)
    /// - Placeholders no parameter resolves
    /// - Parameters no field uses
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }
}

/// One configured field mapping, before parameter substitution.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Logical field name.
    pub name: String,
    /// Property path template.
    pub property: String,
    /// Nested-object levels, outermost first.
    pub nesting: Vec<NestingLevel>,
    /// Parent/child levels, outermost first.
    pub join: Vec<JoinLevel>,
    /// Built-in value converter.
    pub converter: Option<ConverterName>,
    /// Query and sort options.
    pub options: FieldOptions,
    /// Declared preconditions.
    pub preconditions: Vec<Precondition>,
    /// Config file defining the field.
    pub source: PathBuf,
}

impl FieldConfig {
    /// Returns the compiler definition of the field.
    pub fn definition(&self) -> FieldDefinition {
        let mut definition = FieldDefinition::new(&self.name, &self.property)
            .options(self.options.clone());
        for level in &self.nesting {
            definition = definition.nested_level(level.clone());
        }
        for level in &self.join {
            definition = definition.join_level(level.clone());
        }
        for precondition in &self.preconditions {
            definition = definition.precondition(precondition.clone());
        }
        match self.converter {
            Some(ConverterName::Lowercase) => definition.value_converter(LowercaseConverter),
            None => definition,
        }
    }

    /// Returns the fields this field's preconditions reference.
    pub fn precondition_targets(&self) -> impl Iterator<Item = &str> {
        self.preconditions
            .iter()
            .filter_map(|precondition| match precondition {
                Precondition::Value { field, .. } => Some(field.as_str()),
                Precondition::Query(_) => None,
            })
    }
}
