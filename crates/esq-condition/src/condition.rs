//! Top-level search conditions.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{ConditionError, group::Group, order::Order};

/// A complete search condition.
///
/// The optional primary condition is logically ANDed with the root group; it
/// is typically set by the application (tenant scoping, visibility rules) while
/// the root comes from the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Condition {
    /// Root group.
    root: Group,
    /// Sort specification.
    order: Option<Order>,
    /// Condition always applied alongside the root.
    primary: Option<PrimaryCondition>,
}

/// A condition applied in addition to the user's root condition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrimaryCondition {
    /// Root group of the primary condition.
    root: Group,
    /// Sort specification of the primary condition.
    order: Option<Order>,
}

impl Condition {
    /// Creates a condition with the given root group.
    pub fn new(root: Group) -> Self {
        Self {
            root,
            order: None,
            primary: None,
        }
    }

    /// Sets the sort specification.
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the primary condition.
    pub fn with_primary(mut self, primary: PrimaryCondition) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Parses a condition from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConditionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a condition from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConditionError> {
        let contents = fs::read_to_string(path).map_err(|source| ConditionError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Returns the root group.
    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Returns the sort specification.
    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Returns the primary condition.
    pub fn primary(&self) -> Option<&PrimaryCondition> {
        self.primary.as_ref()
    }
}

impl PrimaryCondition {
    /// Creates a primary condition with the given root group.
    pub fn new(root: Group) -> Self {
        Self { root, order: None }
    }

    /// Sets the sort specification.
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Returns the root group.
    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Returns the sort specification.
    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }
}
