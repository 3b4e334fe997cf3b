//! Logical groups of field constraints.

use std::fmt;

use serde::Deserialize;

use crate::{ordered, values::ValueBag};

/// How the fields of a group combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logical {
    /// Every constraint must match.
    #[default]
    #[serde(alias = "AND")]
    And,
    /// At least one constraint must match.
    #[serde(alias = "OR")]
    Or,
}

impl fmt::Display for Logical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
        }
    }
}

/// A node of the condition tree.
///
/// Holds per-field value bags in declaration order (each field at most once)
/// and nested subgroups. A subgroup is always an atomic unit for its parent,
/// whatever the parent's own connective.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Group {
    /// Connective for the group's own constraints.
    logical: Logical,
    /// Field name to constraints, in declaration order.
    #[serde(deserialize_with = "ordered::deserialize")]
    fields: Vec<(String, ValueBag)>,
    /// Child groups.
    groups: Vec<Self>,
}

impl Group {
    /// Creates an empty group with the given connective.
    pub fn new(logical: Logical) -> Self {
        Self {
            logical,
            fields: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Creates an empty `AND` group.
    pub fn and() -> Self {
        Self::new(Logical::And)
    }

    /// Creates an empty `OR` group.
    pub fn or() -> Self {
        Self::new(Logical::Or)
    }

    /// Adds constraints for a field, returning the group.
    pub fn field(mut self, name: impl Into<String>, values: ValueBag) -> Self {
        self.add_field(name, values);
        self
    }

    /// Adds a subgroup, returning the group.
    pub fn group(mut self, group: Self) -> Self {
        self.groups.push(group);
        self
    }

    /// Adds constraints for a field.
    ///
    /// A field already present keeps its position and gains the new constraints.
    pub fn add_field(&mut self, name: impl Into<String>, values: ValueBag) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, bag)) => bag.extend(values),
            None => self.fields.push((name, values)),
        }
    }

    /// Returns the group's connective.
    pub fn logical(&self) -> Logical {
        self.logical
    }

    /// Iterates fields and their constraints in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ValueBag)> {
        self.fields.iter().map(|(name, bag)| (name.as_str(), bag))
    }

    /// Returns the constraints for one field.
    pub fn get(&self, name: &str) -> Option<&ValueBag> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, bag)| bag)
    }

    /// Returns the subgroups.
    pub fn groups(&self) -> &[Self] {
        &self.groups
    }

    /// Returns true if neither the group nor any subgroup holds a constraint.
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|(_, bag)| bag.is_empty()) && self.groups.iter().all(Self::is_empty)
    }
}
