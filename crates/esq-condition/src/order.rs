//! Sort specifications.

use std::fmt;

use serde::Deserialize;

use crate::ordered;

/// Sort direction for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending.
    #[serde(alias = "ASC")]
    Asc,
    /// Descending.
    #[serde(alias = "DESC")]
    Desc,
}

impl Direction {
    /// Returns the backend token for the direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered field-to-direction sort specification.
///
/// Reads from a JSON object such as `{"name": "asc", "price": "desc"}`; the
/// key order is the sort priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Order {
    /// Fields in priority order.
    #[serde(deserialize_with = "ordered::deserialize")]
    fields: Vec<(String, Direction)>,
}

impl Order {
    /// Creates an empty order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sort field, returning the order.
    ///
    /// Sorting the same field twice keeps the first position and the latest direction.
    pub fn by(mut self, name: impl Into<String>, direction: Direction) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = direction,
            None => self.fields.push((name, direction)),
        }
        self
    }

    /// Iterates sort fields in priority order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.fields.iter().map(|(name, dir)| (name.as_str(), *dir))
    }

    /// Returns true if no field is sorted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_in_priority_order() {
        let order: Order = serde_json::from_str(r#"{"price": "desc", "name": "ASC"}"#).unwrap();
        let fields: Vec<(&str, Direction)> = order.fields().collect();
        assert_eq!(
            fields,
            vec![("price", Direction::Desc), ("name", Direction::Asc)]
        );
    }

    #[test]
    fn test_repeated_field_keeps_position() {
        let order = Order::new()
            .by("a", Direction::Asc)
            .by("b", Direction::Asc)
            .by("a", Direction::Desc);
        let fields: Vec<(&str, Direction)> = order.fields().collect();
        assert_eq!(fields, vec![("a", Direction::Desc), ("b", Direction::Asc)]);
    }
}
