//! Value and query conversion hooks.
//!
//! Converters let a field transform its values, or build the whole backend
//! query itself, before the default translation runs.

use std::fmt;

use esq_condition::{Compare, PatternMatch, Range};
use serde_json::Value;

use crate::{context::QueryContext, document::Document};

/// A constraint value handed to a query converter, after value conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Simple values (included, excluded, or precondition values).
    Values(Vec<Value>),
    /// A range.
    Range(Range),
    /// A comparison.
    Compare(Compare),
    /// A pattern match.
    Pattern(PatternMatch),
    /// A fixed precondition sub-query.
    Query(Document),
}

/// Transforms one domain value into its backend representation.
pub trait ValueConverter: fmt::Debug + Send + Sync {
    /// Converts a value.
    fn convert(&self, value: &Value) -> Value;
}

/// Builds a complete backend query for a constraint.
pub trait QueryConverter: fmt::Debug + Send + Sync {
    /// Returns the query for `value` on `property`, or `None` to fall back
    /// to the default translation.
    fn convert(&self, property: &str, value: &QueryValue, context: QueryContext)
    -> Option<Document>;
}

/// Lowercases string values; other values pass through.
///
/// Useful for keyword fields indexed with a lowercase normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseConverter;

impl ValueConverter for LowercaseConverter {
    fn convert(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(s.to_lowercase()),
            other => other.clone(),
        }
    }
}

/// Applies a value converter to every raw value inside `value`.
///
/// Fixed sub-queries are never converted.
pub fn convert_values(converter: &dyn ValueConverter, value: QueryValue) -> QueryValue {
    match value {
        QueryValue::Values(values) => {
            QueryValue::Values(values.iter().map(|v| converter.convert(v)).collect())
        }
        QueryValue::Range(range) => QueryValue::Range(Range {
            lower: converter.convert(&range.lower),
            upper: converter.convert(&range.upper),
            ..range
        }),
        QueryValue::Compare(compare) => QueryValue::Compare(Compare {
            value: converter.convert(&compare.value),
            ..compare
        }),
        QueryValue::Pattern(pattern) => {
            let converted = converter.convert(&Value::String(pattern.value.clone()));
            let value = match converted {
                Value::String(s) => s,
                other => other.to_string(),
            };
            QueryValue::Pattern(PatternMatch { value, ..pattern })
        }
        query @ QueryValue::Query(_) => query,
    }
}
