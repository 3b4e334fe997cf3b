//! Query document primitives.
//!
//! Documents are plain JSON objects using the backend's key vocabulary.

use esq_condition::Logical;
use serde_json::{Map, Value};

/// A JSON object fragment of a query document.
pub type Document = Map<String, Value>;

/// Key of a boolean container.
pub const BOOL: &str = "bool";
/// Key of a nested-object wrapper.
pub const NESTED: &str = "nested";
/// Key of a parent/child wrapper.
pub const HAS_CHILD: &str = "has_child";
/// Sort target used for fields that cannot be sorted on directly.
pub const SCORE: &str = "_score";

/// Logical slot of a boolean container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    /// Every clause must match.
    Must,
    /// At least one clause must match.
    Should,
    /// No clause may match.
    MustNot,
}

impl Connective {
    /// Returns the connective used for positive constraints of a group.
    pub fn including(logical: Logical) -> Self {
        match logical {
            Logical::And => Self::Must,
            Logical::Or => Self::Should,
        }
    }

    /// Returns the backend key for the connective.
    pub fn key(self) -> &'static str {
        match self {
            Self::Must => "must",
            Self::Should => "should",
            Self::MustNot => "must_not",
        }
    }
}

/// Merges `overlay` into `base`, key by key.
///
/// Objects present on both sides are merged recursively. Any other value in
/// `overlay`, arrays included, replaces the value in `base`.
pub fn deep_merge(base: &mut Document, overlay: &Document) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Wraps a single key and value into a document.
pub fn single(key: impl Into<String>, value: Value) -> Document {
    let mut document = Document::new();
    document.insert(key.into(), value);
    document
}

/// Returns the child type if `fragment` is a bare `has_child` wrapper.
pub fn child_type(fragment: &Value) -> Option<&str> {
    let object = fragment.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get(HAS_CHILD)?.get("type")?.as_str()
}
