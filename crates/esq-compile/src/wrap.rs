//! Nested-object and parent/child wrapping.
//!
//! Chains are declared outermost first and applied innermost first. The
//! nesting chain wraps before the join chain: nested objects live inside child
//! documents, so a field with both yields `has_child(type, nested(path, query))`.

use serde_json::{Value, json};

use crate::{
    document::{Document, HAS_CHILD, NESTED, deep_merge, single},
    mapping::{JoinLevel, NestingLevel},
};

/// Wraps `query` in the given nesting and join chains.
pub fn wrap(query: Value, nesting: &[NestingLevel], join: &[JoinLevel]) -> Value {
    let nested = nesting.iter().rev().fold(query, |inner, level| {
        envelope(NESTED, "path", &level.path, inner, &level.options)
    });
    join.iter().rev().fold(nested, |inner, level| {
        envelope(HAS_CHILD, "type", &level.child_type, inner, &level.options)
    })
}

/// Builds `{kind: {target_key: target, query: inner, ...options}}`.
fn envelope(kind: &str, target_key: &str, target: &str, inner: Value, options: &Document) -> Value {
    let mut body = single(target_key, json!(target));
    body.insert("query".into(), inner);
    deep_merge(&mut body, options);
    Value::Object(single(kind, Value::Object(body)))
}
