//! Boolean clause accumulation with parent/child deduplication.
//!
//! Constraints on several fields beneath the same child relation must end up
//! in one `has_child` clause with an inner AND, not in sibling `has_child`
//! clauses that would each match the relation on their own.

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::trace;

use crate::document::{BOOL, Connective, HAS_CHILD, child_type, single};

/// An accumulating boolean container.
#[derive(Debug, Default)]
pub struct BoolQuery {
    /// Clauses under `must`.
    must: Vec<Value>,
    /// Clauses under `should`.
    should: Vec<Value>,
    /// Clauses under `must_not`.
    must_not: Vec<Value>,
    /// Position of the `has_child` clause per connective and child type.
    children: HashMap<(Connective, String), usize>,
}

impl BoolQuery {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clause under `connective`.
    ///
    /// A `has_child` clause whose child type already has a clause under the
    /// same connective is merged into it: its inner query is ANDed into the
    /// existing inner query and the new wrapper is dropped.
    pub fn insert(&mut self, connective: Connective, fragment: Value) {
        let Some(child) = child_type(&fragment).map(str::to_string) else {
            self.clauses_mut(connective).push(fragment);
            return;
        };

        let existing = self.children.get(&(connective, child.clone())).copied();
        match existing {
            Some(position) => {
                trace!(child_type = %child, connective = connective.key(), "merging has_child clause");
                let inner = take_inner_query(fragment);
                let clauses = self.clauses_mut(connective);
                if let Some(query) = inner_query_mut(&mut clauses[position]) {
                    and_into(query, inner);
                }
            }
            None => {
                let clauses = self.clauses_mut(connective);
                clauses.push(fragment);
                let position = clauses.len() - 1;
                self.children.insert((connective, child), position);
            }
        }
    }

    /// Returns true if no clause was added.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    /// Returns `{bool: {...}}` holding the non-empty connectives, or `None`.
    pub fn into_fragment(self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }

        let mut body = serde_json::Map::new();
        for (connective, clauses) in [
            (Connective::Must, self.must),
            (Connective::Should, self.should),
            (Connective::MustNot, self.must_not),
        ] {
            if !clauses.is_empty() {
                body.insert(connective.key().into(), Value::Array(clauses));
            }
        }
        Some(Value::Object(single(BOOL, Value::Object(body))))
    }

    /// Like [`into_fragment`](Self::into_fragment), but a lone `must` clause is
    /// returned as is.
    pub fn into_collapsed(mut self) -> Option<Value> {
        if self.must.len() == 1 && self.should.is_empty() && self.must_not.is_empty() {
            return self.must.pop();
        }
        self.into_fragment()
    }

    /// Returns the clause list for a connective.
    fn clauses_mut(&mut self, connective: Connective) -> &mut Vec<Value> {
        match connective {
            Connective::Must => &mut self.must,
            Connective::Should => &mut self.should,
            Connective::MustNot => &mut self.must_not,
        }
    }
}

/// Returns the inner query of a `has_child` wrapper.
fn inner_query_mut(fragment: &mut Value) -> Option<&mut Value> {
    fragment
        .get_mut(HAS_CHILD)
        .and_then(|wrapper| wrapper.get_mut("query"))
}

/// Extracts the inner query of a `has_child` wrapper.
fn take_inner_query(mut fragment: Value) -> Value {
    inner_query_mut(&mut fragment)
        .map(Value::take)
        .unwrap_or(Value::Null)
}

/// ANDs `addition` into `target`.
///
/// A `has_child` addition merges into a `has_child` of the same type, either
/// `target` itself or one of its must-only clauses, so every level of a join
/// chain holds one wrapper per child type. Otherwise the addition is appended
/// when `target` already is a must-only boolean, or `target` is replaced with
/// `{bool: {must: [target, addition]}}`.
fn and_into(target: &mut Value, addition: Value) {
    if let Some(child) = child_type(&addition).map(str::to_string) {
        if child_type(target) == Some(child.as_str()) {
            trace!(child_type = %child, "merging inner has_child clause");
            let inner = take_inner_query(addition);
            if let Some(query) = inner_query_mut(target) {
                and_into(query, inner);
            }
            return;
        }
        if let Some(sibling) = must_only_clauses(target)
            .and_then(|must| must.iter_mut().find(|c| child_type(c) == Some(child.as_str())))
        {
            and_into(sibling, addition);
            return;
        }
    }

    if let Some(must) = must_only_clauses(target) {
        must.push(addition);
        return;
    }
    let prior = target.take();
    *target = json!({"bool": {"must": [prior, addition]}});
}

/// Returns the clause list of a `{bool: {must: [...]}}` value.
fn must_only_clauses(value: &mut Value) -> Option<&mut Vec<Value>> {
    let outer = value.as_object_mut().filter(|o| o.len() == 1)?;
    let body = outer.get_mut(BOOL)?.as_object_mut().filter(|b| b.len() == 1)?;
    body.get_mut(Connective::Must.key())?.as_array_mut()
}
