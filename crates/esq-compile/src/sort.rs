//! Sort clause compilation.
//!
//! Each order field contributes a `{target: {order: ...}}` entry. Fields
//! reached through a parent/child relation cannot be sorted on directly, so
//! they sort by `_score` instead. Preconditions of sorted fields are collected
//! into a filter that the assembler ANDs with the query.

use esq_condition::Order;
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    CompileError,
    builder::precondition_fragments,
    clause::BoolQuery,
    context::ValueKind,
    document::{Connective, Document, NESTED, SCORE, deep_merge, single},
    mapping::{FieldRegistry, NestingLevel},
};

/// Accumulates sort entries and the preconditions of sorted fields.
#[derive(Debug)]
pub struct SortCompiler<'a> {
    /// Mappings consulted for every order field.
    registry: &'a FieldRegistry,
    /// Preconditions of every sorted field.
    preconditions: BoolQuery,
    /// Sort entries by target.
    sort: Document,
}

impl<'a> SortCompiler<'a> {
    /// Creates an empty sort compiler reading `registry`.
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self {
            registry,
            preconditions: BoolQuery::new(),
            sort: Document::new(),
        }
    }

    /// Adds the entries of an order, in declaration order.
    pub fn add_order(&mut self, order: &Order) -> Result<(), CompileError> {
        for (name, direction) in order.fields() {
            let mapping = self.registry.lookup(name)?;

            for fragment in precondition_fragments(mapping, ValueKind::Order)? {
                self.preconditions.insert(Connective::Must, fragment);
            }

            let joined = !mapping.join().is_empty();
            let target = if joined { SCORE } else { mapping.property() };

            let mut entry = single("order", json!(direction.as_str()));
            let nested = if joined {
                None
            } else {
                nested_sort(mapping.nesting())
            };
            if let Some(nested) = nested {
                entry.insert(NESTED.into(), nested);
            }
            deep_merge(&mut entry, &mapping.options().sort);
            deep_merge(&mut self.sort, &single(target, Value::Object(entry)));

            debug!(field = name, sort_target = target, direction = %direction, "added sort entry");
        }
        Ok(())
    }

    /// Returns the precondition filter and the sort document, each `None`
    /// when empty.
    pub fn finish(self) -> (Option<Value>, Option<Document>) {
        let sort = (!self.sort.is_empty()).then_some(self.sort);
        (self.preconditions.into_collapsed(), sort)
    }
}

/// Builds the nested-sort path chain `{path, nested: {path, ...}}`,
/// outermost level first.
fn nested_sort(nesting: &[NestingLevel]) -> Option<Value> {
    nesting.iter().rev().fold(None, |inner, level| {
        let mut body = single("path", json!(level.path));
        if let Some(inner) = inner {
            body.insert(NESTED.into(), inner);
        }
        Some(Value::Object(body))
    })
}
