//! Group translation.
//!
//! Folds a condition group into one boolean fragment. Positive constraints go
//! under the group's including connective (`must` for AND, `should` for OR),
//! negative ones under `must_not`, and subgroups under `must` as atomic units.

use esq_condition::{CompareOp, Group, ValueBag};
use serde_json::Value;
use tracing::trace;

use crate::{
    CompileError,
    builder::FieldQuery,
    clause::BoolQuery,
    context::ValueKind,
    convert::QueryValue,
    document::Connective,
    mapping::FieldRegistry,
};

/// Translates condition groups against a registry.
#[derive(Debug, Clone, Copy)]
pub struct GroupTranslator<'a> {
    /// Mappings consulted for every field.
    registry: &'a FieldRegistry,
}

impl<'a> GroupTranslator<'a> {
    /// Creates a translator reading `registry`.
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self { registry }
    }

    /// Translates a group and its subgroups.
    ///
    /// Returns `None` when the group produces no clause at all.
    pub fn translate(&self, group: &Group) -> Result<Option<Value>, CompileError> {
        let including = Connective::including(group.logical());
        let mut query = BoolQuery::new();

        for (name, bag) in group.fields() {
            let mapping = self.registry.lookup(name)?;
            let field = FieldQuery::new(mapping, ValueKind::PreconditionValue)?;
            translate_bag(&field, bag, including, &mut query)?;
        }

        for subgroup in group.groups() {
            if let Some(fragment) = self.translate(subgroup)? {
                query.insert(Connective::Must, fragment);
            }
        }

        trace!(
            logical = %group.logical(),
            fields = group.fields().count(),
            subgroups = group.groups().len(),
            empty = query.is_empty(),
            "translated group"
        );
        Ok(query.into_fragment())
    }
}

/// Inserts one fragment per populated constraint of `bag`.
fn translate_bag(
    field: &FieldQuery<'_>,
    bag: &ValueBag,
    including: Connective,
    query: &mut BoolQuery,
) -> Result<(), CompileError> {
    if !bag.simple.is_empty() {
        let fragment = field.build(QueryValue::Values(bag.simple.clone()), ValueKind::Simple)?;
        query.insert(including, fragment);
    }

    if !bag.excluded_simple.is_empty() {
        let fragment = field.build(
            QueryValue::Values(bag.excluded_simple.clone()),
            ValueKind::ExcludedSimple,
        )?;
        query.insert(Connective::MustNot, fragment);
    }

    for range in &bag.ranges {
        let fragment = field.build(QueryValue::Range(range.clone()), ValueKind::Range)?;
        query.insert(including, fragment);
    }

    for range in &bag.excluded_ranges {
        let fragment = field.build(QueryValue::Range(range.clone()), ValueKind::ExcludedRange)?;
        query.insert(Connective::MustNot, fragment);
    }

    for compare in &bag.comparisons {
        let connective = if compare.operator == CompareOp::NotEqual {
            Connective::MustNot
        } else {
            including
        };
        let fragment = field.build(QueryValue::Compare(compare.clone()), ValueKind::Comparison)?;
        query.insert(connective, fragment);
    }

    for pattern in &bag.pattern_matches {
        let connective = if pattern.exclusive {
            Connective::MustNot
        } else {
            including
        };
        let fragment = field.build(QueryValue::Pattern(pattern.clone()), ValueKind::PatternMatch)?;
        query.insert(connective, fragment);
    }

    Ok(())
}
