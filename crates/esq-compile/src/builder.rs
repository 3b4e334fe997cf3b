//! Value-query building.
//!
//! Turns one constraint of one field into a backend query: value conversion,
//! query conversion or the default translation, field options, structural
//! wrapping and finally the field's precondition fragments.

use esq_condition::{Compare, CompareOp, PatternKind, PatternMatch, Range};
use serde_json::{Value, json};

use crate::{
    CompileError,
    clause::BoolQuery,
    context::{QueryContext, ValueKind},
    convert::{QueryValue, convert_values},
    document::{Connective, Document, deep_merge, single},
    mapping::{FieldMapping, ResolvedPrecondition},
    wrap::wrap,
};

/// Largest number of identifiers an identifier range may expand to.
pub const MAX_ID_SPAN: i64 = 10_000;

/// Builds queries for one field, folding in its precondition fragments.
#[derive(Debug)]
pub struct FieldQuery<'a> {
    /// Mapping of the field.
    mapping: &'a FieldMapping,
    /// Precondition fragments ANDed into every query.
    preconditions: Vec<Value>,
}

impl<'a> FieldQuery<'a> {
    /// Prepares query building for `mapping`, translating its preconditions
    /// once under `kind`.
    pub fn new(mapping: &'a FieldMapping, kind: ValueKind) -> Result<Self, CompileError> {
        Ok(Self {
            mapping,
            preconditions: precondition_fragments(mapping, kind)?,
        })
    }

    /// Builds the query for one constraint.
    ///
    /// A single resulting clause is returned unwrapped so a surrounding
    /// `has_child` stays visible to deduplication in the enclosing group.
    pub fn build(&self, value: QueryValue, kind: ValueKind) -> Result<Value, CompileError> {
        let query = build_query(self.mapping, value, kind)?;
        if self.preconditions.is_empty() {
            return Ok(query);
        }

        let mut folded = BoolQuery::new();
        folded.insert(Connective::Must, query);
        for fragment in &self.preconditions {
            folded.insert(Connective::Must, fragment.clone());
        }
        // Holds at least the query itself.
        Ok(folded.into_collapsed().unwrap_or_default())
    }
}

/// Translates the preconditions of `mapping`.
///
/// Value preconditions are built through their target field's mapping under
/// `kind`; query preconditions are taken as is and wrapped in the chains of
/// `mapping` itself.
pub fn precondition_fragments(
    mapping: &FieldMapping,
    kind: ValueKind,
) -> Result<Vec<Value>, CompileError> {
    mapping
        .preconditions()
        .iter()
        .map(|precondition| match precondition {
            ResolvedPrecondition::Value { target, values } => {
                build_query(target, QueryValue::Values(values.clone()), kind)
            }
            ResolvedPrecondition::Query(query) => build_query(
                mapping,
                QueryValue::Query(query.clone()),
                ValueKind::PreconditionQuery,
            ),
        })
        .collect()
}

/// Builds and wraps the query for one constraint, without preconditions.
pub fn build_query(
    mapping: &FieldMapping,
    value: QueryValue,
    kind: ValueKind,
) -> Result<Value, CompileError> {
    let context = QueryContext::new(kind, mapping.is_identifier());
    let value = match mapping.value_converter() {
        Some(converter) if context.converts_values() => convert_values(converter, value),
        _ => value,
    };

    let converted = mapping
        .query_converter()
        .and_then(|converter| converter.convert(mapping.property(), &value, context))
        .filter(|document| !document.is_empty());

    let document = match converted {
        Some(document) => document,
        None => {
            let mut document = default_query(mapping, value, context)?;
            if context.converts_values() {
                deep_merge(&mut document, &mapping.options().query);
            }
            document
        }
    };

    Ok(wrap(
        Value::Object(document),
        mapping.nesting(),
        mapping.join(),
    ))
}

/// Default translation of a constraint.
fn default_query(
    mapping: &FieldMapping,
    value: QueryValue,
    context: QueryContext,
) -> Result<Document, CompileError> {
    let property = mapping.property();
    match value {
        QueryValue::Values(values) if context.identifier => Ok(ids(values)),
        QueryValue::Values(values) => Ok(clause("terms", property, Value::Array(values))),
        QueryValue::Range(range) if context.identifier => id_span(mapping.name(), &range).map(ids),
        QueryValue::Range(range) => Ok(range_query(property, &range)),
        QueryValue::Compare(compare) if context.identifier => id_compare(mapping.name(), compare),
        QueryValue::Compare(compare) => Ok(compare_query(property, compare)),
        QueryValue::Pattern(pattern) => pattern_query(mapping.name(), property, pattern),
        QueryValue::Query(query) => Ok(query),
    }
}

/// Builds `{kind: {property: body}}`.
fn clause(kind: &str, property: &str, body: Value) -> Document {
    single(kind, Value::Object(single(property, body)))
}

/// Builds an identifier query.
fn ids(values: Vec<Value>) -> Document {
    single("ids", json!({ "values": values }))
}

/// Builds a two-sided range query.
fn range_query(property: &str, range: &Range) -> Document {
    let lower = if range.lower_inclusive { "gte" } else { "gt" };
    let upper = if range.upper_inclusive { "lte" } else { "lt" };
    let mut bounds = single(lower, range.lower.clone());
    bounds.insert(upper.into(), range.upper.clone());
    clause("range", property, Value::Object(bounds))
}

/// Expands an identifier range into every identifier between its bounds,
/// both bounds included.
fn id_span(field: &str, range: &Range) -> Result<Vec<Value>, CompileError> {
    let (Some(lower), Some(upper)) = (range.lower.as_i64(), range.upper.as_i64()) else {
        return Err(CompileError::unsupported(
            field,
            format!(
                "identifier range with non-integer bounds {}..{}",
                range.lower, range.upper
            ),
        ));
    };

    let span = upper.saturating_sub(lower);
    if span >= MAX_ID_SPAN {
        return Err(CompileError::unsupported(
            field,
            format!("identifier range {lower}..{upper} spans more than {MAX_ID_SPAN} ids"),
        ));
    }
    Ok((lower..=upper).map(Value::from).collect())
}

/// Builds the exact match behind `<>` on an identifier.
///
/// Identifiers have no ordering, so `<`, `<=`, `>` and `>=` are rejected.
fn id_compare(field: &str, compare: Compare) -> Result<Document, CompileError> {
    match compare.operator {
        CompareOp::NotEqual => Ok(ids(vec![compare.value])),
        operator => Err(CompileError::unsupported(
            field,
            format!("identifier comparison '{operator} {}'", compare.value),
        )),
    }
}

/// Builds a single-sided comparison, or the exact match behind `<>`.
fn compare_query(property: &str, compare: Compare) -> Document {
    let operator = match compare.operator {
        CompareOp::Lt => "lt",
        CompareOp::Lte => "lte",
        CompareOp::Gt => "gt",
        CompareOp::Gte => "gte",
        CompareOp::NotEqual => return clause("term", property, json!({ "value": compare.value })),
    };
    clause(
        "range",
        property,
        Value::Object(single(operator, compare.value)),
    )
}

/// Builds a text pattern query.
fn pattern_query(
    field: &str,
    property: &str,
    pattern: PatternMatch,
) -> Result<Document, CompileError> {
    let (kind, mut body) = match pattern.kind {
        PatternKind::Contains => {
            return Ok(clause("match", property, json!({ "query": pattern.value })));
        }
        PatternKind::StartsWith => ("prefix", single("value", Value::String(pattern.value))),
        PatternKind::EndsWith => (
            "wildcard",
            single("value", Value::String(format!("?{}", escape_wildcard(&pattern.value)))),
        ),
        PatternKind::Equals => ("term", single("value", Value::String(pattern.value))),
        PatternKind::Regex => {
            return Err(CompileError::unsupported(
                field,
                format!("pattern match '{}'", pattern.kind),
            ));
        }
    };

    if pattern.case_insensitive {
        body.insert("case_insensitive".into(), Value::Bool(true));
    }
    Ok(clause(kind, property, Value::Object(body)))
}

/// Escapes wildcard metacharacters.
fn escape_wildcard(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '?' | '*') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        convert::{LowercaseConverter, QueryConverter},
        mapping::{FieldDefinition, FieldOptions, FieldRegistry, Precondition},
    };

    /// Registry holding a single field.
    fn registry(definition: FieldDefinition) -> FieldRegistry {
        let mut registry = FieldRegistry::new();
        registry.register(definition).unwrap();
        registry
    }

    /// Builds one constraint for the only field of `registry`.
    fn build(registry: &FieldRegistry, name: &str, value: QueryValue, kind: ValueKind) -> Value {
        let mapping = registry.lookup(name).unwrap();
        FieldQuery::new(mapping, ValueKind::PreconditionValue)
            .unwrap()
            .build(value, kind)
            .unwrap()
    }

    #[test]
    fn test_simple_values_become_terms() {
        let registry = registry(FieldDefinition::new("price", "price"));
        let query = build(
            &registry,
            "price",
            QueryValue::Values(vec![json!(10), json!(20)]),
            ValueKind::Simple,
        );
        assert_eq!(query, json!({"terms": {"price": [10, 20]}}));
    }

    #[test]
    fn test_identifier_values_become_ids() {
        let registry = registry(FieldDefinition::new("sku", "_id"));
        let query = build(
            &registry,
            "sku",
            QueryValue::Values(vec![json!("X1")]),
            ValueKind::ExcludedSimple,
        );
        assert_eq!(query, json!({"ids": {"values": ["X1"]}}));
    }

    #[test]
    fn test_range_bounds_follow_inclusiveness() {
        let registry = registry(FieldDefinition::new("price", "price"));
        let query = build(
            &registry,
            "price",
            QueryValue::Range(Range {
                lower: json!(1),
                upper: json!(9),
                lower_inclusive: true,
                upper_inclusive: false,
            }),
            ValueKind::Range,
        );
        assert_eq!(query, json!({"range": {"price": {"gte": 1, "lt": 9}}}));
    }

    #[test]
    fn test_identifier_range_expands_to_ids() {
        let registry = registry(FieldDefinition::new("id", "_id"));
        let query = build(
            &registry,
            "id",
            QueryValue::Range(Range::exclusive(3, 6)),
            ValueKind::Range,
        );
        assert_eq!(query, json!({"ids": {"values": [3, 4, 5, 6]}}));
    }

    #[test]
    fn test_identifier_range_rejects_text_and_huge_spans() {
        let registry = registry(FieldDefinition::new("id", "_id"));
        let mapping = registry.lookup("id").unwrap();

        let text = build_query(mapping, QueryValue::Range(Range::inclusive("a", "z")), ValueKind::Range);
        assert!(matches!(text, Err(CompileError::UnsupportedOperation { .. })));

        let huge = build_query(
            mapping,
            QueryValue::Range(Range::inclusive(0, MAX_ID_SPAN)),
            ValueKind::Range,
        );
        assert!(matches!(huge, Err(CompileError::UnsupportedOperation { .. })));
    }

    #[test]
    fn test_comparisons_map_operators() {
        let registry = registry(FieldDefinition::new("stock", "stock"));
        let mapping = registry.lookup("stock").unwrap();
        let compare = |operator, value: i64| {
            build_query(
                mapping,
                QueryValue::Compare(Compare {
                    operator,
                    value: json!(value),
                }),
                ValueKind::Comparison,
            )
            .unwrap()
        };

        assert_eq!(compare(CompareOp::Lte, 5), json!({"range": {"stock": {"lte": 5}}}));
        assert_eq!(compare(CompareOp::Gt, 0), json!({"range": {"stock": {"gt": 0}}}));
        assert_eq!(
            compare(CompareOp::NotEqual, 3),
            json!({"term": {"stock": {"value": 3}}})
        );
    }

    #[test]
    fn test_identifier_comparisons_only_allow_not_equal() {
        let registry = registry(FieldDefinition::new("id", "_id"));
        let mapping = registry.lookup("id").unwrap();
        let compare = |operator| {
            build_query(
                mapping,
                QueryValue::Compare(Compare {
                    operator,
                    value: json!(7),
                }),
                ValueKind::Comparison,
            )
        };

        assert_eq!(
            compare(CompareOp::NotEqual).unwrap(),
            json!({"ids": {"values": [7]}})
        );
        for operator in [CompareOp::Lt, CompareOp::Lte, CompareOp::Gt, CompareOp::Gte] {
            let err = compare(operator).unwrap_err();
            assert!(matches!(err, CompileError::UnsupportedOperation { ref field, .. } if field == "id"));
        }
    }

    #[test]
    fn test_patterns_dispatch_on_kind() {
        let registry = registry(FieldDefinition::new("name", "name"));
        let mapping = registry.lookup("name").unwrap();
        let pattern = |pattern: PatternMatch| {
            build_query(mapping, QueryValue::Pattern(pattern), ValueKind::PatternMatch)
        };

        assert_eq!(
            pattern(PatternMatch::new(PatternKind::Contains, "red shoe")).unwrap(),
            json!({"match": {"name": {"query": "red shoe"}}})
        );
        assert_eq!(
            pattern(PatternMatch::new(PatternKind::StartsWith, "Sh").case_insensitive()).unwrap(),
            json!({"prefix": {"name": {"value": "Sh", "case_insensitive": true}}})
        );
        assert_eq!(
            pattern(PatternMatch::new(PatternKind::EndsWith, "a*b?")).unwrap(),
            json!({"wildcard": {"name": {"value": "?a\\*b\\?"}}})
        );
        assert_eq!(
            pattern(PatternMatch::new(PatternKind::Equals, "shoe")).unwrap(),
            json!({"term": {"name": {"value": "shoe"}}})
        );
        assert_eq!(
            pattern(PatternMatch::new(PatternKind::Regex, "s.*")).unwrap_err(),
            CompileError::unsupported("name", "pattern match 'regex'")
        );
    }

    #[test]
    fn test_value_converter_runs_before_translation() {
        let registry = registry(
            FieldDefinition::new("color", "color.keyword").value_converter(LowercaseConverter),
        );
        let query = build(
            &registry,
            "color",
            QueryValue::Values(vec![json!("RED")]),
            ValueKind::Simple,
        );
        assert_eq!(query, json!({"terms": {"color.keyword": ["red"]}}));
    }

    /// Replaces every query with a `match_all`, except for ranges.
    #[derive(Debug)]
    struct MatchAll;

    impl QueryConverter for MatchAll {
        fn convert(
            &self,
            _property: &str,
            value: &QueryValue,
            context: QueryContext,
        ) -> Option<Document> {
            match value {
                QueryValue::Range(_) => None,
                _ => Some(single("match_all", json!({"kind": format!("{:?}", context.kind)}))),
            }
        }
    }

    #[test]
    fn test_query_converter_overrides_default() {
        let registry = registry(FieldDefinition::new("f", "f").query_converter(MatchAll));
        let mapping = registry.lookup("f").unwrap();

        let converted =
            build_query(mapping, QueryValue::Values(vec![json!(1)]), ValueKind::Simple).unwrap();
        assert_eq!(converted, json!({"match_all": {"kind": "Simple"}}));

        let fallback = build_query(
            mapping,
            QueryValue::Range(Range::inclusive(1, 2)),
            ValueKind::Range,
        )
        .unwrap();
        assert_eq!(fallback, json!({"range": {"f": {"gte": 1, "lte": 2}}}));
    }

    #[test]
    fn test_options_merge_before_wrapping() {
        let mut options = FieldOptions::default();
        options
            .query
            .insert("terms".into(), json!({"boost": 2.0}));
        let registry = registry(
            FieldDefinition::new("tag", "variants.tag")
                .nested("variants")
                .options(options),
        );
        let query = build(
            &registry,
            "tag",
            QueryValue::Values(vec![json!("a")]),
            ValueKind::Simple,
        );
        assert_eq!(
            query,
            json!({"nested": {"path": "variants", "query":
                {"terms": {"variants.tag": ["a"], "boost": 2.0}}}})
        );
    }

    #[test]
    fn test_preconditions_fold_into_one_child_clause() {
        let mut registry = FieldRegistry::new();
        registry
            .register(FieldDefinition::new("currency", "currency").child("offer"))
            .unwrap();
        registry
            .register(
                FieldDefinition::new("price", "price")
                    .child("offer")
                    .precondition(Precondition::value("currency", vec![json!("EUR")])),
            )
            .unwrap();

        let query = build(
            &registry,
            "price",
            QueryValue::Compare(Compare {
                operator: CompareOp::Lt,
                value: json!(50),
            }),
            ValueKind::Comparison,
        );
        assert_eq!(
            query,
            json!({"has_child": {"type": "offer", "query": {"bool": {"must": [
                {"range": {"price": {"lt": 50}}},
                {"terms": {"currency": ["EUR"]}}
            ]}}}})
        );
    }

    #[test]
    fn test_query_preconditions_use_owner_chain_unconverted() {
        let mut precondition = Document::new();
        precondition.insert("exists".into(), json!({"field": "STOCK"}));
        let registry = registry(
            FieldDefinition::new("size", "variants.size")
                .nested("variants")
                .value_converter(LowercaseConverter)
                .precondition(Precondition::Query(precondition)),
        );

        let query = build(
            &registry,
            "size",
            QueryValue::Values(vec![json!("XL")]),
            ValueKind::Simple,
        );
        assert_eq!(
            query,
            json!({"bool": {"must": [
                {"nested": {"path": "variants", "query": {"terms": {"variants.size": ["xl"]}}}},
                {"nested": {"path": "variants", "query": {"exists": {"field": "STOCK"}}}}
            ]}})
        );
    }
}
