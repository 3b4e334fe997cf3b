//! Top-level assembly.

use esq_condition::{Condition, PrimaryCondition};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    CompileError,
    clause::BoolQuery,
    document::{Connective, Document},
    group::GroupTranslator,
    mapping::{FieldMapping, FieldRegistry},
    sort::SortCompiler,
};

/// The result of a compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledQuery {
    /// Query body, absent when the condition constrains nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    /// Sort clause, absent without an order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Document>,
}

impl CompiledQuery {
    /// Returns `{query?, sort?}` as a document.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        if let Some(query) = &self.query {
            document.insert("query".into(), query.clone());
        }
        if let Some(sort) = &self.sort {
            document.insert("sort".into(), Value::Object(sort.clone()));
        }
        document
    }

    /// Returns true if neither a query nor a sort was produced.
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.sort.is_none()
    }
}

/// Compiles conditions into query documents.
///
/// The compiler owns its registry, so every mapping is registered before the
/// first compilation. Compiling only reads shared state; one compiler can
/// serve any number of conditions, also from several threads.
#[derive(Debug)]
pub struct QueryCompiler {
    /// Frozen field mappings.
    registry: FieldRegistry,
}

impl QueryCompiler {
    /// Creates a compiler over a fully populated registry.
    pub fn new(registry: FieldRegistry) -> Self {
        Self { registry }
    }

    /// Returns the registry.
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Compiles a condition.
    ///
    /// The primary group, the root group and the filter derived from the
    /// preconditions of sorted fields are ANDed, in that order. A single
    /// fragment is used as the query body directly.
    pub fn compile(&self, condition: &Condition) -> Result<CompiledQuery, CompileError> {
        let groups = GroupTranslator::new(&self.registry);

        let primary = match condition.primary() {
            Some(primary) => groups.translate(primary.root())?,
            None => None,
        };
        let root = groups.translate(condition.root())?;

        let mut sort = SortCompiler::new(&self.registry);
        if let Some(order) = condition.order() {
            sort.add_order(order)?;
        }
        if let Some(order) = condition.primary().and_then(PrimaryCondition::order) {
            sort.add_order(order)?;
        }
        let (order_filter, sort) = sort.finish();

        let mut body = BoolQuery::new();
        for fragment in [primary, root, order_filter].into_iter().flatten() {
            body.insert(Connective::Must, fragment);
        }
        let query = body.into_collapsed();

        debug!(
            query = query.is_some(),
            sort_entries = sort.as_ref().map_or(0, Document::len),
            "compiled condition"
        );
        Ok(CompiledQuery { query, sort })
    }

    /// Returns the mappings `condition` selects on.
    ///
    /// See [`FieldRegistry::used_mappings`].
    pub fn used_mappings(&self, condition: &Condition) -> Result<Vec<&FieldMapping>, CompileError> {
        self.registry.used_mappings(condition)
    }
}
