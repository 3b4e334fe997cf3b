//! Field mappings and the mapping registry.
//!
//! A mapping tells the compiler where a logical field lives in the backend
//! (property path, nested-object and parent/child chains), which fixed
//! preconditions always accompany it, and which converters apply.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use esq_condition::{Condition, Group, Order};
use serde_json::Value;
use tracing::debug;

use crate::{
    CompileError,
    convert::{QueryConverter, ValueConverter},
    document::Document,
    params::{NoParameters, ParameterSource, inject_value},
};

/// Property path of the document identifier.
pub const ID_PROPERTY: &str = "_id";

/// One nested-object level of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct NestingLevel {
    /// Path of the nested object.
    pub path: String,
    /// Extra keys merged into the `nested` wrapper.
    pub options: Document,
}

impl NestingLevel {
    /// Creates a nesting level without options.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            options: Document::new(),
        }
    }
}

/// One parent/child level of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinLevel {
    /// Child document type.
    pub child_type: String,
    /// Extra keys merged into the `has_child` wrapper.
    pub options: Document,
}

impl JoinLevel {
    /// Creates a join level without options.
    pub fn new(child_type: impl Into<String>) -> Self {
        Self {
            child_type: child_type.into(),
            options: Document::new(),
        }
    }
}

/// Backend fragments merged at a field's own level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    /// Merged into every query built for the field, before wrapping.
    pub query: Document,
    /// Merged into the field's sort entry.
    pub sort: Document,
}

/// A precondition as declared for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    /// Values another registered field must hold.
    Value {
        /// Field whose mapping (property, converters, chains) applies.
        field: String,
        /// Values the field must hold (any of).
        values: Vec<Value>,
    },
    /// A fixed sub-query.
    Query(Document),
}

impl Precondition {
    /// Creates a value precondition.
    pub fn value(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::Value {
            field: field.into(),
            values,
        }
    }
}

/// A precondition after registration, with parameters substituted and the
/// referenced field resolved.
#[derive(Debug, Clone)]
pub enum ResolvedPrecondition {
    /// Values applied through the referenced field's mapping.
    Value {
        /// Mapping of the referenced field, without its own preconditions.
        target: Box<FieldMapping>,
        /// Values the field must hold.
        values: Vec<Value>,
    },
    /// A fixed sub-query, wrapped in the owning field's chains.
    Query(Document),
}

/// The resolved mapping of one logical field.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    /// Logical field name.
    name: String,
    /// Backend property path.
    property: String,
    /// Fixed extra constraints.
    preconditions: Vec<ResolvedPrecondition>,
    /// Per-value transformation.
    value_converter: Option<Arc<dyn ValueConverter>>,
    /// Full query override.
    query_converter: Option<Arc<dyn QueryConverter>>,
    /// Nested-object chain, outermost first.
    nesting: Vec<NestingLevel>,
    /// Parent/child chain, outermost first.
    join: Vec<JoinLevel>,
    /// Field-level fragments.
    options: FieldOptions,
}

impl FieldMapping {
    /// Returns the logical field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the backend property path.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Returns true if the field maps to the document identifier.
    pub fn is_identifier(&self) -> bool {
        self.property == ID_PROPERTY
    }

    /// Returns the resolved preconditions.
    pub fn preconditions(&self) -> &[ResolvedPrecondition] {
        &self.preconditions
    }

    /// Returns the value converter.
    pub fn value_converter(&self) -> Option<&dyn ValueConverter> {
        self.value_converter.as_deref()
    }

    /// Returns the query converter.
    pub fn query_converter(&self) -> Option<&dyn QueryConverter> {
        self.query_converter.as_deref()
    }

    /// Returns the nested-object chain, outermost first.
    pub fn nesting(&self) -> &[NestingLevel] {
        &self.nesting
    }

    /// Returns the parent/child chain, outermost first.
    pub fn join(&self) -> &[JoinLevel] {
        &self.join
    }

    /// Returns the field-level options.
    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Returns a copy of the mapping without preconditions.
    fn without_preconditions(&self) -> Self {
        Self {
            preconditions: Vec::new(),
            ..self.clone()
        }
    }
}

/// Everything needed to register a field.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Logical field name.
    name: String,
    /// Property path, may contain `{param}` placeholders.
    property: String,
    /// Declared preconditions.
    preconditions: Vec<Precondition>,
    /// Per-value transformation.
    value_converter: Option<Arc<dyn ValueConverter>>,
    /// Full query override.
    query_converter: Option<Arc<dyn QueryConverter>>,
    /// Nested-object chain, outermost first.
    nesting: Vec<NestingLevel>,
    /// Parent/child chain, outermost first.
    join: Vec<JoinLevel>,
    /// Field-level fragments.
    options: FieldOptions,
}

impl FieldDefinition {
    /// Starts a definition for `name` stored at `property`.
    pub fn new(name: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property: property.into(),
            preconditions: Vec::new(),
            value_converter: None,
            query_converter: None,
            nesting: Vec::new(),
            join: Vec::new(),
            options: FieldOptions::default(),
        }
    }

    /// Adds a precondition.
    pub fn precondition(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }

    /// Adds a nested-object level inside the levels added so far.
    pub fn nested(self, path: impl Into<String>) -> Self {
        self.nested_level(NestingLevel::new(path))
    }

    /// Adds a nested-object level with wrapper options.
    pub fn nested_level(mut self, level: NestingLevel) -> Self {
        self.nesting.push(level);
        self
    }

    /// Adds a parent/child level inside the levels added so far.
    pub fn child(self, child_type: impl Into<String>) -> Self {
        self.join_level(JoinLevel::new(child_type))
    }

    /// Adds a parent/child level with wrapper options.
    pub fn join_level(mut self, level: JoinLevel) -> Self {
        self.join.push(level);
        self
    }

    /// Sets the field-level options.
    pub fn options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the value converter.
    pub fn value_converter(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.value_converter = Some(Arc::new(converter));
        self
    }

    /// Sets the query converter.
    pub fn query_converter(mut self, converter: impl QueryConverter + 'static) -> Self {
        self.query_converter = Some(Arc::new(converter));
        self
    }

    /// Returns the logical field name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Registry of field mappings.
///
/// Populate it completely, then hand it to a [`QueryCompiler`](crate::QueryCompiler);
/// the compiler only reads it.
#[derive(Debug)]
pub struct FieldRegistry {
    /// Mappings by field name.
    mappings: HashMap<String, FieldMapping>,
    /// Template parameter source.
    parameters: Box<dyn ParameterSource>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRegistry {
    /// Creates a registry without template parameters.
    pub fn new() -> Self {
        Self::with_parameters(NoParameters)
    }

    /// Creates a registry substituting placeholders from `parameters`.
    pub fn with_parameters(parameters: impl ParameterSource + 'static) -> Self {
        Self {
            mappings: HashMap::new(),
            parameters: Box::new(parameters),
        }
    }

    /// Registers a field from its property path, preconditions and options.
    pub fn register_field(
        &mut self,
        name: impl Into<String>,
        property: impl Into<String>,
        preconditions: Vec<Precondition>,
        options: FieldOptions,
    ) -> Result<(), CompileError> {
        let definition = preconditions
            .into_iter()
            .fold(FieldDefinition::new(name, property), FieldDefinition::precondition)
            .options(options);
        self.register(definition)
    }

    /// Registers a field definition.
    ///
    /// Placeholders are substituted now. Preconditions referencing a field that
    /// is not registered yet fail with `UnknownField`. Registering a name
    /// again replaces the previous mapping.
    pub fn register(&mut self, definition: FieldDefinition) -> Result<(), CompileError> {
        let params = self.parameters.as_ref();

        let preconditions = definition
            .preconditions
            .iter()
            .map(|precondition| match precondition {
                Precondition::Value { field, values } => {
                    let target = self
                        .mappings
                        .get(field)
                        .ok_or_else(|| CompileError::unknown_field(field))?;
                    Ok(ResolvedPrecondition::Value {
                        target: Box::new(target.without_preconditions()),
                        values: values.iter().map(|v| inject_value(params, v)).collect(),
                    })
                }
                Precondition::Query(query) => Ok(ResolvedPrecondition::Query(inject_document(
                    params, query,
                ))),
            })
            .collect::<Result<Vec<_>, CompileError>>()?;

        let mapping = FieldMapping {
            property: params.inject(&definition.property),
            nesting: definition
                .nesting
                .into_iter()
                .map(|level| NestingLevel {
                    path: params.inject(&level.path),
                    ..level
                })
                .collect(),
            join: definition
                .join
                .into_iter()
                .map(|level| JoinLevel {
                    child_type: params.inject(&level.child_type),
                    ..level
                })
                .collect(),
            name: definition.name,
            preconditions,
            value_converter: definition.value_converter,
            query_converter: definition.query_converter,
            options: definition.options,
        };

        debug!(
            field = %mapping.name,
            property = %mapping.property,
            preconditions = mapping.preconditions.len(),
            nesting = mapping.nesting.len(),
            join = mapping.join.len(),
            "registered field"
        );

        if let Some(previous) = self.mappings.insert(mapping.name.clone(), mapping) {
            debug!(field = %previous.name, "replaced existing mapping");
        }
        Ok(())
    }

    /// Returns the mapping for a field.
    pub fn lookup(&self, name: &str) -> Result<&FieldMapping, CompileError> {
        self.mappings
            .get(name)
            .ok_or_else(|| CompileError::unknown_field(name))
    }

    /// Returns true if a field is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.mappings.contains_key(name)
    }

    /// Returns the number of registered fields.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns true if no field is registered.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Returns the mappings a condition actually selects on.
    ///
    /// Collects, in first-appearance order, fields holding a simple value,
    /// range, comparison or pattern match in the root group (and subgroups),
    /// then in the primary condition. When neither selects anything, the
    /// fields of the root and primary orders are returned instead.
    pub fn used_mappings(&self, condition: &Condition) -> Result<Vec<&FieldMapping>, CompileError> {
        let mut names: Vec<&str> = Vec::new();
        collect_selecting_fields(condition.root(), &mut names);
        if let Some(primary) = condition.primary() {
            collect_selecting_fields(primary.root(), &mut names);
        }

        if names.is_empty() {
            let orders = [
                condition.order(),
                condition.primary().and_then(|p| p.order()),
            ];
            for order in orders.into_iter().flatten() {
                collect_order_fields(order, &mut names);
            }
        }

        let mut seen = HashSet::new();
        names
            .into_iter()
            .filter(|name| seen.insert(*name))
            .map(|name| self.lookup(name))
            .collect()
    }
}

/// Substitutes parameters throughout a document.
fn inject_document(params: &dyn ParameterSource, document: &Document) -> Document {
    document
        .iter()
        .map(|(k, v)| (params.inject(k), inject_value(params, v)))
        .collect()
}

/// Appends names of fields with selecting values, depth first.
fn collect_selecting_fields<'a>(group: &'a Group, names: &mut Vec<&'a str>) {
    for (name, bag) in group.fields() {
        if bag.has_selecting_values() {
            names.push(name);
        }
    }
    for subgroup in group.groups() {
        collect_selecting_fields(subgroup, names);
    }
}

/// Appends names of sorted fields.
fn collect_order_fields<'a>(order: &'a Order, names: &mut Vec<&'a str>) {
    names.extend(order.fields().map(|(name, _)| name));
}
