//! Compiles esq search conditions into Elasticsearch-style query documents.
//!
//! The compiler takes a [`Condition`](esq_condition::Condition) and a registry
//! of field mappings and produces a declarative `{query, sort}` document:
//!
//! - **Groups** become `bool` queries with `must`, `should` and `must_not`
//! - **Nested and parent/child fields** are wrapped in `nested` and
//!   `has_child` queries; constraints on the same child type share one
//!   `has_child` clause
//! - **Preconditions** are fixed constraints ANDed into every clause of a field
//! - **Identifier fields** (mapped to `_id`) use `ids` queries
//!
//! Nothing is executed: the output is meant to be sent to a search cluster
//! by the caller.
//!
//! # Example
//!
//! ```
//! use esq_compile::{FieldDefinition, FieldRegistry, QueryCompiler};
//! use esq_condition::{Condition, Group, ValueBag};
//! use serde_json::json;
//!
//! let mut registry = FieldRegistry::new();
//! registry.register(FieldDefinition::new("price", "price"))?;
//! registry.register(FieldDefinition::new("sku", "_id"))?;
//! let compiler = QueryCompiler::new(registry);
//!
//! let condition = Condition::new(
//!     Group::and()
//!         .field("price", ValueBag::new().simple(10).simple(20))
//!         .field("sku", ValueBag::new().excluded("X1")),
//! );
//! let compiled = compiler.compile(&condition)?;
//! assert_eq!(
//!     compiled.query,
//!     Some(json!({"bool": {
//!         "must": [{"terms": {"price": [10, 20]}}],
//!         "must_not": [{"ids": {"values": ["X1"]}}]
//!     }}))
//! );
//! # Ok::<(), esq_compile::CompileError>(())
//! ```

#![warn(missing_docs)]

mod builder;
mod clause;
mod compiler;
mod context;
mod convert;
mod document;
mod error;
mod group;
mod mapping;
mod params;
mod sort;
mod wrap;

pub use builder::MAX_ID_SPAN;
pub use compiler::{CompiledQuery, QueryCompiler};
pub use context::{QueryContext, ValueKind};
pub use convert::{LowercaseConverter, QueryConverter, QueryValue, ValueConverter};
pub use document::{Document, deep_merge};
pub use error::CompileError;
pub use mapping::{
    FieldDefinition, FieldMapping, FieldOptions, FieldRegistry, ID_PROPERTY, JoinLevel,
    NestingLevel, Precondition, ResolvedPrecondition,
};
pub use params::{NoParameters, ParameterSource, Parameters, find_placeholder, inject_value};
