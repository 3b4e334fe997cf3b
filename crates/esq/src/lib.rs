//! esq: search condition compiler
//!
//! Compiles backend-agnostic search conditions, written as JSON, into
//! Elasticsearch query documents. Field mappings come from `.esq.toml` files
//! discovered from the working directory upward.

#![warn(missing_docs)]

pub mod cli;
