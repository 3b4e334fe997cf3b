//! Search condition model for esq.
//!
//! A search condition is a backend-agnostic description of what to look for:
//!
//! - **Groups**: fields and subgroups combined with `AND` or `OR`
//! - **Value bags**: per-field constraints (simple values, exclusions, ranges,
//!   comparisons, pattern matches)
//! - **Order**: sort directions per field
//! - **Primary condition**: an extra condition that is always ANDed with the root
//!
//! Conditions are built programmatically or read from JSON.
//!
//! # Example
//!
//! ```
//! use esq_condition::{Condition, Group, ValueBag};
//!
//! let condition = Condition::new(
//!     Group::and().field("price", ValueBag::new().simple(10).simple(20)),
//! );
//! assert_eq!(condition.root().fields().count(), 1);
//! ```

#![warn(missing_docs)]

mod condition;
mod error;
mod group;
mod order;
mod ordered;
mod values;

pub use condition::{Condition, PrimaryCondition};
pub use error::ConditionError;
pub use group::{Group, Logical};
pub use order::{Direction, Order};
pub use values::{Compare, CompareOp, PatternKind, PatternMatch, Range, ValueBag};
