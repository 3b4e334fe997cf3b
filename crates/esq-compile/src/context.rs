//! Per-step translation context.

/// Kind of constraint being translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Included simple values.
    Simple,
    /// Excluded simple values.
    ExcludedSimple,
    /// Included range.
    Range,
    /// Excluded range.
    ExcludedRange,
    /// Single-sided comparison.
    Comparison,
    /// Text pattern match.
    PatternMatch,
    /// Precondition value applied for a sort field.
    Order,
    /// Precondition value applied for a filtered field.
    PreconditionValue,
    /// Fixed precondition sub-query.
    PreconditionQuery,
}

/// What is being translated at one step.
///
/// A fresh value is created for each constraint and passed down by value, so
/// no step can observe another field's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext {
    /// Kind of constraint.
    pub kind: ValueKind,
    /// Whether the target property is the document identifier.
    pub identifier: bool,
}

impl QueryContext {
    /// Creates a context.
    pub fn new(kind: ValueKind, identifier: bool) -> Self {
        Self { kind, identifier }
    }

    /// Returns true if values of this step go through value conversion.
    pub fn converts_values(self) -> bool {
        self.kind != ValueKind::PreconditionQuery
    }
}
