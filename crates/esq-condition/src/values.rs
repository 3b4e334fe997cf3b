//! Per-field value constraints.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// The constraints attached to one field within a group.
///
/// Every list may be empty; a bag with all lists empty contributes nothing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValueBag {
    /// Values the field must equal (any of).
    pub simple: Vec<Value>,
    /// Values the field must not equal.
    pub excluded_simple: Vec<Value>,
    /// Ranges the field must fall in.
    pub ranges: Vec<Range>,
    /// Ranges the field must not fall in.
    pub excluded_ranges: Vec<Range>,
    /// Single-sided comparisons.
    pub comparisons: Vec<Compare>,
    /// Text pattern matches.
    pub pattern_matches: Vec<PatternMatch>,
}

impl ValueBag {
    /// Creates an empty value bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an included simple value.
    pub fn simple(mut self, value: impl Into<Value>) -> Self {
        self.simple.push(value.into());
        self
    }

    /// Adds an excluded simple value.
    pub fn excluded(mut self, value: impl Into<Value>) -> Self {
        self.excluded_simple.push(value.into());
        self
    }

    /// Adds an included range.
    pub fn range(mut self, range: Range) -> Self {
        self.ranges.push(range);
        self
    }

    /// Adds an excluded range.
    pub fn excluded_range(mut self, range: Range) -> Self {
        self.excluded_ranges.push(range);
        self
    }

    /// Adds a comparison.
    pub fn compare(mut self, operator: CompareOp, value: impl Into<Value>) -> Self {
        self.comparisons.push(Compare {
            operator,
            value: value.into(),
        });
        self
    }

    /// Adds a pattern match.
    pub fn pattern(mut self, pattern: PatternMatch) -> Self {
        self.pattern_matches.push(pattern);
        self
    }

    /// Appends all constraints of `other` to this bag.
    pub fn extend(&mut self, other: Self) {
        self.simple.extend(other.simple);
        self.excluded_simple.extend(other.excluded_simple);
        self.ranges.extend(other.ranges);
        self.excluded_ranges.extend(other.excluded_ranges);
        self.comparisons.extend(other.comparisons);
        self.pattern_matches.extend(other.pattern_matches);
    }

    /// Returns true if the bag holds no constraint at all.
    pub fn is_empty(&self) -> bool {
        self.simple.is_empty()
            && self.excluded_simple.is_empty()
            && self.ranges.is_empty()
            && self.excluded_ranges.is_empty()
            && self.comparisons.is_empty()
            && self.pattern_matches.is_empty()
    }

    /// Returns true if the bag holds a positive constraint.
    ///
    /// Exclusions on their own do not count: a field that is only excluded
    /// does not select anything from its property.
    pub fn has_selecting_values(&self) -> bool {
        !self.simple.is_empty()
            || !self.ranges.is_empty()
            || !self.comparisons.is_empty()
            || !self.pattern_matches.is_empty()
    }
}

/// A two-sided range with inclusive or exclusive bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Range {
    /// Lower bound.
    pub lower: Value,
    /// Upper bound.
    pub upper: Value,
    /// Whether the lower bound is part of the range.
    #[serde(default = "inclusive")]
    pub lower_inclusive: bool,
    /// Whether the upper bound is part of the range.
    #[serde(default = "inclusive")]
    pub upper_inclusive: bool,
}

/// Serde default for range bounds.
const fn inclusive() -> bool {
    true
}

impl Range {
    /// Creates a range including both bounds.
    pub fn inclusive(lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
            lower_inclusive: true,
            upper_inclusive: true,
        }
    }

    /// Creates a range excluding both bounds.
    pub fn exclusive(lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
            lower_inclusive: false,
            upper_inclusive: false,
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CompareOp {
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `<=`
    #[serde(rename = "<=")]
    Lte,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `>=`
    #[serde(rename = ">=")]
    Gte,
    /// `<>`, not equal.
    #[serde(rename = "<>")]
    NotEqual,
}

impl CompareOp {
    /// Returns the operator as written in a condition.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::NotEqual => "<>",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single-sided comparison.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Compare {
    /// Comparison operator.
    pub operator: CompareOp,
    /// Value compared against.
    pub value: Value,
}

/// Kinds of text pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Value occurs anywhere in the text.
    Contains,
    /// Text starts with the value.
    StartsWith,
    /// Text ends with the value.
    EndsWith,
    /// Text equals the value.
    Equals,
    /// Text matches a regular expression.
    Regex,
}

impl PatternKind {
    /// Returns the kind's name as written in a condition.
    pub fn name(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Equals => "equals",
            Self::Regex => "regex",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A text pattern match, possibly negated and possibly case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatternMatch {
    /// How the value is matched.
    pub kind: PatternKind,
    /// The pattern text.
    pub value: String,
    /// When true the field must NOT match.
    #[serde(default)]
    pub exclusive: bool,
    /// When true letter case is ignored.
    #[serde(default)]
    pub case_insensitive: bool,
}

impl PatternMatch {
    /// Creates a positive, case-sensitive pattern match.
    pub fn new(kind: PatternKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            exclusive: false,
            case_insensitive: false,
        }
    }

    /// Marks the match as negated.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Marks the match as case-insensitive.
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }
}
