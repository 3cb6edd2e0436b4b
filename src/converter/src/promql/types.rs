//! PromQL building blocks: label matchers, aggregation operators, functions

use std::fmt;

/// Label matcher types matching Prometheus semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherOp {
    /// Exact string match (=)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Regex match (=~)
    RegexMatch,
    /// Regex not match (!~)
    RegexNotMatch,
}

impl fmt::Display for MatcherOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::NotEqual => write!(f, "!="),
            Self::RegexMatch => write!(f, "=~"),
            Self::RegexNotMatch => write!(f, "!~"),
        }
    }
}

/// A single label matcher, rendered compactly as `name="value"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatcher {
    /// Label name
    pub name: String,
    /// Match operation
    pub op: MatcherOp,
    /// Value to match against
    pub value: String,
}

impl LabelMatcher {
    /// Create a new equality matcher
    pub fn equal(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            op: MatcherOp::Equal,
            value: value.to_string(),
        }
    }

    /// Create a new not-equal matcher
    pub fn not_equal(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            op: MatcherOp::NotEqual,
            value: value.to_string(),
        }
    }

    /// Create a new regex matcher
    pub fn regex_match(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            op: MatcherOp::RegexMatch,
            value: pattern.to_string(),
        }
    }

    /// Create a new regex not-match matcher
    pub fn regex_not_match(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            op: MatcherOp::RegexNotMatch,
            value: pattern.to_string(),
        }
    }
}

impl fmt::Display for LabelMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}\"{}\"", self.name, self.op, self.value)
    }
}

/// Aggregation operators emitted by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationOp {
    Sum,
    Avg,
    Min,
    Max,
}

impl fmt::Display for AggregationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => write!(f, "sum"),
            Self::Avg => write!(f, "avg"),
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
        }
    }
}

/// Single-argument functions emitted by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// Per-second rate over a range vector
    Rate,
    /// Total increase over a range vector
    Increase,
    /// Sum of observations of a native histogram
    HistogramSum,
    /// Mean observation of a native histogram
    HistogramAvg,
}

impl Function {
    /// Whether the argument must be a range vector
    pub fn takes_range(&self) -> bool {
        matches!(self, Self::Rate | Self::Increase)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rate => write!(f, "rate"),
            Self::Increase => write!(f, "increase"),
            Self::HistogramSum => write!(f, "histogram_sum"),
            Self::HistogramAvg => write!(f, "histogram_avg"),
        }
    }
}
