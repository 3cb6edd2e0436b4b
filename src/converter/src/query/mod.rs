//! Datadog query parsing
//!
//! A query is parsed once into a [`ParsedQuery`] that both the PromQL emitter
//! and the display-name generator consume.
//!
//! ```text
//! p95:http.server.request.duration{$service,!status:5*} by {subgraph.name}.as_count()
//! ```

use std::fmt;

use crate::attributes::{AttributeMappings, group_by_labels};
use crate::error::ConversionError;
use crate::syntax;

pub mod filter;

pub use filter::{Filter, extract_filters, filters_to_promql};

/// Datadog space aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    Count,
    Avg,
    Sum,
    Max,
    Min,
    /// `p<NN>` with the digits as written (`p095` stays `095`); the quantile
    /// is `NN / 100`
    Percentile(String),
}

impl Aggregation {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "count" => Some(Self::Count),
            "avg" => Some(Self::Avg),
            "sum" => Some(Self::Sum),
            "max" => Some(Self::Max),
            "min" => Some(Self::Min),
            other => other
                .strip_prefix('p')
                .filter(|rank| !rank.is_empty() && rank.bytes().all(|b| b.is_ascii_digit()))
                .map(|rank| Self::Percentile(rank.to_string())),
        }
    }

    /// Quantile argument for `histogram_quantile`, if this is a percentile.
    pub fn quantile(&self) -> Option<f64> {
        match self {
            Self::Percentile(rank) => Some(percentile_quantile(rank)),
            _ => None,
        }
    }
}

/// `rank / 100` for a string of ASCII digits. Ranks of any length convert.
pub(crate) fn percentile_quantile(rank: &str) -> f64 {
    let rank = rank
        .bytes()
        .fold(0.0, |acc, digit| acc * 10.0 + f64::from(digit - b'0'));
    rank / 100.0
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::Avg => write!(f, "avg"),
            Self::Sum => write!(f, "sum"),
            Self::Max => write!(f, "max"),
            Self::Min => write!(f, "min"),
            Self::Percentile(rank) => write!(f, "p{rank}"),
        }
    }
}

/// Rollup modifiers found anywhere in the raw query text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub as_count: bool,
    pub as_rate: bool,
}

impl Modifiers {
    fn scan(query: &str) -> Self {
        Self {
            as_count: query.contains(syntax::AS_COUNT),
            as_rate: query.contains(syntax::AS_RATE),
        }
    }
}

/// Structured form of a single Datadog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub aggregation: Aggregation,
    /// Trimmed metric name
    pub metric_name: String,
    pub filters: Vec<Filter>,
    /// Effective grouping, already mapped to Dash0 label names
    pub group_by: Vec<String>,
    /// Raw attribute names of an explicit `by {}` clause
    pub by_clause: Vec<String>,
    pub modifiers: Modifiers,
}

impl ParsedQuery {
    /// Parse a query, mapping group-by attributes through `mappings`.
    ///
    /// # Errors
    /// Returns [`ConversionError::UnparseableQuery`] when the query does not
    /// start with `count|avg|sum|max|min|p<NN>` followed by `:` and a metric
    /// name.
    pub fn parse(query: &str, mappings: &AttributeMappings) -> Result<Self, ConversionError> {
        let unparseable = || ConversionError::UnparseableQuery {
            query: query.to_string(),
        };

        let (token, metric) = syntax::aggregation_prefix(query).ok_or_else(unparseable)?;
        let aggregation = Aggregation::parse(token).ok_or_else(unparseable)?;

        // Blank tokens (`by {a, }`) are kept; they count for naming.
        let by_clause = syntax::by_clause(query)
            .map(|clause| clause.split(',').map(|attr| attr.trim().to_string()).collect())
            .unwrap_or_default();

        Ok(Self {
            aggregation,
            metric_name: metric.trim().to_string(),
            filters: extract_filters(query),
            group_by: group_by_labels(query, mappings),
            by_clause,
            modifiers: Modifiers::scan(query),
        })
    }

    /// Whether the rendered grouping is non-empty. A lone blank label
    /// (`by { }`) does not group.
    pub fn is_grouped(&self) -> bool {
        match self.group_by.as_slice() {
            [] => false,
            [label] => !label.is_empty(),
            _ => true,
        }
    }

    /// Grouping labels to emit; empty when the query is not grouped.
    pub fn grouping(&self) -> &[String] {
        if self.is_grouped() { &self.group_by } else { &[] }
    }
}
