//! Error types for query conversion and rule-table loading

use thiserror::Error;

/// Errors that can occur while converting a single Datadog query.
///
/// There is exactly one failure mode: the query does not start with a
/// recognised `aggregation:metric` prefix. Every other irregularity (unknown
/// metric, unmapped attribute, empty grouping) has a defined fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Missing or malformed aggregation prefix (e.g. `not-a-query`, `""`).
    #[error("Unparseable query '{query}': expected AGGREGATION:metric{{...}}")]
    UnparseableQuery { query: String },
}

/// Errors raised while loading or compiling rule tables.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An anchored (`^`) metric-type rule is not a valid regular expression.
    #[error("Invalid metric type rule pattern '{pattern}': {source}")]
    InvalidRulePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// The layered configuration could not be extracted.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}
