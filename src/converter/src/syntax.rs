//! Lexical helpers for the Datadog query grammar
//!
//! ```text
//! AGGREGATION:metric.name{filter1,filter2,...} by {group1,group2}.modifier()
//! └─────────┘ └─────────┘└────────────────────┘ └────────────────┘└────────┘
//!   prefix      metric         selector            by clause       modifier
//! ```
//!
//! Matching is deliberately shallow: braces are not nested, and the first
//! `{` pairs with the first following `}`.

use std::sync::LazyLock;

use regex::Regex;

static AGGREGATION_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(count|avg|sum|max|min|p[0-9]+):([^{]+)").expect("invalid regex")
});

static BY_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"by \{([^}]+)\}").expect("invalid regex"));

static SELECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]*)\}").expect("invalid regex"));

static WILDCARD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*):[*?]").expect("invalid regex")
});

pub(crate) const AS_COUNT: &str = ".as_count()";
pub(crate) const AS_RATE: &str = ".as_rate()";

/// Split `count:metric{...}` into the aggregation token and the untrimmed
/// metric name (everything up to the first `{`).
pub(crate) fn aggregation_prefix(query: &str) -> Option<(&str, &str)> {
    let captures = AGGREGATION_PREFIX.captures(query)?;
    let aggregation = captures.get(1)?.as_str();
    let metric = captures.get(2)?.as_str();
    Some((aggregation, metric))
}

/// Contents of the first `by {...}` clause, if it is non-empty.
pub(crate) fn by_clause(query: &str) -> Option<&str> {
    BY_CLAUSE
        .captures(query)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Contents of the first brace block, which is the filter selector.
pub(crate) fn selector(query: &str) -> Option<&str> {
    SELECTOR
        .captures(query)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Labels carrying a bare `*` or `?` value, in the order they appear.
pub(crate) fn wildcard_labels(selector: &str) -> impl Iterator<Item = &str> {
    WILDCARD_LABEL
        .captures_iter(selector)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_prefix() {
        assert_eq!(
            aggregation_prefix("p95:http.server.request.duration{$service}"),
            Some(("p95", "http.server.request.duration"))
        );
        assert_eq!(
            aggregation_prefix("count: http.request  {service: api}"),
            Some(("count", " http.request  "))
        );
        assert_eq!(aggregation_prefix("count:metric"), Some(("count", "metric")));
        assert_eq!(aggregation_prefix("median:metric{}"), None);
        assert_eq!(aggregation_prefix("count metric{}"), None);
        assert_eq!(aggregation_prefix("count:{}"), None);
        assert_eq!(aggregation_prefix(""), None);
    }

    #[test]
    fn test_by_clause_requires_content() {
        assert_eq!(by_clause("count:m{} by {a, b}"), Some("a, b"));
        assert_eq!(by_clause("count:m{} by {}"), None);
        assert_eq!(by_clause("count:m{}"), None);
        assert_eq!(by_clause("count:m{a:b} by {x,y} extra{notused}"), Some("x,y"));
    }

    #[test]
    fn test_selector_is_first_block() {
        assert_eq!(selector("count:m{a:b} by {x}"), Some("a:b"));
        assert_eq!(selector("count:m{} by {x}"), Some(""));
        assert_eq!(selector("count:m"), None);
    }

    #[test]
    fn test_wildcard_labels() {
        let labels: Vec<&str> =
            wildcard_labels("subgraph.name:*, status:?, env:prod, !connector.source.name:*")
                .collect();
        assert_eq!(labels, vec!["subgraph.name", "status", "connector.source.name"]);

        assert_eq!(wildcard_labels("status:2*").count(), 0);
    }
}
