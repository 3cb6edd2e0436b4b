//! Human-readable display names for converted queries
//!
//! Names describe the grouping when there is one (`By Subgraph name`,
//! `By name, kind`) and the aggregation otherwise (`Total`, `P95`, `Avg`).

use std::sync::LazyLock;

use regex::Regex;

use crate::attributes::AttributeMappings;
use crate::query::{Aggregation, ParsedQuery};

/// Name used when a query cannot be parsed.
pub const FALLBACK_NAME: &str = "Query";

static CAMEL_CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("invalid regex"));

/// Display name for a raw Datadog query, `"Query"` if it does not parse.
pub fn generate_query_name(query: &str) -> String {
    // Only the raw `by {}` attributes are used, so the mapping table is irrelevant.
    match ParsedQuery::parse(query, &AttributeMappings::new()) {
        Ok(parsed) => display_name(&parsed),
        Err(_) => FALLBACK_NAME.to_string(),
    }
}

/// Display name for an already parsed query.
pub fn display_name(parsed: &ParsedQuery) -> String {
    match parsed.by_clause.as_slice() {
        [] => {
            let aggregation = match &parsed.aggregation {
                Aggregation::Count => "Total".to_string(),
                other => other.to_string(),
            };
            capitalize(&aggregation)
        }
        [attribute] => {
            let spaced = attribute.replace('.', " ");
            let words = CAMEL_CASE_BOUNDARY.replace_all(&spaced, "$1 $2");
            format!("By {}", capitalize(&words))
        }
        attributes => {
            let leaves: Vec<&str> = attributes
                .iter()
                .map(|attribute| attribute.rsplit('.').next().unwrap_or(attribute))
                .collect();
            format!("By {}", leaves.join(", "))
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_attribute() {
        assert_eq!(
            generate_query_name("p95:http.server.request.duration{$service} by {subgraph.name}"),
            "By Subgraph name"
        );
        assert_eq!(
            generate_query_name("count:graphql.request{} by {operationName}"),
            "By Operation Name"
        );
        assert_eq!(generate_query_name("count:m{} by { host }"), "By Host");
    }

    #[test]
    fn test_multiple_attributes_use_last_segment() {
        assert_eq!(
            generate_query_name("count:m{} by {subgraph.name, apollo.router.cache.kind, host}"),
            "By name, kind, host"
        );
    }

    #[test]
    fn test_aggregation_names() {
        assert_eq!(generate_query_name("count:m{}.as_count()"), "Total");
        assert_eq!(generate_query_name("p95:m{}"), "P95");
        assert_eq!(generate_query_name("p50:m{}"), "P50");
        assert_eq!(generate_query_name("avg:m{}"), "Avg");
        assert_eq!(generate_query_name("sum:m{}"), "Sum");
        assert_eq!(generate_query_name("max:m{}"), "Max");
        assert_eq!(generate_query_name("min:m{}"), "Min");
    }

    #[test]
    fn test_percentile_token_passes_through() {
        assert_eq!(generate_query_name("p095:m{}"), "P095");
        assert_eq!(generate_query_name("p99999999999:m{}"), "P99999999999");
    }

    #[test]
    fn test_blank_by_tokens_count_as_attributes() {
        assert_eq!(generate_query_name("count:m{} by {a, }"), "By a, ");
        assert_eq!(generate_query_name("count:m{} by {a,,b}"), "By a, , b");
        assert_eq!(generate_query_name("count:m{} by { }"), "By ");
    }

    #[test]
    fn test_wildcard_grouping_is_not_named() {
        // Only an explicit clause names the query.
        assert_eq!(generate_query_name("count:m{service:*}.as_rate()"), "Total");
    }

    #[test]
    fn test_unparseable_falls_back() {
        assert_eq!(generate_query_name(""), "Query");
        assert_eq!(generate_query_name("invalid_query"), "Query");
        assert_eq!(generate_query_name("median:m{} by {host}"), "Query");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("p95"), "P95");
        assert_eq!(capitalize("état"), "État");
    }
}
