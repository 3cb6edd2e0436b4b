//! Datadog attribute names to Dash0 label names
//!
//! Two rules, in order:
//! 1. an explicit entry in the mapping table wins
//! 2. otherwise every `.` becomes `_` (`http.status` → `http_status`)
//!
//! Several Datadog attributes may converge on one label (`host` and
//! `pod_name` both become `dash0_resource_name`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::syntax;

/// Target of a single mapping entry.
///
/// Accepts both the compact `"host" = "dash0_resource_name"` form and the
/// object form `{ dash0_name = "...", description = "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeMapping {
    Name(String),
    Detailed {
        dash0_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl AttributeMapping {
    pub fn target(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed { dash0_name, .. } => dash0_name,
        }
    }
}

/// Read-only lookup table from Datadog attribute to Dash0 label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMappings {
    entries: HashMap<String, AttributeMapping>,
}

impl AttributeMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(mut self, source: &str, target: &str) -> Self {
        self.entries
            .insert(source.to_string(), AttributeMapping::Name(target.to_string()));
        self
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(AttributeMapping::target)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by source name.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(source, mapping)| (source.as_str(), mapping.target()))
            .collect();
        entries.sort_unstable();
        entries
    }
}

impl<S: Into<String>> FromIterator<(S, AttributeMapping)> for AttributeMappings {
    fn from_iter<I: IntoIterator<Item = (S, AttributeMapping)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(source, mapping)| (source.into(), mapping))
                .collect(),
        }
    }
}

/// Map a Datadog attribute name to its Dash0 label name.
pub fn map_attribute_name(name: &str, mappings: &AttributeMappings) -> String {
    match mappings.get(name) {
        Some(target) => target.to_string(),
        None => name.replace('.', "_"),
    }
}

/// Grouping labels of a query, mapped and in query order.
///
/// An explicit `by {...}` clause is authoritative. Without one, wildcard
/// filters in the selector (`label:*`, `label:?`) are the grouping. The two
/// sources are never merged.
pub fn group_by_labels(query: &str, mappings: &AttributeMappings) -> Vec<String> {
    if let Some(clause) = syntax::by_clause(query) {
        return clause
            .split(',')
            .map(|attr| map_attribute_name(attr.trim(), mappings))
            .collect();
    }

    syntax::selector(query)
        .map(|selector| {
            syntax::wildcard_labels(selector)
                .map(|label| map_attribute_name(label, mappings))
                .collect()
        })
        .unwrap_or_default()
}

/// Grouping labels joined with `", "`, or the empty string when ungrouped.
pub fn extract_group_by(query: &str, mappings: &AttributeMappings) -> String {
    group_by_labels(query, mappings).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_attribute_mappings;

    #[test]
    fn test_explicit_mappings() {
        let mappings = default_attribute_mappings();
        assert_eq!(
            map_attribute_name("http.response.status_code", &mappings),
            "http_status_code"
        );
        assert_eq!(map_attribute_name("subgraph.name", &mappings), "subgraph_name");
        assert_eq!(map_attribute_name("environment", &mappings), "env");
        assert_eq!(map_attribute_name("apollo_router_cache_kind", &mappings), "kind");
    }

    #[test]
    fn test_many_to_one_mapping() {
        let mappings = default_attribute_mappings();
        assert_eq!(map_attribute_name("host", &mappings), "dash0_resource_name");
        assert_eq!(map_attribute_name("pod_name", &mappings), "dash0_resource_name");
    }

    #[test]
    fn test_default_dot_replacement() {
        let mappings = AttributeMappings::new();
        assert_eq!(map_attribute_name("http.status", &mappings), "http_status");
        assert_eq!(
            map_attribute_name("http.response.body.size", &mappings),
            "http_response_body_size"
        );
        assert_eq!(map_attribute_name("service", &mappings), "service");
        assert_eq!(map_attribute_name("http_response_code", &mappings), "http_response_code");
        assert_eq!(map_attribute_name("http.", &mappings), "http_");
        assert_eq!(map_attribute_name("http..status", &mappings), "http__status");
        assert_eq!(map_attribute_name("", &mappings), "");
    }

    #[test]
    fn test_detailed_entries_deserialize() {
        let mappings: AttributeMappings = serde_json::from_str(
            r#"{
                "host": {"dash0_name": "dash0_resource_name", "description": "k8s pod"},
                "environment": "env",
                "team": {"dash0_name": "owner", "notes": "ignored"}
            }"#,
        )
        .unwrap();

        assert_eq!(mappings.get("host"), Some("dash0_resource_name"));
        assert_eq!(mappings.get("environment"), Some("env"));
        assert_eq!(mappings.get("team"), Some("owner"));
        assert_eq!(mappings.len(), 3);
    }

    #[test]
    fn test_group_by_explicit_clause() {
        let mappings = default_attribute_mappings();
        assert_eq!(
            extract_group_by("count:http.request{service:api} by {service}", &mappings),
            "service"
        );
        assert_eq!(
            extract_group_by(
                "count:http.request{} by {service,  environment  , status}",
                &mappings
            ),
            "service, env, status"
        );
        assert_eq!(
            extract_group_by(
                "count:http.server.request.duration{$service} by {subgraph.name}.as_count()",
                &mappings
            ),
            "subgraph_name"
        );
        assert_eq!(
            extract_group_by("count:metric{} by {service-name}", &mappings),
            "service-name"
        );
    }

    #[test]
    fn test_group_by_unmapped_round_trip() {
        assert_eq!(
            extract_group_by("count:m{} by {a, b, c}", &AttributeMappings::new()),
            "a, b, c"
        );
    }

    #[test]
    fn test_group_by_keeps_blank_tokens() {
        let mappings = AttributeMappings::new();
        assert_eq!(extract_group_by("count:m{} by {a,,b}", &mappings), "a, , b");
        assert_eq!(extract_group_by("count:m{} by {a, }", &mappings), "a, ");
        assert_eq!(extract_group_by("count:m{service:*} by { }", &mappings), "");
    }

    #[test]
    fn test_custom_mapping_overrides_dot_replacement() {
        let mappings = AttributeMappings::new()
            .with_mapping("http.route", "route")
            .with_mapping("pod_name", "dash0_resource_name");
        assert_eq!(
            extract_group_by("count:m{} by {http.route, pod_name, http.method}", &mappings),
            "route, dash0_resource_name, http_method"
        );
        assert_eq!(mappings.sorted(), vec![("http.route", "route"), ("pod_name", "dash0_resource_name")]);
    }

    #[test]
    fn test_group_by_wildcard_fallback() {
        let mappings = default_attribute_mappings();
        assert_eq!(extract_group_by("count:http.request{service:*}", &mappings), "service");
        assert_eq!(
            extract_group_by("count:http.request{service:*, environment:*}", &mappings),
            "service, env"
        );
        assert_eq!(
            extract_group_by("count:http.request{service:*, status:?}", &mappings),
            "service, status"
        );
        assert_eq!(
            extract_group_by("count:http.request{http.response.status_code:*}", &mappings),
            "http_status_code"
        );
    }

    #[test]
    fn test_explicit_clause_beats_wildcards() {
        let mappings = default_attribute_mappings();
        assert_eq!(
            extract_group_by("count:http.request{service:*, status:?} by {service}", &mappings),
            "service"
        );
    }

    #[test]
    fn test_no_grouping() {
        let mappings = default_attribute_mappings();
        assert_eq!(extract_group_by("count:http.request{service:api}", &mappings), "");
        assert_eq!(extract_group_by("", &mappings), "");
        assert_eq!(extract_group_by("count:http.request", &mappings), "");
        assert_eq!(extract_group_by("count:metric{} by {}", &mappings), "");
        assert_eq!(extract_group_by("count:metric{service:api, status:200}", &mappings), "");
        assert_eq!(
            extract_group_by("count:http.request{$service, $environment} by {method}", &mappings),
            "method"
        );
    }
}
