//! Selector filters: `{service:api, !status:5*, $env}`

use crate::attributes::{AttributeMappings, map_attribute_name};
use crate::promql::types::LabelMatcher;
use crate::syntax;

/// A single `key:value` predicate from the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Datadog attribute name, before mapping
    pub key: String,
    pub value: String,
    /// Set by a leading `!`
    pub negate: bool,
    /// Value contains `*` or `?`
    pub is_wildcard: bool,
}

impl Filter {
    /// Parse one comma-separated selector token.
    ///
    /// Returns `None` for template variables (`$service`, `!$env`) and for
    /// tokens without a `:`.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let (negate, token) = match token.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, token),
        };

        if token.starts_with('$') {
            return None;
        }

        let (key, value) = token.split_once(':')?;
        Some(Self {
            key: key.to_string(),
            value: value.to_string(),
            negate,
            is_wildcard: value.contains(['*', '?']),
        })
    }

    /// Render as a PromQL label matcher, mapping the key.
    ///
    /// Wildcards become regexes (`*` → `.*`, `?` → `.`); everything else is
    /// an exact, quoted string match, including `true`/`false`.
    pub fn to_matcher(&self, mappings: &AttributeMappings) -> LabelMatcher {
        let name = map_attribute_name(&self.key, mappings);

        match (self.is_wildcard, self.negate) {
            (true, negate) => {
                let pattern = self.value.replace('*', ".*").replace('?', ".");
                if negate {
                    LabelMatcher::regex_not_match(&name, &pattern)
                } else {
                    LabelMatcher::regex_match(&name, &pattern)
                }
            }
            (false, true) => LabelMatcher::not_equal(&name, &self.value),
            (false, false) => LabelMatcher::equal(&name, &self.value),
        }
    }
}

/// Filters of the first brace block, in order.
pub fn extract_filters(query: &str) -> Vec<Filter> {
    syntax::selector(query)
        .map(|selector| selector.split(',').filter_map(Filter::parse).collect())
        .unwrap_or_default()
}

/// Filters as `", "`-joined PromQL label matchers, or the empty string.
pub fn filters_to_promql(filters: &[Filter], mappings: &AttributeMappings) -> String {
    filters
        .iter()
        .map(|filter| filter.to_matcher(mappings).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_attribute_mappings;

    #[test]
    fn test_parse_exact_filter() {
        let filter = Filter::parse(" service:api ").unwrap();
        assert_eq!(filter.key, "service");
        assert_eq!(filter.value, "api");
        assert!(!filter.negate);
        assert!(!filter.is_wildcard);
    }

    #[test]
    fn test_parse_negated_wildcard() {
        let filter = Filter::parse("!http.response.status_code:2*").unwrap();
        assert_eq!(filter.key, "http.response.status_code");
        assert_eq!(filter.value, "2*");
        assert!(filter.negate);
        assert!(filter.is_wildcard);
    }

    #[test]
    fn test_template_variables_and_bare_tokens_are_skipped() {
        assert_eq!(Filter::parse("$service"), None);
        assert_eq!(Filter::parse("!$env"), None);
        assert_eq!(Filter::parse("bare"), None);
        assert_eq!(Filter::parse(""), None);
    }

    #[test]
    fn test_value_keeps_everything_after_first_colon() {
        let filter = Filter::parse("url:http://host:8080").unwrap();
        assert_eq!(filter.key, "url");
        assert_eq!(filter.value, "http://host:8080");
    }

    #[test]
    fn test_extract_filters_from_first_block() {
        let filters = extract_filters(
            "count:http.server.request.duration{$service,$env,!status:5*,graphql.errors:true} by {x}",
        );
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].key, "status");
        assert_eq!(filters[1].value, "true");

        assert!(extract_filters("count:m{} by {a:b}").is_empty());
        assert!(extract_filters("count:m").is_empty());
    }

    #[test]
    fn test_filters_to_promql() {
        let mappings = default_attribute_mappings();
        let filters = extract_filters(
            "count:m{service:api, !environment:dev, status:2*, !http.response.status_code:4*, kind:?, graphql.errors:true}",
        );

        assert_eq!(
            filters_to_promql(&filters, &mappings),
            r#"service="api", env!="dev", status=~"2.*", http_status_code!~"4.*", kind=~".", graphql_errors="true""#
        );
        assert_eq!(filters_to_promql(&[], &mappings), "");
    }

    #[test]
    fn test_wildcard_filter_is_permissive_regex() {
        let mappings = AttributeMappings::new();
        let filters = extract_filters("count:m{subgraph.name:*}");
        assert_eq!(filters_to_promql(&filters, &mappings), r#"subgraph_name=~".*""#);
    }
}
