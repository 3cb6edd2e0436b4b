//! Query conversion entry point
//!
//! [`QueryConverter`] owns the compiled rule tables and turns Datadog queries
//! into PromQL plus a display name. It is immutable after construction and can
//! be shared across threads.

use serde::Serialize;

use crate::attributes::AttributeMappings;
use crate::config::Configuration;
use crate::error::{ConfigError, ConversionError};
use crate::metric_type::MetricTypeRules;
use crate::naming::display_name;
use crate::promql::emit;
use crate::query::ParsedQuery;

/// Result of converting one Datadog query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedQuery {
    /// The Datadog query as given
    pub query: String,
    pub promql: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct QueryConverter {
    rules: MetricTypeRules,
    mappings: AttributeMappings,
}

impl QueryConverter {
    pub fn new(rules: MetricTypeRules, mappings: AttributeMappings) -> Self {
        Self { rules, mappings }
    }

    /// Compile the tables of a loaded configuration.
    ///
    /// Rule table problems that do not prevent conversion are logged.
    pub fn from_config(config: &Configuration) -> Result<Self, ConfigError> {
        let rules = config.compile_rules()?;
        for warning in rules.warnings() {
            log::warn!("Metric type rules: {warning}");
        }

        log::debug!(
            "Loaded {} metric type rules and {} attribute mappings",
            rules.len(),
            config.attribute_mappings.mappings.len()
        );

        Ok(Self::new(rules, config.attribute_mappings.mappings.clone()))
    }

    /// Convert one query.
    ///
    /// # Errors
    /// Returns [`ConversionError::UnparseableQuery`] for queries without an
    /// `AGG:metric` prefix.
    pub fn convert(&self, query: &str) -> Result<ConvertedQuery, ConversionError> {
        let parsed = ParsedQuery::parse(query, &self.mappings)?;
        let metric_type = self.rules.classify(&parsed.metric_name);
        log::debug!("Classified {} as {metric_type}", parsed.metric_name);

        Ok(ConvertedQuery {
            query: query.to_string(),
            promql: emit(&parsed, metric_type, &self.mappings).to_string(),
            display_name: display_name(&parsed),
        })
    }

    /// Convert every query, skipping (and logging) the ones that fail.
    pub fn convert_all<Q: AsRef<str>>(&self, queries: &[Q]) -> Vec<ConvertedQuery> {
        queries
            .iter()
            .map(AsRef::as_ref)
            .filter_map(|query| match self.convert(query) {
                Ok(converted) => Some(converted),
                Err(_) => {
                    log::warn!("Could not convert query: {query}");
                    None
                }
            })
            .collect()
    }
}
