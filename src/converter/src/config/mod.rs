use std::path::Path;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};

use crate::attributes::{AttributeMapping, AttributeMappings};
use crate::error::ConfigError;
use crate::metric_type::{DEFAULT_PATTERN, MetricType, MetricTypeRule, MetricTypeRules};

/// Configuration file looked up in the working directory by [`Configuration::load`]
pub const CONFIG_FILE: &str = "dashconv.toml";
/// Prefix of environment overrides, e.g. `DASHCONV__ATTRIBUTE_MAPPINGS__MAPPINGS__TEAM=owner`
pub const ENV_PREFIX: &str = "DASHCONV__";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricTypesConfig {
    /// Ordered classification rules; the first match wins
    pub rules: Vec<MetricTypeRule>,
}

impl Default for MetricTypesConfig {
    fn default() -> Self {
        Self {
            rules: default_metric_type_rules(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeMappingsConfig {
    /// Datadog attribute name to Dash0 label name
    pub mappings: AttributeMappings,
}

impl Default for AttributeMappingsConfig {
    fn default() -> Self {
        Self {
            mappings: default_attribute_mappings(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Configuration {
    /// Metric type classification rules
    pub metric_types: MetricTypesConfig,
    /// Attribute name mappings
    pub attribute_mappings: AttributeMappingsConfig,
}

impl Configuration {
    /// Load the built-in tables, overlaid by `dashconv.toml` and `DASHCONV__*`
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(
            Figment::from(Serialized::defaults(Configuration::default()))
                .merge(Toml::file(CONFIG_FILE)),
        )
    }

    /// Like [`Configuration::load`], but reads the given file instead of
    /// `dashconv.toml`. Files ending in `.json` are parsed as JSON, anything
    /// else as TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let figment = Figment::from(Serialized::defaults(Configuration::default()));
        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => figment.merge(Json::file(path)),
            _ => figment.merge(Toml::file(path)),
        };
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    /// Compile the metric type rules.
    pub fn compile_rules(&self) -> Result<MetricTypeRules, ConfigError> {
        MetricTypeRules::compile(&self.metric_types.rules)
    }
}

/// Classification rules for Apollo Router metrics.
///
/// The exact `apollo.router.cache.size` rule must stay ahead of the broad
/// `.size` histogram rule.
pub fn default_metric_type_rules() -> Vec<MetricTypeRule> {
    vec![
        MetricTypeRule::new(r"^apollo\.router\.cache\.size", MetricType::Gauge),
        MetricTypeRule::new(
            "duration|.time|.size|request.body|evaluated_plans|evaluated_paths",
            MetricType::Histogram,
        ),
        MetricTypeRule::new(
            "operations|error|.total|active_requests|active_jobs",
            MetricType::Sum,
        ),
        MetricTypeRule::new(
            "cache|session|connections|pipelines|license|federation|jemalloc|queued",
            MetricType::Gauge,
        ),
        MetricTypeRule::new(DEFAULT_PATTERN, MetricType::Gauge),
    ]
}

/// Datadog attributes whose Dash0 label is not the plain dot-to-underscore form.
pub fn default_attribute_mappings() -> AttributeMappings {
    [
        ("http.response.status_code", "http_status_code"),
        ("subgraph.name", "subgraph_name"),
        ("host", "dash0_resource_name"),
        ("pod_name", "dash0_resource_name"),
        ("container_id", "dash0_resource_id"),
        ("environment", "env"),
        ("apollo_router_cache_kind", "kind"),
    ]
    .into_iter()
    .map(|(source, target)| (source, AttributeMapping::Name(target.to_string())))
    .collect()
}
