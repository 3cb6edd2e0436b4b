//! Datadog metric queries to Dash0 PromQL
//!
//! Converts queries of the form
//!
//! ```text
//! AGGREGATION:metric.name{filters} by {groups}.as_count()
//! ```
//!
//! into PromQL against Dash0's OpenTelemetry series, where each metric is
//! selected by its `otel_metric_name` and `otel_metric_type` labels.
//!
//! The conversion is driven by two tables, both part of [`config::Configuration`]:
//! an ordered list of metric type rules and a map of attribute name overrides.
//!
//! # Example
//!
//! ```
//! use converter::{Configuration, QueryConverter};
//!
//! let converter = QueryConverter::from_config(&Configuration::default())?;
//! let converted = converter.convert("p95:http.server.request.duration{} by {subgraph.name}")?;
//!
//! assert_eq!(converted.display_name, "By Subgraph name");
//! assert!(converted.promql.starts_with("histogram_quantile(0.95, sum by (subgraph_name, le)"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod attributes;
pub mod config;
pub mod converter;
pub mod error;
pub mod metric_type;
pub mod naming;
pub mod promql;
pub mod query;
mod syntax;

pub use attributes::{AttributeMapping, AttributeMappings, extract_group_by, map_attribute_name};
pub use config::Configuration;
pub use converter::{ConvertedQuery, QueryConverter};
pub use error::{ConfigError, ConversionError};
pub use metric_type::{MetricType, MetricTypeRule, MetricTypeRules};
pub use naming::generate_query_name;
pub use promql::convert_to_promql;
pub use query::{Filter, ParsedQuery, extract_filters, filters_to_promql};
