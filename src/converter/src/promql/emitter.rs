//! Parsed Datadog query to PromQL expression
//!
//! The function composition depends on the aggregation, the metric type and
//! whether the query is grouped. A handful of metrics deviate from the generic
//! table; they are listed in [`METRIC_OVERRIDES`] and consulted first.

use super::expr::{Expr, Selector};
use super::types::{AggregationOp, Function};
use crate::attributes::AttributeMappings;
use crate::error::ConversionError;
use crate::metric_type::{MetricType, MetricTypeRules};
use crate::query::{Aggregation, ParsedQuery, percentile_quantile};

/// What a `count` query measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMode {
    /// Per-second throughput, `.as_rate()`
    Rate,
    /// Observations in the window, `.as_count()`
    Total,
}

/// Exception to the generic dispatch for one exact metric name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricOverride {
    pub metric_name: &'static str,
    /// Mode of a `count` query without `.as_count()` / `.as_rate()`
    pub default_count: CountMode,
    /// Collapse ungrouped totals into a single series before `histogram_sum`
    pub sum_ungrouped_totals: bool,
}

/// Per-metric overrides, keyed by exact metric name.
///
/// The router's request duration histogram carries one series per operation;
/// its counts are always collapsed.
pub const METRIC_OVERRIDES: &[MetricOverride] = &[MetricOverride {
    metric_name: "http.server.request.duration",
    default_count: CountMode::Total,
    sum_ungrouped_totals: true,
}];

/// Look up the override for an exact metric name.
pub fn metric_override(metric_name: &str) -> Option<&'static MetricOverride> {
    METRIC_OVERRIDES
        .iter()
        .find(|entry| entry.metric_name == metric_name)
}

/// Convert a Datadog query into a PromQL string.
///
/// # Errors
/// Returns [`ConversionError::UnparseableQuery`] if the query lacks the
/// `AGG:metric` prefix.
pub fn convert_to_promql(
    query: &str,
    rules: &MetricTypeRules,
    mappings: &AttributeMappings,
) -> Result<String, ConversionError> {
    let parsed = ParsedQuery::parse(query, mappings)?;
    let metric_type = rules.classify(&parsed.metric_name);
    Ok(emit(&parsed, metric_type, mappings).to_string())
}

/// Build the expression tree for an already parsed and classified query.
pub fn emit(parsed: &ParsedQuery, metric_type: MetricType, mappings: &AttributeMappings) -> Expr {
    let selector = Selector::new(&parsed.metric_name, metric_type).with_matchers(
        parsed
            .filters
            .iter()
            .map(|filter| filter.to_matcher(mappings))
            .collect(),
    );
    let overrides = metric_override(&parsed.metric_name);
    let group_by = parsed.grouping();

    let expr = match &parsed.aggregation {
        Aggregation::Percentile(rank) => {
            // histogram_quantile needs the bucket label to survive aggregation
            let grouping = if parsed.is_grouped() {
                let mut grouping = group_by.to_vec();
                grouping.push("le".to_string());
                grouping
            } else {
                Vec::new()
            };
            Expr::histogram_quantile(
                percentile_quantile(rank),
                Expr::aggregate(AggregationOp::Sum, &grouping, rate(selector)),
            )
        }
        Aggregation::Count => {
            let mode = if parsed.modifiers.as_rate {
                CountMode::Rate
            } else if parsed.modifiers.as_count {
                CountMode::Total
            } else {
                overrides.map_or(CountMode::Rate, |entry| entry.default_count)
            };

            match mode {
                CountMode::Rate => Expr::aggregate(AggregationOp::Sum, group_by, rate(selector)),
                CountMode::Total => {
                    let increase = Expr::call(Function::Increase, Expr::range(selector));
                    let collapse = overrides.is_some_and(|entry| entry.sum_ungrouped_totals);
                    let inner = if parsed.is_grouped() || collapse {
                        Expr::aggregate(AggregationOp::Sum, group_by, increase)
                    } else {
                        increase
                    };
                    Expr::call(Function::HistogramSum, inner)
                }
            }
        }
        Aggregation::Sum => match metric_type {
            MetricType::Histogram => Expr::call(
                Function::HistogramSum,
                sum_if_grouped(group_by, rate(selector)),
            ),
            MetricType::Sum => Expr::aggregate(AggregationOp::Sum, group_by, rate(selector)),
            MetricType::Gauge => {
                Expr::aggregate(AggregationOp::Sum, group_by, Expr::selector(selector))
            }
        },
        Aggregation::Avg => match metric_type {
            MetricType::Histogram => Expr::call(
                Function::HistogramAvg,
                sum_if_grouped(group_by, rate(selector)),
            ),
            MetricType::Gauge | MetricType::Sum => {
                Expr::aggregate(AggregationOp::Avg, group_by, Expr::selector(selector))
            }
        },
        Aggregation::Max | Aggregation::Min => {
            let op = if parsed.aggregation == Aggregation::Max {
                AggregationOp::Max
            } else {
                AggregationOp::Min
            };
            match metric_type {
                // Dash0 rejects max/min on delta histograms; the mean is the
                // closest available aggregate.
                MetricType::Histogram => Expr::call(
                    Function::HistogramAvg,
                    Expr::aggregate(AggregationOp::Sum, group_by, rate(selector)),
                ),
                MetricType::Sum => Expr::aggregate(op, group_by, rate(selector)),
                MetricType::Gauge => Expr::aggregate(op, group_by, Expr::selector(selector)),
            }
        }
    };

    log::debug!(
        "Emitting {} on {} metric {}: {expr}",
        parsed.aggregation,
        metric_type,
        parsed.metric_name
    );
    expr
}

fn rate(selector: Selector) -> Expr {
    Expr::call(Function::Rate, Expr::range(selector))
}

fn sum_if_grouped(group_by: &[String], expr: Expr) -> Expr {
    if group_by.is_empty() {
        expr
    } else {
        Expr::aggregate(AggregationOp::Sum, group_by, expr)
    }
}
