//! Minimal PromQL expression tree
//!
//! Only the shapes the converter emits are representable:
//!
//! ```text
//! histogram_quantile(0.95, sum by (subgraph_name, le) (rate({...}[2m])))
//! └──── Quantile ────────┘ └──── Aggregate ────────┘  └Call┘└ Range ┘
//! ```
//!
//! Rendering goes through `Display`; spacing matches what Dash0 dashboards
//! have always contained, so generated queries diff cleanly.

use std::fmt;

use super::types::{AggregationOp, Function, LabelMatcher};
use crate::metric_type::MetricType;

/// Label carrying the OpenTelemetry metric name
pub const OTEL_METRIC_NAME: &str = "otel_metric_name";
/// Label carrying the OpenTelemetry metric type
pub const OTEL_METRIC_TYPE: &str = "otel_metric_type";
/// Lookback window of every `rate()` / `increase()`
pub const RATE_WINDOW: &str = "2m";

/// Instant vector selector identifying one OTel metric.
///
/// The two identifying labels always come first, followed by the filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub metric_name: String,
    pub metric_type: MetricType,
    pub matchers: Vec<LabelMatcher>,
}

impl Selector {
    pub fn new(metric_name: &str, metric_type: MetricType) -> Self {
        Self {
            metric_name: metric_name.to_string(),
            metric_type,
            matchers: Vec::new(),
        }
    }

    pub fn with_matchers(mut self, matchers: Vec<LabelMatcher>) -> Self {
        self.matchers = matchers;
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{OTEL_METRIC_NAME} = \"{}\", {OTEL_METRIC_TYPE} = \"{}\"",
            self.metric_name, self.metric_type
        )?;
        for matcher in &self.matchers {
            write!(f, ", {matcher}")?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `{...}`
    Selector(Selector),
    /// `{...}[2m]`
    Range { selector: Selector, window: String },
    /// `func(arg)`
    Call { func: Function, arg: Box<Expr> },
    /// `op(expr)` or `op by (labels) (expr)`
    Aggregate {
        op: AggregationOp,
        grouping: Vec<String>,
        expr: Box<Expr>,
    },
    /// `histogram_quantile(q, expr)`
    HistogramQuantile { quantile: f64, expr: Box<Expr> },
}

impl Expr {
    pub fn selector(selector: Selector) -> Self {
        Self::Selector(selector)
    }

    /// Range vector over the fixed [`RATE_WINDOW`].
    pub fn range(selector: Selector) -> Self {
        Self::Range {
            selector,
            window: RATE_WINDOW.to_string(),
        }
    }

    pub fn call(func: Function, arg: Expr) -> Self {
        Self::Call {
            func,
            arg: Box::new(arg),
        }
    }

    pub fn aggregate(op: AggregationOp, grouping: &[String], expr: Expr) -> Self {
        Self::Aggregate {
            op,
            grouping: grouping.to_vec(),
            expr: Box::new(expr),
        }
    }

    pub fn histogram_quantile(quantile: f64, expr: Expr) -> Self {
        Self::HistogramQuantile {
            quantile,
            expr: Box::new(expr),
        }
    }

    /// Check if the expression contains a range vector
    pub fn has_range_vector(&self) -> bool {
        match self {
            Self::Selector(_) => false,
            Self::Range { .. } => true,
            Self::Call { arg, .. } => arg.has_range_vector(),
            Self::Aggregate { expr, .. } | Self::HistogramQuantile { expr, .. } => {
                expr.has_range_vector()
            }
        }
    }

    /// Check if `func` is applied anywhere in the expression
    pub fn uses_function(&self, func: Function) -> bool {
        match self {
            Self::Selector(_) | Self::Range { .. } => false,
            Self::Call { func: f, arg } => *f == func || arg.uses_function(func),
            Self::Aggregate { expr, .. } | Self::HistogramQuantile { expr, .. } => {
                expr.uses_function(func)
            }
        }
    }

    /// The selector at the leaf of the expression
    pub fn selector_ref(&self) -> &Selector {
        match self {
            Self::Selector(selector) | Self::Range { selector, .. } => selector,
            Self::Call { arg, .. } => arg.selector_ref(),
            Self::Aggregate { expr, .. } | Self::HistogramQuantile { expr, .. } => {
                expr.selector_ref()
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(selector) => write!(f, "{selector}"),
            Self::Range { selector, window } => write!(f, "{selector}[{window}]"),
            Self::Call { func, arg } => write!(f, "{func}({arg})"),
            Self::Aggregate {
                op,
                grouping,
                expr,
            } => {
                if grouping.is_empty() {
                    write!(f, "{op}({expr})")
                } else {
                    write!(f, "{op} by ({}) ({expr})", grouping.join(", "))
                }
            }
            Self::HistogramQuantile { quantile, expr } => {
                write!(f, "histogram_quantile({quantile}, {expr})")
            }
        }
    }
}
