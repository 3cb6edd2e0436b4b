//! PromQL generation for Dash0
//!
//! Dash0 exposes OpenTelemetry metrics through PromQL, identifying each series
//! by `otel_metric_name` and `otel_metric_type` labels instead of a mangled
//! metric name.
//!
//! # Architecture
//!
//! ```text
//! ParsedQuery + MetricType → emitter → Expr → Display → PromQL string
//! ```
//!
//! # Modules
//!
//! - [`types`] - label matchers, aggregation operators and functions
//! - [`expr`] - the expression tree and its rendering
//! - [`emitter`] - the dispatch from Datadog aggregation to PromQL shape
//!
//! # Emitted shapes
//!
//! ## Histograms
//! - `histogram_quantile(q, sum by (..., le) (rate(...[2m])))`
//! - `histogram_sum(...)`, `histogram_avg(...)` over `rate()` or `increase()`
//!
//! ## Counters
//! - `sum(rate(...[2m]))`, `max(rate(...[2m]))`
//!
//! ## Gauges
//! - `sum(...)`, `avg(...)`, `max(...)`, `min(...)`, never rated

pub mod emitter;
pub mod expr;
pub mod types;

pub use emitter::{convert_to_promql, emit};
pub use expr::{Expr, Selector};
