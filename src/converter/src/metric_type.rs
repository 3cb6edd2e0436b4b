//! Metric type classification
//!
//! Datadog queries carry no type information, but the PromQL we emit depends
//! on it: histograms need `histogram_*` functions over `rate()`, counters need
//! `rate()`/`increase()`, and gauges must never be wrapped in either.
//!
//! The type is derived from the metric name with an ordered rule list. Rules
//! are evaluated top to bottom and the first match wins, so narrow exceptions
//! (`^apollo\.router\.cache\.size`) must be listed before the broad substring
//! rules they override (`.size`).

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Pattern of the unconditional fallback rule.
pub const DEFAULT_PATTERN: &str = "*";

/// OpenTelemetry metric kinds, as exposed by Dash0 in `otel_metric_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Distribution (latency, payload size); queried through bucket-aware functions
    Histogram,
    /// Instantaneous value; never rated
    Gauge,
    /// Monotonic counter
    Sum,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Histogram => "histogram",
            Self::Gauge => "gauge",
            Self::Sum => "sum",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A declarative classification rule, as stored in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTypeRule {
    /// `*`, an anchored `^...` regex, or a `|`-separated substring list
    pub pattern: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
}

impl MetricTypeRule {
    pub fn new(pattern: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            pattern: pattern.into(),
            metric_type,
        }
    }
}

#[derive(Debug, Clone)]
enum RuleMatcher {
    Default,
    Exact(Regex),
    Contains(Vec<String>),
}

impl RuleMatcher {
    fn compile(pattern: &str) -> Result<Self, ConfigError> {
        if pattern == DEFAULT_PATTERN {
            return Ok(Self::Default);
        }

        if pattern.starts_with('^') {
            // The end anchor is implicit: `^foo` must match the whole name.
            let regex = Regex::new(&format!("{pattern}$")).map_err(|source| {
                ConfigError::InvalidRulePattern {
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
            return Ok(Self::Exact(regex));
        }

        Ok(Self::Contains(
            pattern.split('|').map(str::to_string).collect(),
        ))
    }

    fn matches(&self, metric_name: &str) -> bool {
        match self {
            Self::Default => true,
            Self::Exact(regex) => regex.is_match(metric_name),
            Self::Contains(needles) => needles
                .iter()
                .any(|needle| metric_name.contains(needle.as_str())),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: MetricTypeRule,
    matcher: RuleMatcher,
}

/// An ordered, compiled rule list.
///
/// Compilation happens once when the rule table is loaded; classification
/// itself is total and never fails.
#[derive(Debug, Clone)]
pub struct MetricTypeRules {
    rules: Vec<CompiledRule>,
}

impl MetricTypeRules {
    /// Compile a rule list, preserving its order.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidRulePattern`] if an anchored rule is not
    /// a valid regular expression.
    pub fn compile(rules: &[MetricTypeRule]) -> Result<Self, ConfigError> {
        let rules = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    matcher: RuleMatcher::compile(&rule.pattern)?,
                    rule: rule.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { rules })
    }

    /// Classify a metric name. First matching rule wins; with no match and no
    /// `*` rule the result is [`MetricType::Gauge`].
    pub fn classify(&self, metric_name: &str) -> MetricType {
        self.rules
            .iter()
            .find(|compiled| compiled.matcher.matches(metric_name))
            .map(|compiled| compiled.rule.metric_type)
            .unwrap_or(MetricType::Gauge)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Non-fatal problems with the rule list.
    ///
    /// A list without a trailing `*` rule still classifies (unknown names fall
    /// back to gauge), but it is almost always a configuration mistake.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let defaults: Vec<usize> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, compiled)| matches!(compiled.matcher, RuleMatcher::Default))
            .map(|(idx, _)| idx)
            .collect();

        match defaults.as_slice() {
            [] => warnings.push(format!(
                "no default '{DEFAULT_PATTERN}' rule; unmatched metrics fall back to gauge"
            )),
            [idx] if *idx + 1 != self.rules.len() => warnings.push(format!(
                "default '{DEFAULT_PATTERN}' rule at position {} shadows {} later rule(s)",
                idx + 1,
                self.rules.len() - idx - 1
            )),
            [_] => {}
            [first, ..] => warnings.push(format!(
                "{} default '{DEFAULT_PATTERN}' rules; only the one at position {} is reachable",
                defaults.len(),
                first + 1
            )),
        }

        for compiled in &self.rules {
            if let RuleMatcher::Contains(needles) = &compiled.matcher
                && needles.iter().any(String::is_empty)
            {
                warnings.push(format!(
                    "rule '{}' contains an empty alternative and matches every metric",
                    compiled.rule.pattern
                ));
            }
        }

        warnings
    }
}
