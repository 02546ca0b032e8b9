//! Metric Registry
//!
//! Central catalogue of every metric the engine reports. Allows lookup by
//! name for glossaries and command-line listings.

use crate::group::RateMetric;
use std::collections::HashMap;

/// Available metric kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Per-group rates (selection rate, TPR, FPR)
    GroupRate,
    /// Scalar gaps between groups
    Disparity,
}

/// Metric metadata
#[derive(Debug, Clone)]
pub struct MetricInfo {
    /// Metric name (unique identifier)
    pub name: &'static str,
    /// Metric kind
    pub kind: MetricKind,
    /// What the metric measures
    pub description: &'static str,
    /// How the metric is computed
    pub formula: &'static str,
}

/// Get all available metric info
pub fn available_metrics() -> Vec<MetricInfo> {
    vec![
        // Group rates
        MetricInfo {
            name: "selection_rate",
            kind: MetricKind::GroupRate,
            description: "Fraction of a group with outcome 1",
            formula: "count(pred = 1) / count(*)",
        },
        MetricInfo {
            name: "true_positive_rate",
            kind: MetricKind::GroupRate,
            description: "Fraction of a group's positive rows that are predicted positive",
            formula: "count(pred = 1 and truth = 1) / count(truth = 1)",
        },
        MetricInfo {
            name: "false_positive_rate",
            kind: MetricKind::GroupRate,
            description: "Fraction of a group's negative rows that are predicted positive",
            formula: "count(pred = 1 and truth = 0) / count(truth = 0)",
        },
        // Disparities
        MetricInfo {
            name: "demographic_parity_difference",
            kind: MetricKind::Disparity,
            description: "Absolute gap in selection rate between the two groups",
            formula: "|selection_rate[A] - selection_rate[B]|",
        },
        MetricInfo {
            name: "equalized_odds_difference",
            kind: MetricKind::Disparity,
            description: "Larger of the true-positive-rate gap and the false-positive-rate gap",
            formula: "max(|TPR[A] - TPR[B]|, |FPR[A] - FPR[B]|)",
        },
    ]
}

/// Get metrics by kind
pub fn metrics_by_kind(kind: MetricKind) -> Vec<MetricInfo> {
    available_metrics()
        .into_iter()
        .filter(|m| m.kind == kind)
        .collect()
}

/// Get metric info by name
pub fn get_metric_info(name: &str) -> Option<MetricInfo> {
    available_metrics().into_iter().find(|m| m.name == name)
}

/// Get the registry entry for a group rate
pub fn rate_info(metric: RateMetric) -> Option<MetricInfo> {
    get_metric_info(&metric.to_string())
}

/// Get a map of all metrics indexed by name
pub fn metric_map() -> HashMap<&'static str, MetricInfo> {
    available_metrics()
        .into_iter()
        .map(|m| (m.name, m))
        .collect()
}

/// List all metric names
pub fn list_metric_names() -> Vec<&'static str> {
    available_metrics().into_iter().map(|m| m.name).collect()
}
