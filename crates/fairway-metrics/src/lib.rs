#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fairway/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod disparity;
pub mod error;
pub mod group;
pub mod label;
pub mod pipeline;
pub mod profile;
pub mod registry;
pub mod sensitive;

pub use disparity::{
    DisparitySummary, UndefinedRatePolicy, demographic_parity_difference,
    equalized_odds_difference,
};
pub use error::{MetricsError, Result};
pub use group::{ConfusionCounts, GroupMetrics, GroupMetricsTable, RateMetric, UndefinedRate};
pub use label::{DEFAULT_LABEL_COLUMN, OutcomeLabel};
pub use pipeline::{AuditOutcome, PipelineOptions, audit};
pub use profile::{FiveNumberSummary, GroupProfile, profile_groups};
pub use sensitive::{CanonicalLabels, Category, Normalization, SensitiveAttribute};

// Re-export registry types for convenience
pub use registry::{MetricInfo, MetricKind, available_metrics, get_metric_info, metrics_by_kind};
