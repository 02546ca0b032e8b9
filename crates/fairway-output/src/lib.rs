#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fairway/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod assessment;
pub mod export;
pub mod report;

pub use assessment::{
    BiasAssessment, BiasVerdict, DEFAULT_BIAS_THRESHOLD, DebiasingSuggestion,
    debiasing_suggestions,
};
pub use export::{ExportError, ExportFormat, Exporter};
pub use report::{AuditReport, DEFAULT_DATASET_NAME, ReportBuilder, ReportError, format_value};
