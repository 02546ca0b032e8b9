#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fairway/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auditor;
pub mod config;
pub mod error;

// Re-export main types from sub-crates
pub use fairway_data as data;
pub use fairway_metrics as metrics;
pub use fairway_output as output;

pub use auditor::{AuditRun, Auditor};
pub use config::AuditConfig;
pub use error::{AuditError, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
