#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fairway/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod error;
pub mod records;

pub use columns::{ColumnMapping, ColumnRole};
pub use error::{DataError, Result};
pub use records::RecordSet;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
