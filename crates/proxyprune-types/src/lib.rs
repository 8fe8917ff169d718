//! Stable DTOs used across the proxyprune workspace.
//!
//! This crate is intentionally boring:
//! - data types for findings and the emitted report
//! - canonical bundle-relative path handling
//! - the versioned report envelope

#![forbid(unsafe_code)]

pub mod findings;
pub mod path;
pub mod report;

pub use findings::{
    DanglingReference, FlowKind, OrphanResource, Phase, ReferenceSite, ResourceFootprint,
    SequentialRun, UnattachedPolicy,
};
pub use path::BundlePath;
pub use report::{BundleReport, ReportEnvelope, ToolMeta, SCHEMA_REPORT_V1};
