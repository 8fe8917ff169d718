//! Use case orchestration for proxyprune.
//!
//! This crate coordinates the settings, bundle, domain, and render layers:
//! it discovers (or downloads) bundle archives, fans the per-bundle pipeline
//! out over a bounded worker pool, and writes the aggregate artifacts once
//! after every worker finished. The CLI crate depends on this; it only
//! handles argument parsing and process exit codes.

#![forbid(unsafe_code)]

mod pipeline;
mod run;

pub use pipeline::process_bundle;
pub use run::{ARTIFACT_REPORT_JSON, ARTIFACT_SEQUENTIAL, ARTIFACT_SIZE_SUMMARY,
    ARTIFACT_UNATTACHED, RunInput, RunSummary, run};
