use crate::findings::{DanglingReference, OrphanResource, SequentialRun, UnattachedPolicy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for the machine-readable report.
pub const SCHEMA_REPORT_V1: &str = "proxyprune.report.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// Everything the pipeline learned about one bundle.
///
/// A bundle that could not be analyzed at all carries `skipped` and nothing
/// else; a bundle whose rewrite failed carries findings plus `not_rewritten`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BundleReport {
    pub bundle: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unattached: Vec<UnattachedPolicy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dangling: Vec<DanglingReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphan_resources: Vec<OrphanResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequential_runs: Vec<SequentialRun>,

    /// Archive byte size of the input bundle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_bytes: Option<u64>,
    /// Archive byte size after rewriting, when a rewrite was persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_bytes: Option<u64>,
    /// Why a requested rewrite was not applied (the bundle was left untouched).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_rewritten: Option<String>,
}

impl BundleReport {
    pub fn new(bundle: impl Into<String>) -> Self {
        Self {
            bundle: bundle.into(),
            skipped: None,
            unattached: Vec::new(),
            dangling: Vec::new(),
            orphan_resources: Vec::new(),
            sequential_runs: Vec::new(),
            original_bytes: None,
            cleaned_bytes: None,
            not_rewritten: None,
        }
    }

    pub fn skipped(bundle: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut report = Self::new(bundle);
        report.skipped = Some(reason.into());
        report
    }
}

/// Versioned outer shape of `report.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope {
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    /// Per-bundle results, sorted by bundle name.
    pub bundles: Vec<BundleReport>,
}
