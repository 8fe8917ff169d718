use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `proxyprune.yaml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so
/// forward-compat is easy. Validation happens at resolve time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunConfigV1 {
    /// Optional schema string for tooling (`proxyprune.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `local-proxy` (default) or `remote-proxy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// local-proxy: directory containing `*.zip` bundle archives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// remote-proxy: management organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,

    /// remote-proxy: optional environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,

    /// Proxy-name filters (glob patterns). Empty means all.
    #[serde(default)]
    pub proxies: Vec<String>,

    /// Worker cap for the per-bundle fan-out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<u32>,
}
