use crate::BundlePath;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which flow container of an endpoint a step lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FlowKind {
    PreFlow,
    Conditional,
    PostFlow,
    FaultRule,
    DefaultFaultRule,
}

/// Execution phase of a step. Fault-rule steps live outside the
/// request/response split and carry the distinguished `Fault` phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Request,
    Response,
    Fault,
}

/// One place that invokes a policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceSite {
    pub endpoint: String,
    pub flow_kind: FlowKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_name: Option<String>,
    pub phase: Phase,
    /// Whether the step carries a non-empty condition expression.
    pub conditioned: bool,
}

/// A step naming a policy that has no definition in the bundle.
///
/// One warning per offending step; the reference still counts, so the name is
/// never misreported as unattached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DanglingReference {
    pub policy: String,
    pub site: ReferenceSite,
}

/// Byte footprint of a resource file referenced from a policy body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceFootprint {
    /// Type-qualified reference form, e.g. `jsc://sum.js`.
    pub url: String,
    /// File-tree path, when the referenced file actually exists in the bundle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<BundlePath>,
    pub bytes: u64,
}

/// A declared policy with zero reference sites, plus what removing it frees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UnattachedPolicy {
    pub name: String,
    pub descriptor: BundlePath,
    pub descriptor_bytes: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceFootprint>,
}

/// A maximal run of two or more adjacent unconditioned script-type steps
/// within one flow phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SequentialRun {
    pub endpoint: String,
    pub flow_kind: FlowKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_name: Option<String>,
    pub phase: Phase,
    /// Zero-based index of the first step of the run within its step list.
    pub start_index: usize,
    pub policies: Vec<String>,
}

impl SequentialRun {
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// A resource file no declared policy references. Reported, never removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OrphanResource {
    pub url: String,
    pub path: BundlePath,
}
