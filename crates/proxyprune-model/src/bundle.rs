use crate::FileTree;
use proxyprune_types::BundlePath;
use std::collections::BTreeMap;

/// Root aggregate for one input archive.
///
/// `endpoints` holds proxy endpoints before target endpoints, each group in
/// file order; `policies` is in declaration (file) order. The raw file tree
/// is carried alongside the parsed model so a rewrite can excise files while
/// leaving untouched descriptors byte-for-byte.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyBundle {
    pub name: String,
    pub files: FileTree,
    /// Aggregate manifest descriptor, when the bundle has one.
    pub manifest: Option<BundlePath>,
    pub endpoints: Vec<Endpoint>,
    pub policies: Vec<PolicyDefinition>,
    pub resources: Vec<Resource>,
}

impl ProxyBundle {
    pub fn policy(&self, name: &str) -> Option<&PolicyDefinition> {
        self.policies.iter().find(|p| p.name == name)
    }

    pub fn resource_by_url(&self, url: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.url == url)
    }

    /// Policy name -> definition, for reference-graph lookups.
    pub fn policy_index(&self) -> BTreeMap<&str, &PolicyDefinition> {
        self.policies.iter().map(|p| (p.name.as_str(), p)).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointKind {
    Proxy,
    Target,
}

/// A proxy-side or target-side entry point owning flow definitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub kind: EndpointKind,
    pub name: String,
    /// Descriptor file this endpoint was parsed from.
    pub path: BundlePath,
    pub pre_flow: Option<Flow>,
    pub conditional_flows: Vec<Flow>,
    pub post_flow: Option<Flow>,
    pub fault_rules: Vec<FaultRule>,
    pub default_fault_rule: Option<FaultRule>,
}

/// An ordered step sequence split into request and response phases.
///
/// The routing condition is opaque text; only presence/absence is ever used.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flow {
    pub name: Option<String>,
    pub condition: Option<String>,
    pub request: Vec<Step>,
    pub response: Vec<Step>,
}

/// Fault rules own steps directly, outside the request/response split.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaultRule {
    pub name: Option<String>,
    pub condition: Option<String>,
    pub steps: Vec<Step>,
}

/// One invocation site: a policy name plus an optional condition expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub policy: String,
    pub condition: Option<String>,
}

impl Step {
    /// An absent, empty, or whitespace-only condition counts as unconditioned.
    pub fn is_unconditioned(&self) -> bool {
        self.condition
            .as_deref()
            .is_none_or(|c| c.trim().is_empty())
    }
}

/// A declared policy: unique name, type tag, and embedded resource references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyDefinition {
    pub name: String,
    /// Root element tag of the descriptor, as written (e.g. `Javascript`).
    pub type_tag: String,
    pub path: BundlePath,
    /// Type-qualified resource references found in the body (e.g. `jsc://sum.js`).
    pub resources: Vec<String>,
}

impl PolicyDefinition {
    pub fn is_script(&self) -> bool {
        self.type_tag.eq_ignore_ascii_case("javascript")
    }
}

/// A file under the bundle's resource area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    /// Type-qualified reference form: `<type>://<file>`.
    pub url: String,
    pub path: BundlePath,
}
