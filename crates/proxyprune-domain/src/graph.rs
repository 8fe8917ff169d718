use proxyprune_model::{FaultRule, Flow, ProxyBundle, Step};
use proxyprune_types::{DanglingReference, FlowKind, Phase, ReferenceSite};
use std::collections::BTreeMap;

/// Every referenced policy name mapped to its reference sites.
///
/// Site order is the fixed traversal order: endpoints in file order (proxy
/// endpoints before target endpoints), then PreFlow, conditional flows in
/// declared order, PostFlow, fault rules in declared order, default fault
/// rule; request steps before response steps within a flow. The order is
/// load-bearing: reports must be reproducible across runs.
#[derive(Clone, Debug, Default)]
pub struct ReferenceGraph {
    pub sites: BTreeMap<String, Vec<ReferenceSite>>,
    /// Steps naming a policy with no definition. Still counted as references.
    pub dangling: Vec<DanglingReference>,
}

impl ReferenceGraph {
    pub fn is_referenced(&self, policy: &str) -> bool {
        self.sites.get(policy).is_some_and(|s| !s.is_empty())
    }
}

pub fn build_reference_graph(bundle: &ProxyBundle) -> ReferenceGraph {
    let defined = bundle.policy_index();
    let mut graph = ReferenceGraph::default();

    for endpoint in &bundle.endpoints {
        let mut record = |step: &Step, flow_kind: FlowKind, flow_name: Option<&str>, phase: Phase| {
            let site = ReferenceSite {
                endpoint: endpoint.name.clone(),
                flow_kind,
                flow_name: flow_name.map(str::to_string),
                phase,
                conditioned: !step.is_unconditioned(),
            };
            if !defined.contains_key(step.policy.as_str()) {
                graph.dangling.push(DanglingReference {
                    policy: step.policy.clone(),
                    site: site.clone(),
                });
            }
            graph
                .sites
                .entry(step.policy.clone())
                .or_default()
                .push(site);
        };

        if let Some(flow) = &endpoint.pre_flow {
            record_flow(flow, FlowKind::PreFlow, &mut record);
        }
        for flow in &endpoint.conditional_flows {
            record_flow(flow, FlowKind::Conditional, &mut record);
        }
        if let Some(flow) = &endpoint.post_flow {
            record_flow(flow, FlowKind::PostFlow, &mut record);
        }
        for rule in &endpoint.fault_rules {
            record_fault_rule(rule, FlowKind::FaultRule, &mut record);
        }
        if let Some(rule) = &endpoint.default_fault_rule {
            record_fault_rule(rule, FlowKind::DefaultFaultRule, &mut record);
        }
    }

    graph
}

fn record_flow(
    flow: &Flow,
    kind: FlowKind,
    record: &mut impl FnMut(&Step, FlowKind, Option<&str>, Phase),
) {
    for step in &flow.request {
        record(step, kind, flow.name.as_deref(), Phase::Request);
    }
    for step in &flow.response {
        record(step, kind, flow.name.as_deref(), Phase::Response);
    }
}

fn record_fault_rule(
    rule: &FaultRule,
    kind: FlowKind,
    record: &mut impl FnMut(&Step, FlowKind, Option<&str>, Phase),
) {
    for step in &rule.steps {
        record(step, kind, rule.name.as_deref(), Phase::Fault);
    }
}
