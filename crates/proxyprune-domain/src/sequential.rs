use proxyprune_model::{Flow, ProxyBundle, Step};
use proxyprune_types::{FlowKind, Phase, SequentialRun};
use std::collections::BTreeSet;

/// Maximal runs of two or more adjacent unconditioned script-type steps,
/// per flow phase, in the same traversal order as the reference graph.
///
/// Advisory only: runs are reported, never merged. Fault rules are not
/// flows and are never scanned.
pub fn find_sequential_runs(bundle: &ProxyBundle) -> Vec<SequentialRun> {
    let script: BTreeSet<&str> = bundle
        .policies
        .iter()
        .filter(|p| p.is_script())
        .map(|p| p.name.as_str())
        .collect();

    let mut out = Vec::new();
    for endpoint in &bundle.endpoints {
        if let Some(flow) = &endpoint.pre_flow {
            scan_flow(&endpoint.name, flow, FlowKind::PreFlow, &script, &mut out);
        }
        for flow in &endpoint.conditional_flows {
            scan_flow(&endpoint.name, flow, FlowKind::Conditional, &script, &mut out);
        }
        if let Some(flow) = &endpoint.post_flow {
            scan_flow(&endpoint.name, flow, FlowKind::PostFlow, &script, &mut out);
        }
    }
    out
}

fn scan_flow(
    endpoint: &str,
    flow: &Flow,
    kind: FlowKind,
    script: &BTreeSet<&str>,
    out: &mut Vec<SequentialRun>,
) {
    scan_steps(endpoint, flow, kind, Phase::Request, &flow.request, script, out);
    scan_steps(endpoint, flow, kind, Phase::Response, &flow.response, script, out);
}

fn scan_steps(
    endpoint: &str,
    flow: &Flow,
    kind: FlowKind,
    phase: Phase,
    steps: &[Step],
    script: &BTreeSet<&str>,
    out: &mut Vec<SequentialRun>,
) {
    let mut start = 0usize;
    let mut run: Vec<String> = Vec::new();

    let mut flush = |run: &mut Vec<String>, start: usize| {
        if run.len() >= 2 {
            out.push(SequentialRun {
                endpoint: endpoint.to_string(),
                flow_kind: kind,
                flow_name: flow.name.clone(),
                phase,
                start_index: start,
                policies: std::mem::take(run),
            });
        } else {
            run.clear();
        }
    };

    for (index, step) in steps.iter().enumerate() {
        let qualifies = script.contains(step.policy.as_str()) && step.is_unconditioned();
        if qualifies {
            if run.is_empty() {
                start = index;
            }
            run.push(step.policy.clone());
        } else {
            flush(&mut run, start);
        }
    }
    flush(&mut run, start);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxyprune_parser::parse_bundle;
    use proxyprune_test_util::{bundle_with_endpoint_and_policies, endpoint_xml, script_policy_xml};

    fn js_bundle(flow_body: &str) -> Vec<SequentialRun> {
        let endpoint = endpoint_xml(
            "default",
            &format!("<PreFlow name=\"PreFlow\"><Request>{flow_body}</Request></PreFlow>"),
        );
        let policies: Vec<(String, String)> = ["JS-A", "JS-B", "JS-C", "JS-D", "JS-E"]
            .iter()
            .map(|n| (n.to_string(), script_policy_xml(n)))
            .collect();
        let tree = bundle_with_endpoint_and_policies(&endpoint, &policies);
        let bundle = parse_bundle("b", &tree).expect("parse");
        find_sequential_runs(&bundle)
    }

    fn step(name: &str, condition: Option<&str>) -> String {
        match condition {
            Some(c) => format!("<Step><Name>{name}</Name><Condition>{c}</Condition></Step>"),
            None => format!("<Step><Name>{name}</Name></Step>"),
        }
    }

    #[test]
    fn conditioned_step_breaks_adjacency_and_starts_no_run() {
        let runs = js_bundle(&format!(
            "{}{}{}{}{}",
            step("JS-A", None),
            step("JS-B", None),
            step("JS-C", Some("x")),
            step("JS-D", None),
            step("JS-E", None),
        ));

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].start_index, 0);
        assert_eq!(runs[0].policies, vec!["JS-A", "JS-B"]);
        assert_eq!(runs[1].start_index, 3);
        assert_eq!(runs[1].policies, vec!["JS-D", "JS-E"]);
    }

    #[test]
    fn empty_condition_counts_as_unconditioned() {
        let runs = js_bundle(&format!(
            "{}{}",
            step("JS-A", Some("")),
            step("JS-B", None),
        ));
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].policies, vec!["JS-A", "JS-B"]);
    }

    #[test]
    fn single_script_step_is_not_a_run() {
        let runs = js_bundle(&step("JS-A", None));
        assert!(runs.is_empty());
    }

    #[test]
    fn non_script_step_breaks_a_run() {
        let endpoint = endpoint_xml(
            "default",
            &format!(
                "<PreFlow name=\"PreFlow\"><Request>{}{}{}</Request></PreFlow>",
                step("JS-A", None),
                step("Quota", None),
                step("JS-B", None),
            ),
        );
        let policies = vec![
            ("JS-A".to_string(), script_policy_xml("JS-A")),
            ("JS-B".to_string(), script_policy_xml("JS-B")),
            (
                "Quota".to_string(),
                "<Quota name=\"Quota\"/>".to_string(),
            ),
        ];
        let tree = bundle_with_endpoint_and_policies(&endpoint, &policies);
        let bundle = parse_bundle("b", &tree).expect("parse");
        assert!(find_sequential_runs(&bundle).is_empty());
    }

    #[test]
    fn run_location_names_endpoint_flow_and_phase() {
        let runs = js_bundle(&format!("{}{}", step("JS-A", None), step("JS-B", None)));
        assert_eq!(runs[0].endpoint, "default");
        assert_eq!(runs[0].flow_kind, FlowKind::PreFlow);
        assert_eq!(runs[0].flow_name.as_deref(), Some("PreFlow"));
        assert_eq!(runs[0].phase, Phase::Request);
    }
}
