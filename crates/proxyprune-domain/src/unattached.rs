use crate::graph::ReferenceGraph;
use proxyprune_model::{ProxyBundle, Resource};
use proxyprune_types::{ResourceFootprint, UnattachedPolicy};
use std::collections::BTreeMap;

/// Declared policies minus referenced policies, in declaration order, with
/// the byte footprint removal would free (descriptor plus referenced
/// resource files).
pub fn find_unattached(bundle: &ProxyBundle, graph: &ReferenceGraph) -> Vec<UnattachedPolicy> {
    let by_url: BTreeMap<&str, &Resource> = bundle
        .resources
        .iter()
        .map(|r| (r.url.as_str(), r))
        .collect();

    bundle
        .policies
        .iter()
        .filter(|p| !graph.is_referenced(&p.name))
        .map(|p| UnattachedPolicy {
            name: p.name.clone(),
            descriptor: p.path.clone(),
            descriptor_bytes: bundle.files.byte_len(&p.path),
            resources: p
                .resources
                .iter()
                .map(|url| match by_url.get(url.as_str()) {
                    Some(r) => ResourceFootprint {
                        url: url.clone(),
                        path: Some(r.path.clone()),
                        bytes: bundle.files.byte_len(&r.path),
                    },
                    // Referenced but not shipped in the bundle.
                    None => ResourceFootprint {
                        url: url.clone(),
                        path: None,
                        bytes: 0,
                    },
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_reference_graph;
    use proxyprune_parser::parse_bundle;
    use proxyprune_test_util::sample_tree;

    #[test]
    fn reports_unused_policies_in_declaration_order() {
        let bundle = parse_bundle("orders", &sample_tree()).expect("parse");
        let graph = build_reference_graph(&bundle);
        let unattached = find_unattached(&bundle, &graph);

        let names: Vec<&str> = unattached.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Unused1", "Unused2"]);
    }

    #[test]
    fn unattached_and_referenced_are_disjoint() {
        let bundle = parse_bundle("orders", &sample_tree()).expect("parse");
        let graph = build_reference_graph(&bundle);
        for finding in find_unattached(&bundle, &graph) {
            assert!(!graph.is_referenced(&finding.name));
        }
    }

    #[test]
    fn footprint_includes_descriptor_and_resource_bytes() {
        let bundle = parse_bundle("orders", &sample_tree()).expect("parse");
        let graph = build_reference_graph(&bundle);
        let unattached = find_unattached(&bundle, &graph);

        let unused2 = unattached
            .iter()
            .find(|u| u.name == "Unused2")
            .expect("Unused2 finding");
        assert!(unused2.descriptor_bytes > 0);
        assert_eq!(unused2.resources.len(), 1);
        assert_eq!(unused2.resources[0].url, "jsc://unused.js");
        assert!(unused2.resources[0].bytes > 0);
    }

    #[test]
    fn detection_is_idempotent() {
        let bundle = parse_bundle("orders", &sample_tree()).expect("parse");
        let graph = build_reference_graph(&bundle);
        let first = find_unattached(&bundle, &graph);
        let second = find_unattached(&bundle, &graph);
        assert_eq!(first, second);
    }
}
