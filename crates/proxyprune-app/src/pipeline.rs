use camino::Utf8Path;
use proxyprune_bundle::{DiscoveredBundle, read_bundle_zip, write_bundle_zip};
use proxyprune_domain::{
    RemovalPlan, build_reference_graph, find_sequential_runs, find_unattached,
    resolve_resource_ownership, rewrite_bundle,
};
use proxyprune_parser::parse_bundle;
use proxyprune_settings::{Rule, RulePlan, Variant};
use proxyprune_types::BundleReport;
use std::collections::BTreeSet;

/// Run the selected rules over one bundle archive.
///
/// Every failure is bundle-scoped: archive or parse failures return a
/// skipped report, a failed rewrite flags `not_rewritten` and leaves the
/// input untouched. Nothing here can abort a sibling bundle.
pub fn process_bundle(
    discovered: &DiscoveredBundle,
    rules: &RulePlan,
    out_proxies_dir: &Utf8Path,
) -> BundleReport {
    let mut report = BundleReport::new(&discovered.name);
    report.original_bytes = Some(discovered.archive_bytes);

    let tree = match read_bundle_zip(&discovered.archive) {
        Ok(tree) => tree,
        Err(err) => {
            tracing::warn!(bundle = %discovered.name, error = %format!("{err:#}"), "skipping bundle");
            report.skipped = Some(format!("archive error: {err:#}"));
            return report;
        }
    };

    let bundle = match parse_bundle(&discovered.name, &tree) {
        Ok(bundle) => bundle,
        Err(err) => {
            tracing::warn!(bundle = %discovered.name, error = %err, "skipping bundle");
            report.skipped = Some(format!("parse error: {err}"));
            return report;
        }
    };

    let graph = build_reference_graph(&bundle);
    report.dangling = graph.dangling.clone();

    if let Some(variant) = rules.variant(Rule::UnattachedPolicy) {
        let unattached = find_unattached(&bundle, &graph);
        let removing: BTreeSet<String> = unattached.iter().map(|u| u.name.clone()).collect();
        let resources = resolve_resource_ownership(&bundle, &removing);
        report.orphan_resources = resources.orphans.clone();

        if variant == Variant::ApplyAndReport {
            let plan = RemovalPlan::for_unattached(&unattached, &resources);
            match rewrite_bundle(&bundle, &plan) {
                Ok(rewritten) => {
                    let out_path = out_proxies_dir.join(format!("{}.zip", bundle.name));
                    match write_bundle_zip(&rewritten.files, &out_path) {
                        Ok(size) => report.cleaned_bytes = Some(size),
                        Err(err) => {
                            tracing::warn!(bundle = %bundle.name, error = %format!("{err:#}"), "could not persist rewritten bundle");
                            report.not_rewritten = Some(format!("{err:#}"));
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(bundle = %bundle.name, error = %err, "rewrite failed, bundle left untouched");
                    report.not_rewritten = Some(err.to_string());
                }
            }
        }

        report.unattached = unattached;
    }

    if rules.variant(Rule::SequentialJs).is_some() {
        report.sequential_runs = find_sequential_runs(&bundle);
    }

    report
}
