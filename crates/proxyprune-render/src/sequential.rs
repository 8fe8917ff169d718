use crate::{flow_kind_label, phase_label};
use proxyprune_types::BundleReport;

/// Sequential-run findings across all bundles.
pub fn render_sequential_report(bundles: &[BundleReport]) -> String {
    let mut out = String::new();
    let mut total = 0usize;

    for report in bundles {
        if report.sequential_runs.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "--- Found sequential JS steps in proxy: {} ---\n",
            report.bundle
        ));
        for run in &report.sequential_runs {
            total += 1;
            let flow = match &run.flow_name {
                Some(name) => format!("{} '{}'", flow_kind_label(run.flow_kind), name),
                None => flow_kind_label(run.flow_kind).to_string(),
            };
            out.push_str(&format!(
                "  - Location: endpoint '{}' -> {}/{} (steps {}..{})\n",
                run.endpoint,
                flow,
                phase_label(run.phase),
                run.start_index,
                run.start_index + run.len(),
            ));
            out.push_str(&format!("    Sequence: {}\n", run.policies.join(", ")));
        }
        out.push('\n');
    }

    if total == 0 {
        out.push_str("No sequential, condition-less JavaScript steps found across all proxies.\n");
    }

    out
}
