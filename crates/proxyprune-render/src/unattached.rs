use crate::{flow_kind_label, phase_label};
use proxyprune_types::BundleReport;

/// Per-bundle unattached-policy findings, dangling-reference warnings, and
/// pre-existing orphan resources.
pub fn render_unattached_report(bundles: &[BundleReport]) -> String {
    let mut out = String::new();

    for report in bundles {
        if let Some(reason) = &report.skipped {
            out.push_str(&format!("Skipped {}: {}\n\n", report.bundle, reason));
            continue;
        }

        if report.unattached.is_empty() {
            out.push_str(&format!(
                "No unattached policies found in {}.\n",
                report.bundle
            ));
        } else {
            out.push_str(&format!("Unattached policies in {}:\n", report.bundle));
            for policy in &report.unattached {
                let resources = match policy.resources.len() {
                    0 => String::new(),
                    1 => " + 1 resource file".to_string(),
                    n => format!(" + {n} resource files"),
                };
                out.push_str(&format!(
                    "  - {} ({}, {} bytes{})\n",
                    policy.name, policy.descriptor, policy.descriptor_bytes, resources
                ));
            }
        }

        for warning in &report.dangling {
            out.push_str(&format!(
                "  ! step references missing policy '{}' (endpoint '{}', {}/{})\n",
                warning.policy,
                warning.site.endpoint,
                flow_kind_label(warning.site.flow_kind),
                phase_label(warning.site.phase),
            ));
        }

        for orphan in &report.orphan_resources {
            out.push_str(&format!(
                "  ~ pre-existing orphan resource {} (not removed)\n",
                orphan.url
            ));
        }

        out.push('\n');
    }

    if bundles.is_empty() {
        out.push_str("No bundles processed.\n");
    }

    out
}
