use proxyprune_types::BundleReport;

fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Markdown size summary.
///
/// When any bundle was rewritten (or a rewrite was attempted), renders the
/// before/after refactoring table; otherwise an analysis-only table of
/// original sizes. Bundles with no known archive size (skipped before
/// reading) are omitted from the table and listed below it.
pub fn render_size_summary(bundles: &[BundleReport]) -> String {
    let apply_run = bundles
        .iter()
        .any(|r| r.cleaned_bytes.is_some() || r.not_rewritten.is_some());

    let sized: Vec<&BundleReport> = bundles
        .iter()
        .filter(|r| r.original_bytes.is_some())
        .collect();

    let mut out = String::new();

    if apply_run {
        out.push_str("# API Proxy Refactoring Summary\n\n");
        out.push_str(
            "| Proxy Name | Original Size (MB) | Cleaned Size (MB) | Reduction (MB) | Reduction (%) |\n",
        );
        out.push_str("|---|---|---|---|---|\n");

        let mut total_original = 0u64;
        let mut total_cleaned = 0u64;
        for report in &sized {
            let original = report.original_bytes.unwrap_or(0);
            let cleaned = report.cleaned_bytes.unwrap_or(original);
            total_original += original;
            total_cleaned += cleaned;

            match report.cleaned_bytes {
                Some(cleaned) => {
                    let reduction = original.saturating_sub(cleaned);
                    let percent = if original > 0 {
                        reduction as f64 / original as f64 * 100.0
                    } else {
                        0.0
                    };
                    out.push_str(&format!(
                        "| {} | {:.3} | {:.3} | **{:.3}** | **{:.2}%** |\n",
                        report.bundle,
                        to_mb(original),
                        to_mb(cleaned),
                        to_mb(reduction),
                        percent,
                    ));
                }
                None => {
                    out.push_str(&format!(
                        "| {} | {:.3} | N/A | N/A | N/A |\n",
                        report.bundle,
                        to_mb(original),
                    ));
                }
            }
        }

        let total_reduction = total_original.saturating_sub(total_cleaned);
        let total_percent = if total_original > 0 {
            total_reduction as f64 / total_original as f64 * 100.0
        } else {
            0.0
        };
        out.push_str(&format!(
            "| **Total** | **{:.3}** | **{:.3}** | **{:.3}** | **{:.2}%** |\n",
            to_mb(total_original),
            to_mb(total_cleaned),
            to_mb(total_reduction),
            total_percent,
        ));
    } else {
        out.push_str("# API Proxy Analysis Report\n\n");
        out.push_str("| Proxy Name | Original Size (MB) |\n|---|---|\n");
        let mut total = 0u64;
        for report in &sized {
            let original = report.original_bytes.unwrap_or(0);
            total += original;
            out.push_str(&format!("| {} | {:.3} |\n", report.bundle, to_mb(original)));
        }
        out.push_str(&format!("| **Total** | **{:.3}** |\n", to_mb(total)));
    }

    let not_rewritten: Vec<&BundleReport> =
        bundles.iter().filter(|r| r.not_rewritten.is_some()).collect();
    if !not_rewritten.is_empty() {
        out.push('\n');
        for report in not_rewritten {
            out.push_str(&format!(
                "> Not rewritten: {} ({})\n",
                report.bundle,
                report.not_rewritten.as_deref().unwrap_or(""),
            ));
        }
    }

    let skipped: Vec<&BundleReport> = bundles.iter().filter(|r| r.skipped.is_some()).collect();
    if !skipped.is_empty() {
        out.push('\n');
        for report in skipped {
            out.push_str(&format!(
                "> Skipped: {} ({})\n",
                report.bundle,
                report.skipped.as_deref().unwrap_or(""),
            ));
        }
    }

    out
}
