use camino::{Utf8Path, Utf8PathBuf};
use proxyprune_app::{
    ARTIFACT_REPORT_JSON, ARTIFACT_SEQUENTIAL, ARTIFACT_SIZE_SUMMARY, ARTIFACT_UNATTACHED,
    RunInput, run,
};
use proxyprune_settings::{Overrides, RulePlan, RunConfigV1, resolve_run};
use proxyprune_test_util::write_sample_zip;
use tempfile::TempDir;

fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path")
}

fn input(rules: &[&str], source_dir: &Utf8Path, output_dir: &Utf8Path) -> RunInput {
    let rules = RulePlan::from_specs(rules).expect("rules");
    let overrides = Overrides {
        source_dir: Some(source_dir.to_path_buf()),
        output_dir: Some(output_dir.to_path_buf()),
        jobs: Some(2),
        ..Overrides::default()
    };
    let run = resolve_run(RunConfigV1::default(), overrides).expect("resolve");
    RunInput { rules, run }
}

#[test]
fn report_only_writes_findings_and_is_idempotent() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    let source = root.join("proxies");
    std::fs::create_dir_all(source.as_std_path()).expect("mkdir");
    write_sample_zip(&source, "orders_rev3_2024_01_31");

    let out1 = root.join("out1");
    let summary = run(input(
        &["unattached-policy:report-only", "sequential-js:report-only"],
        &source,
        &out1,
    ))
    .expect("run");

    assert_eq!(summary.report.bundles.len(), 1);
    let report = &summary.report.bundles[0];
    assert_eq!(report.bundle, "orders");
    let names: Vec<&str> = report.unattached.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Unused1", "Unused2"]);
    // report-only never persists a rewrite
    assert!(report.cleaned_bytes.is_none());
    assert!(!out1.join("proxies").join("orders.zip").exists());

    let unattached_text =
        std::fs::read_to_string(out1.join(ARTIFACT_UNATTACHED).as_std_path()).expect("read");
    assert!(unattached_text.contains("Unattached policies in orders:"));
    let sequential_text =
        std::fs::read_to_string(out1.join(ARTIFACT_SEQUENTIAL).as_std_path()).expect("read");
    assert!(sequential_text.contains("No sequential"));
    assert!(out1.join(ARTIFACT_SIZE_SUMMARY).exists());
    assert!(out1.join(ARTIFACT_REPORT_JSON).exists());

    // Second run over the same unmodified input: byte-identical report text.
    let out2 = root.join("out2");
    run(input(
        &["unattached-policy:report-only", "sequential-js:report-only"],
        &source,
        &out2,
    ))
    .expect("run again");
    for artifact in [ARTIFACT_UNATTACHED, ARTIFACT_SEQUENTIAL, ARTIFACT_SIZE_SUMMARY] {
        let first = std::fs::read(out1.join(artifact).as_std_path()).expect("read");
        let second = std::fs::read(out2.join(artifact).as_std_path()).expect("read");
        assert_eq!(first, second, "{artifact} differs between identical runs");
    }
}

#[test]
fn apply_and_report_persists_a_smaller_archive() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    let source = root.join("proxies");
    std::fs::create_dir_all(source.as_std_path()).expect("mkdir");
    write_sample_zip(&source, "orders");

    let out = root.join("out");
    let summary = run(input(&["unattached-policy:apply-and-report"], &source, &out)).expect("run");

    let report = &summary.report.bundles[0];
    let before = report.original_bytes.expect("original size");
    let after = report.cleaned_bytes.expect("cleaned size");
    assert!(before > after, "expected {before} > {after}");
    assert!(report.not_rewritten.is_none());

    let cleaned = out.join("proxies").join("orders.zip");
    assert!(cleaned.exists());
    let tree = proxyprune_bundle::read_bundle_zip(&cleaned).expect("read cleaned");
    let policy_files: Vec<String> = tree
        .paths_under("apiproxy/policies")
        .map(|p| p.file_stem().to_string())
        .collect();
    assert_eq!(policy_files, vec!["Log".to_string(), "Quota".to_string()]);

    let md = std::fs::read_to_string(out.join(ARTIFACT_SIZE_SUMMARY).as_std_path()).expect("read");
    assert!(md.contains("# API Proxy Refactoring Summary"));
}

#[test]
fn a_corrupt_bundle_does_not_abort_its_siblings() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    let source = root.join("proxies");
    std::fs::create_dir_all(source.as_std_path()).expect("mkdir");
    write_sample_zip(&source, "orders");
    std::fs::write(source.join("broken.zip").as_std_path(), b"not a zip").expect("write");

    let out = root.join("out");
    let summary = run(input(&["unattached-policy:report-only"], &source, &out)).expect("run");

    assert_eq!(summary.report.bundles.len(), 2);
    let broken = &summary.report.bundles[0];
    assert_eq!(broken.bundle, "broken");
    assert!(broken.skipped.is_some());
    let orders = &summary.report.bundles[1];
    assert_eq!(orders.bundle, "orders");
    assert!(orders.skipped.is_none());
    assert_eq!(orders.unattached.len(), 2);
}

#[test]
fn proxy_filter_limits_the_bundle_set() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    let source = root.join("proxies");
    std::fs::create_dir_all(source.as_std_path()).expect("mkdir");
    write_sample_zip(&source, "orders");
    write_sample_zip(&source, "billing");

    let out = root.join("out");
    let rules = RulePlan::from_specs(&["unattached-policy:report-only"]).expect("rules");
    let overrides = Overrides {
        source_dir: Some(source.clone()),
        output_dir: Some(out.clone()),
        proxies: vec!["orders*".to_string()],
        jobs: Some(1),
        ..Overrides::default()
    };
    let resolved = resolve_run(RunConfigV1::default(), overrides).expect("resolve");
    let summary = run(RunInput {
        rules,
        run: resolved,
    })
    .expect("run");

    let names: Vec<&str> = summary
        .report
        .bundles
        .iter()
        .map(|b| b.bundle.as_str())
        .collect();
    assert_eq!(names, vec!["orders"]);
}
