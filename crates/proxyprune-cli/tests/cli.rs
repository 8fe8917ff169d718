use assert_cmd::Command;
use camino::Utf8PathBuf;
use predicates::prelude::*;
use proxyprune_test_util::write_sample_zip;
use tempfile::TempDir;

/// Helper to get a Command for the proxyprune binary.
#[allow(deprecated)]
fn proxyprune_cmd() -> Command {
    let mut cmd = Command::cargo_bin("proxyprune").unwrap();
    cmd.env_remove("PROXYPRUNE_TOKEN").env_remove("RUST_LOG");
    cmd
}

fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path")
}

#[test]
fn help_works() {
    proxyprune_cmd().arg("--help").assert().success();
}

#[test]
fn unknown_rule_fails_fast_with_exit_code_2() {
    proxyprune_cmd()
        .arg("nonsense:report-only")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unknown rule: nonsense"));
}

#[test]
fn unsupported_variant_fails_fast_with_exit_code_2() {
    proxyprune_cmd()
        .arg("sequential-js:apply-and-report")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unsupported variant"));
}

#[test]
fn missing_rules_is_a_usage_error() {
    proxyprune_cmd().assert().failure();
}

#[test]
fn remote_mode_without_token_fails_before_processing() {
    let tmp = TempDir::new().expect("temp dir");
    proxyprune_cmd()
        .current_dir(tmp.path())
        .args(["unattached-policy:report-only", "--mode", "remote-proxy", "--org", "acme"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("token"));
}

#[test]
fn report_only_end_to_end_writes_reports() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    let source = root.join("proxies");
    std::fs::create_dir_all(source.as_std_path()).expect("mkdir");
    write_sample_zip(&source, "orders");
    let out = root.join("output");

    proxyprune_cmd()
        .current_dir(tmp.path())
        .args([
            "unattached-policy:report-only",
            "sequential-js:report-only",
            "--source-dir",
            source.as_str(),
            "--output-dir",
            out.as_str(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("unattached_policies_summary.txt"));

    let summary =
        std::fs::read_to_string(out.join("unattached_policies_summary.txt").as_std_path())
            .expect("read summary");
    assert!(summary.contains("Unattached policies in orders:"));
    assert!(summary.contains("Unused1"));
    assert!(summary.contains("Unused2"));
    assert!(out.join("sequential_js_steps_report.txt").exists());
    assert!(out.join("refactor_summary_report.md").exists());
    assert!(out.join("report.json").exists());
}

#[test]
fn apply_and_report_end_to_end_writes_a_cleaned_archive() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    let source = root.join("proxies");
    std::fs::create_dir_all(source.as_std_path()).expect("mkdir");
    write_sample_zip(&source, "orders");
    let out = root.join("output");

    proxyprune_cmd()
        .current_dir(tmp.path())
        .args([
            "unattached-policy:apply-and-report",
            "--source-dir",
            source.as_str(),
            "--output-dir",
            out.as_str(),
        ])
        .assert()
        .success();

    assert!(out.join("proxies").join("orders.zip").exists());
    let md = std::fs::read_to_string(out.join("refactor_summary_report.md").as_std_path())
        .expect("read md");
    assert!(md.contains("# API Proxy Refactoring Summary"));
}

#[test]
fn config_file_is_picked_up_from_the_working_directory() {
    let tmp = TempDir::new().expect("temp dir");
    let root = utf8_root(&tmp);
    let source = root.join("bundles");
    std::fs::create_dir_all(source.as_std_path()).expect("mkdir");
    write_sample_zip(&source, "orders");
    std::fs::write(
        root.join("proxyprune.yaml").as_std_path(),
        "source_dir: bundles\noutput_dir: analysis\n",
    )
    .expect("write config");

    proxyprune_cmd()
        .current_dir(tmp.path())
        .arg("unattached-policy:report-only")
        .assert()
        .success();

    assert!(root.join("analysis").join("unattached_policies_summary.txt").exists());
}
