use crate::pipeline::process_bundle;
use anyhow::Context;
use camino::Utf8PathBuf;
use proxyprune_bundle::{DiscoveredBundle, ManagementClient, discover_local_bundles};
use proxyprune_render::{render_sequential_report, render_size_summary, render_unattached_report};
use proxyprune_settings::{Mode, ResolvedRun, Rule, RulePlan};
use proxyprune_types::{BundleReport, ReportEnvelope, SCHEMA_REPORT_V1, ToolMeta};
use rayon::prelude::*;
use time::OffsetDateTime;

pub const ARTIFACT_UNATTACHED: &str = "unattached_policies_summary.txt";
pub const ARTIFACT_SEQUENTIAL: &str = "sequential_js_steps_report.txt";
pub const ARTIFACT_SIZE_SUMMARY: &str = "refactor_summary_report.md";
pub const ARTIFACT_REPORT_JSON: &str = "report.json";

#[derive(Clone, Debug)]
pub struct RunInput {
    pub rules: RulePlan,
    pub run: ResolvedRun,
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub report: ReportEnvelope,
    /// Artifact files written under the output directory.
    pub artifacts: Vec<Utf8PathBuf>,
}

/// Execute the selected rules over every selected bundle.
///
/// Bundles are processed on a fixed-size worker pool; each worker writes
/// only its own output subpath, and report lines are collected and flushed
/// once, sorted by bundle name, after all workers complete.
pub fn run(input: RunInput) -> anyhow::Result<RunSummary> {
    let started_at = OffsetDateTime::now_utc();
    let RunInput { rules, run } = input;
    anyhow::ensure!(!rules.is_empty(), "no rules selected");

    let bundles = match run.mode {
        Mode::LocalProxy => {
            discover_local_bundles(&run.source_dir, run.proxy_filter.as_ref())
                .context("discover bundles")?
        }
        Mode::RemoteProxy => download_remote_bundles(&run).context("download bundles")?,
    };
    if bundles.is_empty() {
        tracing::warn!(source = %run.source_dir, "no proxy bundles selected");
    } else {
        tracing::info!(count = bundles.len(), "processing bundles");
    }

    let out_proxies_dir = run.output_dir.join("proxies");
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(run.jobs)
        .build()
        .context("build worker pool")?;
    let mut reports: Vec<BundleReport> = pool.install(|| {
        bundles
            .par_iter()
            .map(|bundle| process_bundle(bundle, &rules, &out_proxies_dir))
            .collect()
    });
    reports.sort_by(|a, b| a.bundle.cmp(&b.bundle));

    std::fs::create_dir_all(run.output_dir.as_std_path())
        .with_context(|| format!("create directory {}", run.output_dir))?;

    let mut artifacts = Vec::new();
    if rules.variant(Rule::UnattachedPolicy).is_some() {
        artifacts.push(write_artifact(
            &run.output_dir,
            ARTIFACT_UNATTACHED,
            &render_unattached_report(&reports),
        )?);
        artifacts.push(write_artifact(
            &run.output_dir,
            ARTIFACT_SIZE_SUMMARY,
            &render_size_summary(&reports),
        )?);
    }
    if rules.variant(Rule::SequentialJs).is_some() {
        artifacts.push(write_artifact(
            &run.output_dir,
            ARTIFACT_SEQUENTIAL,
            &render_sequential_report(&reports),
        )?);
    }

    let report = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "proxyprune".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        bundles: reports,
    };
    let json = serde_json::to_vec_pretty(&report).context("serialize report")?;
    let json_path = run.output_dir.join(ARTIFACT_REPORT_JSON);
    std::fs::write(json_path.as_std_path(), json).with_context(|| format!("write {json_path}"))?;
    artifacts.push(json_path);

    Ok(RunSummary { report, artifacts })
}

/// Fetch every selected proxy as a local archive before any analysis starts.
fn download_remote_bundles(run: &ResolvedRun) -> anyhow::Result<Vec<DiscoveredBundle>> {
    let org = run.org.as_deref().context("remote mode requires an organization")?;
    let token = run.token.as_deref().context("remote mode requires a token")?;
    let client = ManagementClient::new(token)?;

    let download_dir = run.output_dir.join("downloads");
    let mut out = Vec::new();
    for name in client.list_proxies(org)? {
        if !run.selects(&name) {
            continue;
        }
        let revision = match run.env.as_deref() {
            Some(env) => client.deployed_revision(org, env, &name)?,
            None => client.latest_revision(org, &name)?,
        };
        let archive = client.download_bundle(org, &name, &revision, &download_dir)?;
        let archive_bytes = std::fs::metadata(archive.as_std_path())
            .with_context(|| format!("stat {archive}"))?
            .len();
        out.push(DiscoveredBundle {
            name,
            archive,
            archive_bytes,
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

fn write_artifact(
    dir: &camino::Utf8Path,
    name: &str,
    content: &str,
) -> anyhow::Result<Utf8PathBuf> {
    let path = dir.join(name);
    std::fs::write(path.as_std_path(), content).with_context(|| format!("write {path}"))?;
    tracing::info!(artifact = %path, "report written");
    Ok(path)
}
