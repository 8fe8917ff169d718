//! CLI entry point for proxyprune.
//!
//! This module is intentionally thin: it handles argument parsing, logging
//! setup, and exit codes. All business logic lives in the `proxyprune-app`
//! crate. Exit codes: 0 success, 2 configuration error (nothing processed),
//! 1 unexpected runtime failure.

use camino::Utf8PathBuf;
use clap::Parser;
use proxyprune_app::{RunInput, run};
use proxyprune_settings::{ConfigError, Overrides, RulePlan, parse_config_yaml, resolve_run};

#[derive(Parser, Debug)]
#[command(
    name = "proxyprune",
    version,
    about = "Reachability-based hygiene checks and cleanup for API proxy bundles",
    after_help = "Rules and variants:\n  \
        unattached-policy:report-only       detect policies no flow references\n  \
        unattached-policy:apply-and-report  also persist cleaned archives\n  \
        sequential-js:report-only           detect adjacent unconditioned JS steps"
)]
struct Cli {
    /// Rules to execute, in rule:variant form.
    #[arg(required = true, value_name = "RULE:VARIANT")]
    rules: Vec<String>,

    /// Path to the run configuration YAML (missing file = defaults).
    #[arg(long, default_value = "proxyprune.yaml")]
    config: Utf8PathBuf,

    /// Override mode (local-proxy|remote-proxy).
    #[arg(long)]
    mode: Option<String>,

    /// Override the directory containing *.zip bundle archives.
    #[arg(long)]
    source_dir: Option<Utf8PathBuf>,

    /// Override the output directory.
    #[arg(long)]
    output_dir: Option<Utf8PathBuf>,

    /// Override the management organization (remote-proxy).
    #[arg(long)]
    org: Option<String>,

    /// Environment whose deployed revisions are fetched (remote-proxy).
    #[arg(long)]
    env: Option<String>,

    /// Select proxies by name (glob). Repeatable.
    #[arg(long = "proxy", value_name = "GLOB")]
    proxies: Vec<String>,

    /// Management API token (remote-proxy).
    #[arg(long, env = "PROXYPRUNE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Worker pool size for the per-bundle fan-out.
    #[arg(long)]
    jobs: Option<usize>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = execute(cli) {
        if let Some(config_err) = err.downcast_ref::<ConfigError>() {
            eprintln!("proxyprune: {config_err}");
            std::process::exit(2);
        }
        eprintln!("proxyprune error: {err:#}");
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> anyhow::Result<()> {
    // Fail fast: every rule:variant is validated before anything is read.
    let rules = RulePlan::from_specs(&cli.rules)?;

    // A missing config file is allowed; defaults apply.
    let config_text = std::fs::read_to_string(&cli.config).unwrap_or_default();
    let cfg = parse_config_yaml(&config_text)?;

    let overrides = Overrides {
        mode: cli.mode,
        source_dir: cli.source_dir,
        output_dir: cli.output_dir,
        org: cli.org,
        env: cli.env,
        proxies: cli.proxies,
        token: cli.token,
        jobs: cli.jobs,
    };
    let resolved = resolve_run(cfg, overrides)?;

    let summary = run(RunInput {
        rules,
        run: resolved,
    })?;

    for artifact in &summary.artifacts {
        println!("wrote {artifact}");
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
