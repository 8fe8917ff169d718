use crate::error::ConfigError;
use crate::model::RunConfigV1;
use camino::Utf8PathBuf;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// CLI-level overrides; each takes precedence over the config file value.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub mode: Option<String>,
    pub source_dir: Option<Utf8PathBuf>,
    pub output_dir: Option<Utf8PathBuf>,
    pub org: Option<String>,
    pub env: Option<String>,
    pub proxies: Vec<String>,
    pub token: Option<String>,
    pub jobs: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    LocalProxy,
    RemoteProxy,
}

/// The validated run configuration the application executes against.
#[derive(Clone, Debug)]
pub struct ResolvedRun {
    pub mode: Mode,
    pub source_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub org: Option<String>,
    pub env: Option<String>,
    pub token: Option<String>,
    /// Original filter patterns, for reporting.
    pub proxy_patterns: Vec<String>,
    /// Compiled name filter; `None` selects every bundle.
    pub proxy_filter: Option<GlobSet>,
    pub jobs: usize,
}

impl ResolvedRun {
    pub fn selects(&self, bundle_name: &str) -> bool {
        self.proxy_filter
            .as_ref()
            .is_none_or(|set| set.is_match(bundle_name))
    }
}

pub fn resolve_run(cfg: RunConfigV1, overrides: Overrides) -> Result<ResolvedRun, ConfigError> {
    let mode = match overrides.mode.or(cfg.mode).as_deref() {
        None | Some("local-proxy" | "local_proxy") => Mode::LocalProxy,
        Some("remote-proxy" | "remote_proxy") => Mode::RemoteProxy,
        Some(other) => return Err(ConfigError::UnknownMode(other.to_string())),
    };

    let source_dir = overrides
        .source_dir
        .or(cfg.source_dir.map(Utf8PathBuf::from))
        .unwrap_or_else(|| Utf8PathBuf::from("proxies"));
    let output_dir = overrides
        .output_dir
        .or(cfg.output_dir.map(Utf8PathBuf::from))
        .unwrap_or_else(|| Utf8PathBuf::from("output"));

    let org = overrides.org.or(cfg.org);
    let env = overrides.env.or(cfg.env);
    let token = overrides.token;

    if mode == Mode::RemoteProxy {
        if org.is_none() {
            return Err(ConfigError::MissingOrg);
        }
        if token.is_none() {
            return Err(ConfigError::MissingToken);
        }
    }

    let proxy_patterns = if overrides.proxies.is_empty() {
        cfg.proxies
    } else {
        overrides.proxies
    };
    let proxy_filter = build_filter(&proxy_patterns)?;

    let jobs = overrides
        .jobs
        .or(cfg.jobs.map(|j| j as usize))
        .unwrap_or_else(default_jobs)
        .max(1);

    Ok(ResolvedRun {
        mode,
        source_dir,
        output_dir,
        org,
        env,
        token,
        proxy_patterns,
        proxy_filter,
        jobs,
    })
}

fn build_filter(patterns: &[String]) -> Result<Option<GlobSet>, ConfigError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidProxyFilter {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| ConfigError::InvalidProxyFilter {
        pattern: patterns.join(", "),
        reason: e.to_string(),
    })?;
    Ok(Some(set))
}

/// Bundle pipelines are IO-bound; cap the default pool well below big-core
/// machines.
fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_mode_with_conventional_dirs() {
        let run = resolve_run(RunConfigV1::default(), Overrides::default()).expect("resolve");
        assert_eq!(run.mode, Mode::LocalProxy);
        assert_eq!(run.source_dir, Utf8PathBuf::from("proxies"));
        assert_eq!(run.output_dir, Utf8PathBuf::from("output"));
        assert!(run.proxy_filter.is_none());
        assert!(run.jobs >= 1);
    }

    #[test]
    fn overrides_take_precedence_over_config() {
        let cfg = RunConfigV1 {
            source_dir: Some("from-config".to_string()),
            jobs: Some(2),
            ..RunConfigV1::default()
        };
        let overrides = Overrides {
            source_dir: Some(Utf8PathBuf::from("from-cli")),
            jobs: Some(5),
            ..Overrides::default()
        };
        let run = resolve_run(cfg, overrides).expect("resolve");
        assert_eq!(run.source_dir, Utf8PathBuf::from("from-cli"));
        assert_eq!(run.jobs, 5);
    }

    #[test]
    fn remote_mode_requires_org_and_token() {
        let cfg = RunConfigV1 {
            mode: Some("remote-proxy".to_string()),
            org: Some("acme".to_string()),
            ..RunConfigV1::default()
        };
        let err = resolve_run(cfg.clone(), Overrides::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingToken);

        let err = resolve_run(
            RunConfigV1 {
                org: None,
                ..cfg.clone()
            },
            Overrides::default(),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingOrg);

        let run = resolve_run(
            cfg,
            Overrides {
                token: Some("t0ken".to_string()),
                ..Overrides::default()
            },
        )
        .expect("resolve");
        assert_eq!(run.mode, Mode::RemoteProxy);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let cfg = RunConfigV1 {
            mode: Some("hybrid".to_string()),
            ..RunConfigV1::default()
        };
        let err = resolve_run(cfg, Overrides::default()).unwrap_err();
        assert_eq!(err, ConfigError::UnknownMode("hybrid".to_string()));
    }

    #[test]
    fn proxy_filters_are_validated_and_match_names() {
        let cfg = RunConfigV1 {
            proxies: vec!["orders-*".to_string()],
            ..RunConfigV1::default()
        };
        let run = resolve_run(cfg, Overrides::default()).expect("resolve");
        assert!(run.selects("orders-v1"));
        assert!(!run.selects("billing"));

        let bad = RunConfigV1 {
            proxies: vec!["[".to_string()],
            ..RunConfigV1::default()
        };
        let err = resolve_run(bad, Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProxyFilter { .. }));
    }

    #[test]
    fn jobs_is_clamped_to_at_least_one() {
        let cfg = RunConfigV1 {
            jobs: Some(0),
            ..RunConfigV1::default()
        };
        let run = resolve_run(cfg, Overrides::default()).expect("resolve");
        assert_eq!(run.jobs, 1);
    }
}
