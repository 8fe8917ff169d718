//! Rule selection and run configuration.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration
//! provided as strings. The rule/variant space is closed and small, so it is
//! an exhaustively-matched enum rather than a registry; adding a rule is a
//! compile-time-checked change.

#![forbid(unsafe_code)]

mod error;
mod model;
mod resolve;
mod rules;

pub use error::ConfigError;
pub use model::RunConfigV1;
pub use resolve::{Mode, Overrides, ResolvedRun, resolve_run};
pub use rules::{Rule, RulePlan, Variant, parse_rule_spec};

/// Parse `proxyprune.yaml` (or equivalent) into a typed model.
/// Empty input is allowed and yields the defaults.
pub fn parse_config_yaml(input: &str) -> Result<RunConfigV1, ConfigError> {
    if input.trim().is_empty() {
        return Ok(RunConfigV1::default());
    }
    serde_yaml::from_str(input).map_err(|e| ConfigError::Yaml(e.to_string()))
}
