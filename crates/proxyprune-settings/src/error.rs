use thiserror::Error;

/// Fatal configuration failures. All of these abort before any bundle is
/// dispatched; nothing is processed on a bad configuration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid rule argument '{0}': expected rule:variant")]
    InvalidRuleSpec(String),
    #[error("unknown rule: {0}")]
    UnknownRule(String),
    #[error("unsupported variant '{variant}' for rule '{rule}'")]
    UnsupportedVariant { rule: String, variant: String },
    #[error("unknown mode: {0} (expected local-proxy or remote-proxy)")]
    UnknownMode(String),
    #[error("remote-proxy mode requires an organization")]
    MissingOrg,
    #[error("remote-proxy mode requires an authentication token")]
    MissingToken,
    #[error("invalid proxy filter '{pattern}': {reason}")]
    InvalidProxyFilter { pattern: String, reason: String },
    #[error("invalid configuration: {0}")]
    Yaml(String),
}
