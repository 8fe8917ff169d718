use crate::xml::XmlError;
use proxyprune_types::BundlePath;
use thiserror::Error;

/// A descriptor that is not well-formed or is missing expected structure.
///
/// Fatal for the owning bundle only; sibling bundles keep processing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{path}: {cause}")]
pub struct ParseError {
    pub path: BundlePath,
    pub cause: ParseCause,
}

impl ParseError {
    pub fn new(path: &BundlePath, cause: impl Into<ParseCause>) -> Self {
        Self {
            path: path.clone(),
            cause: cause.into(),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseCause {
    #[error("descriptor is not valid UTF-8")]
    NonUtf8,
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },
    #[error("policy descriptor has no name attribute")]
    MissingPolicyName,
    #[error("duplicate policy name: {0}")]
    DuplicatePolicyName(String),
    #[error("step has no Name element")]
    MissingStepName,
}
