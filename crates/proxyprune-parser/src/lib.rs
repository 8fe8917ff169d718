//! Descriptor parsing: bundle file tree in, typed model out.
//!
//! Parsing is purely structural. The tool extracts the elements it
//! understands (endpoints, flows, steps, policy names, resource references)
//! and leaves everything else alone; rewrites only ever delete whole files or
//! prune manifest listing entries, so unknown structure survives verbatim.
//!
//! This crate does no IO: input is bytes already read from an archive.

#![forbid(unsafe_code)]

mod descriptor;
mod error;
mod manifest;
mod xml;

pub use descriptor::parse_bundle;
pub use error::{ParseCause, ParseError};
pub use manifest::prune_manifest;
pub use xml::{XmlElement, XmlError, XmlNode};

/// Fuzz-friendly API for testing parsing robustness without a file tree.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    use std::collections::BTreeSet;

    /// Parse arbitrary text as a descriptor document.
    ///
    /// Returns `Ok(...)` on well-formed XML, `Err(...)` otherwise.
    /// **Never panics** on any input.
    pub fn parse_descriptor(text: &str) -> Result<(), crate::XmlError> {
        let _ = crate::xml::parse_document(text)?;
        Ok(())
    }

    /// Prune arbitrary text as a manifest with a non-trivial removal set.
    ///
    /// **Never panics** on any input.
    pub fn prune_manifest(text: &str) -> Result<(), crate::XmlError> {
        let mut policies = BTreeSet::new();
        policies.insert("Fuzz".to_string());
        let _ = crate::manifest::prune_manifest(text, &policies, &BTreeSet::new())?;
        Ok(())
    }
}
