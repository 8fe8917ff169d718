use crate::resources::ResourcePlan;
use proxyprune_model::ProxyBundle;
use proxyprune_parser::{ParseCause, ParseError, parse_bundle, prune_manifest};
use proxyprune_types::{BundlePath, UnattachedPolicy};
use std::collections::BTreeSet;
use thiserror::Error;

/// What one rewrite excises from a bundle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemovalPlan {
    pub policies: Vec<String>,
    /// Type-qualified resource URLs.
    pub resources: Vec<String>,
}

impl RemovalPlan {
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty() && self.resources.is_empty()
    }

    /// The `apply-and-report` plan: every unattached policy plus the
    /// resources the ownership scan cleared for removal.
    pub fn for_unattached(unattached: &[UnattachedPolicy], resources: &ResourcePlan) -> Self {
        Self {
            policies: unattached.iter().map(|u| u.name.clone()).collect(),
            resources: resources.removable.iter().map(|r| r.url.clone()).collect(),
        }
    }
}

/// A rewrite that cannot be applied. The input bundle is left untouched in
/// every case; partial bundles are never produced.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RewriteError {
    #[error("removal target missing from bundle: {path}")]
    InconsistentBundle { path: BundlePath },
    #[error("policy not declared in bundle: {0}")]
    UnknownPolicy(String),
    #[error("resource not present in bundle: {0}")]
    UnknownResource(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Produce a new bundle with the plan's policies and resources excised and
/// the manifest listings pruned.
///
/// The input is never mutated, so callers can diff archive sizes before
/// deciding to persist. An empty plan returns an identical clone. The new
/// file tree is re-parsed to build the returned model, so tree and model
/// cannot drift apart.
pub fn rewrite_bundle(bundle: &ProxyBundle, plan: &RemovalPlan) -> Result<ProxyBundle, RewriteError> {
    if plan.is_empty() {
        return Ok(bundle.clone());
    }

    let mut files = bundle.files.clone();

    for name in &plan.policies {
        let def = bundle
            .policy(name)
            .ok_or_else(|| RewriteError::UnknownPolicy(name.clone()))?;
        if files.remove(&def.path).is_none() {
            return Err(RewriteError::InconsistentBundle {
                path: def.path.clone(),
            });
        }
    }

    for url in &plan.resources {
        let resource = bundle
            .resource_by_url(url)
            .ok_or_else(|| RewriteError::UnknownResource(url.clone()))?;
        if files.remove(&resource.path).is_none() {
            return Err(RewriteError::InconsistentBundle {
                path: resource.path.clone(),
            });
        }
    }

    if let Some(manifest) = &bundle.manifest {
        let text = std::str::from_utf8(files.get(manifest).unwrap_or_default())
            .map_err(|_| ParseError::new(manifest, ParseCause::NonUtf8))?;
        let policies: BTreeSet<String> = plan.policies.iter().cloned().collect();
        let resources: BTreeSet<String> = plan.resources.iter().cloned().collect();
        let pruned = prune_manifest(text, &policies, &resources)
            .map_err(|e| ParseError::new(manifest, e))?;
        files.insert(manifest.clone(), pruned.into_bytes());
    }

    Ok(parse_bundle(&bundle.name, &files)?)
}
