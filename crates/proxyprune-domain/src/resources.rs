use proxyprune_model::{ProxyBundle, Resource};
use proxyprune_types::OrphanResource;
use std::collections::BTreeSet;

/// Outcome of the ownership scan for one prospective policy removal set.
#[derive(Clone, Debug, Default)]
pub struct ResourcePlan {
    /// Resources whose owning policies are all being removed. Removal-safe.
    pub removable: Vec<Resource>,
    /// Resources referenced by zero declared policies. Reported, never
    /// removed: the static scan cannot see dynamic references.
    pub orphans: Vec<OrphanResource>,
}

/// For each resource, compute the set of policies referencing it and decide
/// removability: a resource goes only when its owner set is non-empty and
/// entirely contained in `removing`.
pub fn resolve_resource_ownership(
    bundle: &ProxyBundle,
    removing: &BTreeSet<String>,
) -> ResourcePlan {
    let mut plan = ResourcePlan::default();

    for resource in &bundle.resources {
        let owners: Vec<&str> = bundle
            .policies
            .iter()
            .filter(|p| p.resources.iter().any(|url| url == &resource.url))
            .map(|p| p.name.as_str())
            .collect();

        if owners.is_empty() {
            plan.orphans.push(OrphanResource {
                url: resource.url.clone(),
                path: resource.path.clone(),
            });
        } else if owners.iter().all(|owner| removing.contains(*owner)) {
            plan.removable.push(resource.clone());
        }
    }

    plan
}
