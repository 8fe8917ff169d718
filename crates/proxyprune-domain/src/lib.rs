//! Pure bundle analysis (no IO).
//!
//! Input: a bundle model constructed elsewhere.
//! Output: reference graph, findings, and rewritten bundle values.

#![forbid(unsafe_code)]

mod graph;
mod resources;
mod rewrite;
mod sequential;
mod unattached;

pub use graph::{ReferenceGraph, build_reference_graph};
pub use resources::{ResourcePlan, resolve_resource_ownership};
pub use rewrite::{RemovalPlan, RewriteError, rewrite_bundle};
pub use sequential::find_sequential_runs;
pub use unattached::find_unattached;
