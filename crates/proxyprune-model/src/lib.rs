//! In-memory model of a proxy bundle.
//!
//! The model is built once per input archive by the parser and is never
//! mutated in place: every transformation yields a new value. Iteration
//! orders are deterministic (file order for endpoints and policies, BTreeMap
//! order for the file tree) so downstream detection and reports are
//! reproducible across runs.

#![forbid(unsafe_code)]

mod bundle;
mod tree;

pub use bundle::{
    Endpoint, EndpointKind, FaultRule, Flow, PolicyDefinition, ProxyBundle, Resource, Step,
};
pub use tree::FileTree;
