//! Rendering for the human-readable report artifacts.
//!
//! All renderers are pure functions of already-sorted bundle reports, so
//! report bytes are reproducible across runs.

#![forbid(unsafe_code)]

mod sequential;
mod size;
mod unattached;

pub use sequential::render_sequential_report;
pub use size::render_size_summary;
pub use unattached::render_unattached_report;

use proxyprune_types::{FlowKind, Phase};

pub(crate) fn flow_kind_label(kind: FlowKind) -> &'static str {
    match kind {
        FlowKind::PreFlow => "PreFlow",
        FlowKind::Conditional => "Flow",
        FlowKind::PostFlow => "PostFlow",
        FlowKind::FaultRule => "FaultRule",
        FlowKind::DefaultFaultRule => "DefaultFaultRule",
    }
}

pub(crate) fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Request => "Request",
        Phase::Response => "Response",
        Phase::Fault => "Fault",
    }
}
