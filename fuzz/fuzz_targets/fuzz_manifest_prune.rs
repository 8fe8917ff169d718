//! Fuzz target for manifest pruning.
//!
//! Goal: pruning should **never panic** on any input, and must return the
//! input unchanged or an error rather than corrupt output.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = proxyprune_parser::fuzz::prune_manifest(text);
    }
});
