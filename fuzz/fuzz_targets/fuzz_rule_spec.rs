//! Fuzz target for rule:variant argument parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = proxyprune_settings::parse_rule_spec(text);
    }
});
