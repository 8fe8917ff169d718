//! Fuzz target for XML descriptor parsing.
//!
//! Goal: The parser should **never panic** on any input.
//! It may return errors, but panics are unacceptable.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_descriptor_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Descriptors must be UTF-8; other inputs fail earlier.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = proxyprune_parser::fuzz::parse_descriptor(text);
    }
});
