// SPDX-License-Identifier: MIT OR Apache-2.0
//! libFuzzer target for the permissive parser: splits the fuzz input into
//! a one-byte config selector and a document, then checks that relaxing
//! `allow_trailing_comma`/`allow_comments` never makes a strictly-valid
//! document disagree with `serde_json`, and never panics on malformed
//! input either way.

#![no_main]

use fionn_core::ParserConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > 50_000 {
        return;
    }
    let (&selector, source) = data.split_first().expect("checked non-empty above");
    let config = ParserConfig {
        allow_trailing_comma: selector & 0b01 != 0,
        allow_comments: selector & 0b10 != 0,
        ..ParserConfig::default()
    };

    let Ok(ours) = fionn_tape::parse_with_config(source, &config) else {
        return;
    };

    if !config.allow_trailing_comma && !config.allow_comments {
        if let Ok(theirs) = serde_json::from_slice::<serde_json::Value>(source) {
            assert_eq!(ours, theirs, "strict config disagreed with serde_json");
        }
    }
});
