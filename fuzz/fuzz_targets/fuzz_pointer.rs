// SPDX-License-Identifier: MIT OR Apache-2.0
//! libFuzzer target for RFC 6901 JSON Pointer resolution. Splits the fuzz
//! input on the first NUL byte into a JSON document and a pointer string;
//! resolution must never panic, and a syntactically valid pointer must
//! always return (never `Err`) even when it resolves to nothing.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 50_000 {
        return;
    }
    let Some(split) = data.iter().position(|&b| b == 0) else {
        return;
    };
    let (json_bytes, rest) = data.split_at(split);
    let Ok(pointer) = std::str::from_utf8(&rest[1..]) else {
        return;
    };

    let Ok(doc) = fionn_tape::parse_lazy(json_bytes) else {
        return;
    };

    let result = fionn_tape::pointer::resolve(doc.root(), pointer);
    if pointer.is_empty() || pointer.starts_with('/') {
        // Only a malformed `~` escape can still fail here.
        if let Err(err) = &result {
            assert!(
                pointer.contains('~'),
                "well-formed pointer {pointer:?} unexpectedly failed: {err}"
            );
        }
    } else {
        assert!(result.is_err(), "pointer without leading '/' should be rejected");
    }
});
