// SPDX-License-Identifier: MIT OR Apache-2.0
//! libFuzzer target verifying that every Structural Index Builder variant
//! (scalar, 16-byte, 32-byte, branchless, and the parallel chunked scan)
//! agrees on `(positions, characters)` for the same arbitrary bytes, per
//! the "all variants MUST be functionally indistinguishable" requirement.
//! Input need not be valid JSON: the builder never fails on its own.

#![no_main]

use fionn_simd::{ScanVariant, build_structural_index, build_structural_index_parallel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let reference = build_structural_index(data, ScanVariant::Scalar);
    for &variant in &[ScanVariant::Simd16, ScanVariant::Simd32, ScanVariant::Branchless] {
        let other = build_structural_index(data, variant);
        assert_eq!(reference.positions, other.positions, "variant {variant:?} diverged");
        assert_eq!(reference.characters, other.characters, "variant {variant:?} diverged");
    }

    if !data.is_empty() {
        let chunk_size = 1 + (data.len() % 37);
        let parallel = build_structural_index_parallel(data, ScanVariant::Scalar, chunk_size);
        assert_eq!(reference.positions, parallel.positions, "parallel scan diverged");
        assert_eq!(reference.characters, parallel.characters, "parallel scan diverged");
    }
});
