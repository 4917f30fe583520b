// SPDX-License-Identifier: MIT OR Apache-2.0
//! Adaptive dispatch: a one-shot content sniffer that samples up to the
//! first ~1KiB of a buffer and selects a scan/decode variant by byte
//! frequency outside strings, per §4.4. The sniffer is advisory only —
//! every variant produces identical tapes for identical valid input.

use crate::structural::ScanVariant;

/// Up to how many leading bytes the sniffer samples.
const SAMPLE_SIZE: usize = 1024;

/// The variant selected by [`sniff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanProfile {
    /// `digit_ratio > 0.20`, or `structural_ratio > 0.15` with low digit and
    /// quote ratios (dense token streams like flat numeric arrays): benefits
    /// from the branchless byte-class scan plus inlined float powers of ten.
    NumberHeavy,
    /// `quote_ratio > 0.03`: string-heavy documents skip value-span
    /// pre-classification, since most tokens precede strings, not numbers.
    StringHeavy,
    /// Neither threshold crossed: value-span pre-classification stays on.
    Balanced,
}

impl ScanProfile {
    /// The [`ScanVariant`] this profile recommends for Stage 1.
    #[must_use]
    pub const fn recommended_variant(self) -> ScanVariant {
        match self {
            Self::NumberHeavy => ScanVariant::Branchless,
            Self::StringHeavy | Self::Balanced => ScanVariant::Simd16,
        }
    }
}

/// Sample `source`'s leading bytes and classify it by digit/quote/structural
/// density, outside of string literals.
#[must_use]
pub fn sniff(source: &[u8]) -> ScanProfile {
    let sample = &source[..source.len().min(SAMPLE_SIZE)];
    if sample.is_empty() {
        return ScanProfile::Balanced;
    }

    let mut digits = 0usize;
    let mut quotes = 0usize;
    let mut structural = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &b in sample {
        if escaped {
            escaped = false;
            continue;
        }
        if b == b'\\' && in_string {
            escaped = true;
            continue;
        }
        if b == b'"' {
            quotes += 1;
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        if b.is_ascii_digit() {
            digits += 1;
        }
        if crate::classify::is_structural(b) {
            structural += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let total = sample.len() as f64;
    let digit_ratio = digits as f64 / total;
    let quote_ratio = quotes as f64 / total;
    let structural_ratio = structural as f64 / total;

    if digit_ratio > 0.20 {
        ScanProfile::NumberHeavy
    } else if quote_ratio > 0.03 {
        ScanProfile::StringHeavy
    } else if structural_ratio > 0.15 {
        // Dense token streams outside the digit/quote thresholds (e.g. deeply
        // nested containers of short values) get the same branchless
        // byte-class dispatch NumberHeavy recommends.
        ScanProfile::NumberHeavy
    } else {
        ScanProfile::Balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_balanced() {
        assert_eq!(sniff(b""), ScanProfile::Balanced);
    }

    #[test]
    fn number_heavy_document_is_detected() {
        let input = b"[1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17,18,19,20]";
        assert_eq!(sniff(input), ScanProfile::NumberHeavy);
    }

    #[test]
    fn string_heavy_document_is_detected() {
        let input =
            br#"{"a":"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}"#;
        assert_eq!(sniff(input), ScanProfile::StringHeavy);
    }

    #[test]
    fn structural_heavy_document_is_detected() {
        let input = b"[[[[[[[[[[]]]]]]]]]]";
        assert_eq!(sniff(input), ScanProfile::NumberHeavy);
    }

    #[test]
    fn digits_inside_strings_are_not_counted() {
        let input = br#"{"x":"11111111111111111111111111111111111111111111111"}"#;
        // All those digits are inside a string, so digit_ratio outside strings stays low.
        assert_ne!(sniff(input), ScanProfile::NumberHeavy);
    }
}
