// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stage 1: the Structural Index Builder.
//!
//! Scans the source buffer once, producing the three parallel sequences of
//! §3 (`positions`, `characters`, `value_spans`). The classification of
//! each lane (which bytes are structural/quote/backslash) is vectorized per
//! [`crate::classify`]; the escape/in-string resolution is an inherently
//! serial bit-scan over the (typically sparse) union of quote and backslash
//! positions, so all variants below share one driver and differ only in how
//! they compute lane masks — guaranteeing identical `(positions, characters)`
//! output (see the crate's `classify::*` tests and this module's variant
//! equivalence tests).

use crate::classify::{self, LaneMasks};

/// The primitive kind a [`ValueSpan`] was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// No primitive followed the structural token.
    None,
    /// A JSON number.
    Number,
    /// The literal `true`.
    True,
    /// The literal `false`.
    False,
    /// The literal `null`.
    Null,
}

/// An optional primitive span attached to a structural token that precedes
/// a value (`:`, `,`, or `[`). Attaching a span is a pure optimization —
/// Stage 2 tolerates its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueSpan {
    /// Start byte offset of the primitive (inclusive).
    pub start: usize,
    /// End byte offset of the primitive (exclusive).
    pub end: usize,
    /// Which primitive kind this span holds.
    pub kind: ValueKind,
    /// Whether a `Number` span contains a `.`, `e`, or `E` (i.e. is a float).
    pub is_float: bool,
}

/// The Structural Index: three parallel sequences of equal length, per §3.
#[derive(Debug, Clone, Default)]
pub struct StructuralIndex {
    /// Byte offset of the i-th structural token, strictly increasing.
    pub positions: Vec<u32>,
    /// The token byte itself, one of `{}[]":,`.
    pub characters: Vec<u8>,
    /// An optional primitive span following token `i`, meaningful only
    /// when `characters[i]` is `:`, `,`, or `[`.
    pub value_spans: Vec<Option<ValueSpan>>,
}

impl StructuralIndex {
    fn with_capacity(cap: usize) -> Self {
        Self {
            positions: Vec::with_capacity(cap),
            characters: Vec::with_capacity(cap),
            value_spans: Vec::with_capacity(cap),
        }
    }

    fn push(&mut self, position: usize, character: u8, span: Option<ValueSpan>) {
        #[allow(clippy::cast_possible_truncation)]
        self.positions.push(position as u32);
        self.characters.push(character);
        self.value_spans.push(span);
    }

    /// Number of structural tokens recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// `true` iff no structural tokens were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Which Stage 1 implementation to use. All variants MUST be functionally
/// indistinguishable on `(positions, characters)` per §4.1; `value_spans`
/// may differ only in *presence*, never in content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanVariant {
    /// Plain byte-at-a-time scalar scan.
    Scalar,
    /// 16-byte vector lane (the portable floor).
    Simd16,
    /// 32-byte vector lane (optional, wider).
    Simd32,
    /// 256-entry byte-class lookup table, scalar loop.
    Branchless,
}

/// Build the structural index for `source` using `variant`, pre-classifying
/// primitive value spans along the way.
#[must_use]
pub fn build_structural_index(source: &[u8], variant: ScanVariant) -> StructuralIndex {
    let lane = match variant {
        ScanVariant::Scalar | ScanVariant::Branchless => 64,
        ScanVariant::Simd16 => classify::LANE_16,
        ScanVariant::Simd32 => classify::LANE_32,
    };
    let mut index = StructuralIndex::with_capacity(source.len() / 4 + 16);
    let mut in_string = false;
    let mut pending_escape: Option<usize> = None;

    let mut offset = 0;
    while offset < source.len() {
        let end = (offset + lane).min(source.len());
        let chunk = &source[offset..end];
        let masks = classify_chunk(chunk, variant);
        if masks.any() {
            scan_chunk(
                source,
                offset,
                &masks,
                &mut in_string,
                &mut pending_escape,
                &mut index,
            );
        }
        offset = end;
    }
    index
}

fn classify_chunk(chunk: &[u8], variant: ScanVariant) -> LaneMasks {
    match variant {
        ScanVariant::Scalar => classify::classify_scalar(chunk),
        ScanVariant::Branchless => classify::classify_branchless(chunk),
        ScanVariant::Simd16 => classify::classify_lane16(chunk),
        ScanVariant::Simd32 => classify::classify_lane32(chunk),
    }
}

/// Resolve the serial escape/in-string state for one lane's worth of
/// interesting positions, emitting structural tokens (and their lookahead
/// value spans) as they're found outside strings.
fn scan_chunk(
    source: &[u8],
    base: usize,
    masks: &LaneMasks,
    in_string: &mut bool,
    pending_escape: &mut Option<usize>,
    index: &mut StructuralIndex,
) {
    let mut interesting = masks.structural | masks.quote | masks.backslash;
    while interesting != 0 {
        let bit = interesting.trailing_zeros() as usize;
        interesting &= interesting - 1;
        let abs = base + bit;
        let lane_bit = 1u64 << bit;

        // `pending_escape` names the absolute position a backslash made
        // literal. Most escaped characters (`\n`, `\t`, ...) never set a
        // quote/backslash/structural bit, so the flag must be compared
        // against the exact position it targets rather than consumed by
        // whatever interesting bit happens to come next.
        if let Some(escaped) = *pending_escape {
            match abs.cmp(&escaped) {
                std::cmp::Ordering::Equal => {
                    *pending_escape = None;
                    continue;
                }
                std::cmp::Ordering::Greater => *pending_escape = None,
                std::cmp::Ordering::Less => unreachable!("interesting bits are strictly increasing"),
            }
        }
        if masks.backslash & lane_bit != 0 {
            if *in_string {
                *pending_escape = Some(abs + 1);
            }
            continue;
        }
        if masks.quote & lane_bit != 0 {
            index.push(abs, b'"', None);
            *in_string = !*in_string;
            continue;
        }
        if *in_string {
            continue;
        }
        // Structural byte outside a string.
        let ch = source[abs];
        let span = if matches!(ch, b':' | b',' | b'[') {
            lookahead_value_span(source, abs + 1)
        } else {
            None
        };
        index.push(abs, ch, span);
    }
}

/// Classify the primitive starting at `pos` (after skipping whitespace),
/// for callers (Stage 2's tape builder) that need to recover a span the
/// index didn't pre-compute, e.g. a bare scalar document with no
/// preceding `:`/`,`/`[` token to hang a lookahead off of.
#[must_use]
pub fn scan_primitive_span(source: &[u8], pos: usize) -> Option<ValueSpan> {
    lookahead_value_span(source, pos)
}

/// Skip whitespace after a `:`/`,`/`[` token and classify the following
/// primitive, if any, per §4.1's lookahead rule.
fn lookahead_value_span(source: &[u8], mut pos: usize) -> Option<ValueSpan> {
    while pos < source.len() && matches!(source[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    let start = pos;
    let first = *source.get(pos)?;
    match first {
        b'-' | b'0'..=b'9' => {
            let mut is_float = false;
            if first == b'-' {
                pos += 1;
            }
            while pos < source.len() {
                match source[pos] {
                    b'0'..=b'9' => pos += 1,
                    b'.' | b'e' | b'E' | b'+' | b'-' => {
                        is_float = true;
                        pos += 1;
                    }
                    _ => break,
                }
            }
            Some(ValueSpan {
                start,
                end: pos,
                kind: ValueKind::Number,
                is_float,
            })
        }
        b't' if source.get(pos..pos + 4) == Some(b"true") => Some(ValueSpan {
            start,
            end: pos + 4,
            kind: ValueKind::True,
            is_float: false,
        }),
        b'f' if source.get(pos..pos + 5) == Some(b"false") => Some(ValueSpan {
            start,
            end: pos + 5,
            kind: ValueKind::False,
            is_float: false,
        }),
        b'n' if source.get(pos..pos + 4) == Some(b"null") => Some(ValueSpan {
            start,
            end: pos + 4,
            kind: ValueKind::Null,
            is_float: false,
        }),
        _ => None,
    }
}

/// Build the structural index by partitioning `source` across `rayon`'s
/// global thread pool. Each chunk's initial `in_string` state is resolved
/// by the prefix-parity of unescaped-quote counts in every preceding chunk
/// (§4.1, §9): chunks overlap their read set by one byte so a chunk-final
/// backslash run can be reclassified correctly.
#[must_use]
pub fn build_structural_index_parallel(
    source: &[u8],
    variant: ScanVariant,
    chunk_size: usize,
) -> StructuralIndex {
    if source.len() <= chunk_size || chunk_size == 0 {
        return build_structural_index(source, variant);
    }

    let boundaries: Vec<(usize, usize)> = {
        let mut v = Vec::new();
        let mut start = 0;
        while start < source.len() {
            let end = (start + chunk_size).min(source.len());
            v.push((start, end));
            start = end;
        }
        v
    };

    // Sequential pre-pass: resolve each chunk's initial (in_string,
    // pending_escape) state by running the same serial automaton as
    // `scan_chunk`'s escape resolution, but over the whole buffer without
    // recording tokens. This generalizes the prefix-parity cross-chunk
    // dependency to cover an escape run that itself straddles a boundary,
    // not just the quote parity.
    let boundary_states = resolve_boundary_states(source, &boundaries);

    // Build each chunk's partial index in parallel, seeded with its
    // resolved initial state; this is the embarrassingly-parallel part
    // (lane classification + token extraction).
    use rayon::prelude::*;
    let partials: Vec<StructuralIndex> = boundaries
        .par_iter()
        .zip(boundary_states.par_iter())
        .map(|(&(start, end), &(seed_in_string, seed_pending_escape))| {
            build_structural_index_from(
                source,
                start,
                end,
                variant,
                seed_in_string,
                seed_pending_escape,
            )
        })
        .collect();

    // Concatenate in order.
    let mut merged = StructuralIndex::with_capacity(source.len() / 4 + 16);
    for partial in partials {
        merged.positions.extend(partial.positions);
        merged.characters.extend(partial.characters);
        merged.value_spans.extend(partial.value_spans);
    }
    merged
}

/// For each `(start, _)` boundary, compute the `(in_string, pending_escape)`
/// state immediately before `start`, by replaying the same serial automaton
/// `scan_chunk` uses, over the full buffer, without emitting tokens.
fn resolve_boundary_states(source: &[u8], boundaries: &[(usize, usize)]) -> Vec<(bool, bool)> {
    let mut states = Vec::with_capacity(boundaries.len());
    let mut boundary_iter = boundaries.iter().peekable();
    let mut in_string = false;
    let mut pending_escape = false;
    for (i, &b) in source.iter().enumerate() {
        while boundary_iter.peek().is_some_and(|&&(start, _)| start == i) {
            states.push((in_string, pending_escape));
            boundary_iter.next();
        }
        if pending_escape {
            pending_escape = false;
            continue;
        }
        match b {
            b'\\' if in_string => pending_escape = true,
            b'"' => in_string = !in_string,
            _ => {}
        }
    }
    while boundary_iter.next().is_some() {
        states.push((in_string, pending_escape));
    }
    states
}

#[allow(clippy::too_many_arguments)]
fn build_structural_index_from(
    source: &[u8],
    start: usize,
    end: usize,
    variant: ScanVariant,
    seed_in_string: bool,
    seed_pending_escape: bool,
) -> StructuralIndex {
    let lane = match variant {
        ScanVariant::Scalar | ScanVariant::Branchless => 64,
        ScanVariant::Simd16 => classify::LANE_16,
        ScanVariant::Simd32 => classify::LANE_32,
    };
    let mut index = StructuralIndex::with_capacity((end - start) / 4 + 4);
    let mut in_string = seed_in_string;
    // The boundary automaton tracks escaping as a bool (it visits every
    // byte, so it never needs the exact target position); `scan_chunk`
    // only visits interesting bits, so translate "byte `start` is escaped"
    // into the absolute position it must match.
    let mut pending_escape: Option<usize> = seed_pending_escape.then_some(start);
    let mut offset = start;
    while offset < end {
        let chunk_end = (offset + lane).min(end);
        let chunk = &source[offset..chunk_end];
        let masks = classify_chunk(chunk, variant);
        if masks.any() {
            scan_chunk(source, offset, &masks, &mut in_string, &mut pending_escape, &mut index);
        }
        offset = chunk_end;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARIANTS: [ScanVariant; 4] = [
        ScanVariant::Scalar,
        ScanVariant::Simd16,
        ScanVariant::Simd32,
        ScanVariant::Branchless,
    ];

    #[test]
    fn all_variants_agree_on_positions_and_characters() {
        let input = br#"{"name":"Alice","age":30,"active":true,"tags":["a","b\"c"]}"#;
        let reference = build_structural_index(input, ScanVariant::Scalar);
        for &variant in &VARIANTS[1..] {
            let other = build_structural_index(input, variant);
            assert_eq!(reference.positions, other.positions, "variant {variant:?}");
            assert_eq!(reference.characters, other.characters, "variant {variant:?}");
        }
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let input = br#""a\"b""#;
        let index = build_structural_index(input, ScanVariant::Scalar);
        // Only the opening and closing quote are recorded, not the escaped one.
        assert_eq!(index.characters, vec![b'"', b'"']);
        assert_eq!(index.positions, vec![0, 5]);
    }

    #[test]
    fn escape_of_non_structural_byte_does_not_swallow_closing_quote() {
        // The escaped character ('n') never sets a quote/backslash/structural
        // bit, so it's invisible to the interesting-bit scan; the closing
        // quote must still be recognized as real rather than as "the
        // character the backslash escaped".
        let input = br#""a\nb""#;
        let index = build_structural_index(input, ScanVariant::Scalar);
        assert_eq!(index.characters, vec![b'"', b'"']);
        assert_eq!(index.positions, vec![0, 5]);
    }

    #[test]
    fn even_backslash_run_before_quote_closes_string() {
        let input = br#""a\\""#; // a, then an escaped backslash, then closing quote
        let index = build_structural_index(input, ScanVariant::Scalar);
        assert_eq!(index.characters, vec![b'"', b'"']);
    }

    #[test]
    fn structural_bytes_inside_strings_are_ignored() {
        let input = br#"{"k":"{,}"}"#;
        let index = build_structural_index(input, ScanVariant::Scalar);
        assert_eq!(index.characters, vec![b'{', b'"', b':', b'"', b'"', b'}']);
    }

    #[test]
    fn value_span_attached_after_colon() {
        let input = br#"{"x":-65.613617}"#;
        let index = build_structural_index(input, ScanVariant::Scalar);
        let colon_idx = index.characters.iter().position(|&c| c == b':').unwrap();
        let span = index.value_spans[colon_idx].unwrap();
        assert_eq!(span.kind, ValueKind::Number);
        assert!(span.is_float);
        assert_eq!(&input[span.start..span.end], b"-65.613617");
    }

    #[test]
    fn parallel_matches_sequential() {
        let input = br#"{"items":[{"id":1},{"id":2},{"id":3}],"name":"test value here"}"#
            .repeat(8);
        let sequential = build_structural_index(&input, ScanVariant::Scalar);
        let parallel = build_structural_index_parallel(&input, ScanVariant::Scalar, 37);
        assert_eq!(sequential.positions, parallel.positions);
        assert_eq!(sequential.characters, parallel.characters);
    }

    #[test]
    fn parallel_boundary_inside_escaped_quote_run() {
        // Force a chunk boundary to land mid-escape by choosing a small chunk size.
        let input = br#"{"a":"\\\\\\\\","b":1}"#; // 8 backslashes => 4 escaped backslashes
        let sequential = build_structural_index(input, ScanVariant::Scalar);
        for chunk_size in 1..input.len() {
            let parallel = build_structural_index_parallel(input, ScanVariant::Scalar, chunk_size);
            assert_eq!(sequential.positions, parallel.positions, "chunk_size={chunk_size}");
            assert_eq!(sequential.characters, parallel.characters, "chunk_size={chunk_size}");
        }
    }

    proptest::proptest! {
        /// Property 6: scalar, 16-byte, and 32-byte scanners agree on
        /// `(positions, characters)` for arbitrary bytes, not just valid JSON.
        #[test]
        fn variants_agree_on_arbitrary_bytes(bytes in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..512)) {
            let reference = build_structural_index(&bytes, ScanVariant::Scalar);
            for &variant in &VARIANTS[1..] {
                let other = build_structural_index(&bytes, variant);
                proptest::prop_assert_eq!(&reference.positions, &other.positions);
                proptest::prop_assert_eq!(&reference.characters, &other.characters);
            }
        }

        /// Property 7: parallel structural scan output equals single-threaded
        /// output regardless of where chunk boundaries fall.
        #[test]
        fn parallel_scan_agrees_with_sequential(
            bytes in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..512),
            chunk_size in 1usize..64,
        ) {
            let sequential = build_structural_index(&bytes, ScanVariant::Scalar);
            let parallel = build_structural_index_parallel(&bytes, ScanVariant::Scalar, chunk_size);
            proptest::prop_assert_eq!(sequential.positions, parallel.positions);
            proptest::prop_assert_eq!(sequential.characters, parallel.characters);
        }
    }
}
