// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stage 2: the Tape Builder. Walks the Structural Index produced by
//! [`fionn_simd`] once, left to right, emitting tape entries and string
//! descriptors. Containers are matched with a depth counter rather than an
//! explicit stack of indices, since at most one "patch this later" index is
//! ever pending per nesting level.

use fionn_core::{Error, ErrorKind, ParserConfig, Result};
use fionn_simd::{ScanVariant, ValueKind, ValueSpan, build_structural_index, scan_primitive_span};

use crate::strings::StringBuffer;
use crate::tape::{Tag, Tape};

/// Build a tape and string buffer for `source`, using `variant` for Stage 1
/// and enforcing `config.max_depth`.
///
/// # Errors
/// Returns any [`fionn_core::ErrorKind`] the grammar can produce: malformed
/// literals/numbers/strings, mismatched brackets, trailing/missing commas,
/// or nesting past `max_depth`.
pub fn build_tape(source: &[u8], config: &ParserConfig, variant: ScanVariant) -> Result<(Tape, StringBuffer)> {
    let index = build_structural_index(source, variant);
    let mut builder = Builder {
        source,
        positions: &index.positions,
        characters: &index.characters,
        value_spans: &index.value_spans,
        cursor: 0,
        tape: Tape::with_capacity(index.len() * 2 + 4),
        strings: StringBuffer::with_capacity(index.len() / 2 + 1),
        max_depth: config.max_depth,
    };
    builder.build_document()?;
    Ok((builder.tape, builder.strings))
}

struct Builder<'a> {
    source: &'a [u8],
    positions: &'a [u32],
    characters: &'a [u8],
    value_spans: &'a [Option<ValueSpan>],
    cursor: usize,
    tape: Tape,
    strings: StringBuffer,
    max_depth: usize,
}

impl<'a> Builder<'a> {
    fn len(&self) -> usize {
        self.characters.len()
    }

    fn peek(&self) -> Option<(usize, u8)> {
        if self.cursor < self.len() {
            Some((self.positions[self.cursor] as usize, self.characters[self.cursor]))
        } else {
            None
        }
    }

    fn peek_span(&self) -> Option<ValueSpan> {
        self.value_spans.get(self.cursor).copied().flatten()
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }

    fn err_here(&self, kind: ErrorKind) -> Error {
        let offset = self
            .peek()
            .map_or(self.source.len(), |(pos, _)| pos);
        Error::at(self.source, offset, kind)
    }

    /// Parse the whole document: exactly one value, then nothing but
    /// trailing whitespace.
    fn build_document(&mut self) -> Result<()> {
        let root = self.tape.push(Tag::Root, 0);
        let value_start = self.first_value_offset();
        self.parse_value(0, value_start)?;
        if self.cursor != self.len() {
            let (pos, _) = self.peek().expect("cursor < len implies a token exists");
            return Err(Error::at(self.source, pos, ErrorKind::UnexpectedCharacter));
        }
        #[allow(clippy::cast_possible_truncation)]
        self.tape.patch_payload(root, self.tape.len() as u64);
        Ok(())
    }

    /// The byte offset a bare top-level scalar would start at: right after
    /// any leading whitespace, or the position of the first structural
    /// token if the document is a container/string.
    fn first_value_offset(&self) -> usize {
        let mut pos = 0;
        while pos < self.source.len() && matches!(self.source[pos], b' ' | b'\t' | b'\n' | b'\r') {
            pos += 1;
        }
        pos
    }

    /// Parse one value. `scan_from` is the byte offset to resume scanning a
    /// primitive from when the current structural token (if any) doesn't
    /// itself start the value (i.e. the value is a bare number/bool/null
    /// that Stage 1 never indexes).
    fn parse_value(&mut self, depth: usize, scan_from: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::at(self.source, scan_from, ErrorKind::NestingTooDeep));
        }
        match self.peek() {
            Some((pos, b'{')) if pos == scan_from => self.parse_object(depth),
            Some((pos, b'[')) if pos == scan_from => self.parse_array(depth),
            Some((pos, b'"')) if pos == scan_from => self.parse_string(),
            _ => self.parse_primitive(scan_from),
        }
    }

    fn parse_primitive(&mut self, scan_from: usize) -> Result<()> {
        let span = self
            .peek_span()
            .filter(|s| s.start == scan_from)
            .or_else(|| scan_primitive_span(self.source, scan_from))
            .ok_or_else(|| self.err_here(ErrorKind::ExpectedValue))?;
        match span.kind {
            ValueKind::None => Err(self.err_here(ErrorKind::ExpectedValue)),
            ValueKind::Null => {
                fionn_simd::number::validate_keyword(self.source, span.start, b"null")?;
                self.tape.push(Tag::Null, 0);
                Ok(())
            }
            ValueKind::True => {
                fionn_simd::number::validate_keyword(self.source, span.start, b"true")?;
                self.tape.push(Tag::True, 0);
                Ok(())
            }
            ValueKind::False => {
                fionn_simd::number::validate_keyword(self.source, span.start, b"false")?;
                self.tape.push(Tag::False, 0);
                Ok(())
            }
            ValueKind::Number if span.is_float => {
                let value = fionn_simd::number::parse_float(self.source, (span.start, span.end))?;
                self.tape.push(Tag::Double, 0);
                self.tape.push_raw(value.to_bits());
                Ok(())
            }
            ValueKind::Number => {
                let value = fionn_simd::number::parse_int(self.source, (span.start, span.end))?;
                self.tape.push(Tag::Int64, 0);
                #[allow(clippy::cast_sign_loss)]
                self.tape.push_raw(value as u64);
                Ok(())
            }
        }
    }

    fn parse_string(&mut self) -> Result<()> {
        let (open_pos, _) = self.peek().expect("caller checked this is a quote");
        self.advance();
        let (close_pos, ch) = self
            .peek()
            .ok_or_else(|| Error::at(self.source, open_pos, ErrorKind::UnterminatedString))?;
        if ch != b'"' {
            return Err(Error::at(self.source, open_pos, ErrorKind::UnterminatedString));
        }
        self.advance();
        let content_start = open_pos + 1;
        let content_len = close_pos - content_start;
        let has_escape = self.source[content_start..close_pos].contains(&b'\\');
        #[allow(clippy::cast_possible_truncation)]
        let offset = self
            .strings
            .push(content_start as u32, content_len as u32, has_escape);
        self.tape.push(Tag::String, u64::from(offset));
        Ok(())
    }

    fn parse_object(&mut self, depth: usize) -> Result<()> {
        let (open_pos, _) = self.peek().expect("caller checked this is '{'");
        self.advance();
        let start = self.tape.push(Tag::StartObject, 0);

        if matches!(self.peek(), Some((_, b'}'))) {
            self.advance();
            let end = self.tape.push(Tag::EndObject, start as u64);
            #[allow(clippy::cast_possible_truncation)]
            self.tape.patch_payload(start, end as u64);
            return Ok(());
        }

        self.parse_member(depth, open_pos)?;
        loop {
            match self.peek() {
                Some((_, b',')) => {
                    let (comma_pos, _) = self.peek().expect("just matched ','");
                    self.advance();
                    if matches!(self.peek(), Some((_, b'}'))) {
                        return Err(Error::at(self.source, comma_pos, ErrorKind::TrailingComma));
                    }
                    self.parse_member(depth, open_pos)?;
                }
                Some((_, b'}')) => {
                    self.advance();
                    let end = self.tape.push(Tag::EndObject, start as u64);
                    #[allow(clippy::cast_possible_truncation)]
                    self.tape.patch_payload(start, end as u64);
                    return Ok(());
                }
                _ => return Err(Error::at(self.source, open_pos, ErrorKind::UnterminatedObject)),
            }
        }
    }

    /// Parse one `"key" : value` member of an object. `open_pos` is the
    /// enclosing `{`'s position, used for unterminated-object errors.
    fn parse_member(&mut self, depth: usize, open_pos: usize) -> Result<()> {
        match self.peek() {
            Some((_, b'"')) => self.parse_string()?,
            _ => return Err(Error::at(self.source, open_pos, ErrorKind::UnterminatedObject)),
        }
        match self.peek() {
            Some((_, b':')) => {}
            _ => return Err(self.err_here(ErrorKind::ExpectedColon)),
        }
        let colon_span = self.peek_span();
        let (colon_pos, _) = self.peek().expect("just matched ':'");
        self.advance();
        let scan_from = colon_span.map_or_else(|| self.skip_whitespace(colon_pos + 1), |s| s.start);
        self.parse_value(depth + 1, scan_from)
    }

    fn parse_array(&mut self, depth: usize) -> Result<()> {
        let (open_pos, _) = self.peek().expect("caller checked this is '['");
        let open_span = self.peek_span();
        self.advance();
        let start = self.tape.push(Tag::StartArray, 0);

        if matches!(self.peek(), Some((_, b']'))) {
            self.advance();
            let end = self.tape.push(Tag::EndArray, start as u64);
            #[allow(clippy::cast_possible_truncation)]
            self.tape.patch_payload(start, end as u64);
            return Ok(());
        }

        let first_scan_from = open_span.map_or_else(|| self.skip_whitespace(open_pos + 1), |s| s.start);
        self.parse_value(depth + 1, first_scan_from)?;

        loop {
            match self.peek() {
                Some((_, b',')) => {
                    let comma_span = self.peek_span();
                    let (comma_pos, _) = self.peek().expect("just matched ','");
                    self.advance();
                    if matches!(self.peek(), Some((_, b']'))) {
                        return Err(Error::at(self.source, comma_pos, ErrorKind::TrailingComma));
                    }
                    let scan_from =
                        comma_span.map_or_else(|| self.skip_whitespace(comma_pos + 1), |s| s.start);
                    self.parse_value(depth + 1, scan_from)?;
                }
                Some((_, b']')) => {
                    self.advance();
                    let end = self.tape.push(Tag::EndArray, start as u64);
                    #[allow(clippy::cast_possible_truncation)]
                    self.tape.patch_payload(start, end as u64);
                    return Ok(());
                }
                _ => return Err(Error::at(self.source, open_pos, ErrorKind::UnterminatedArray)),
            }
        }
    }

    fn skip_whitespace(&self, mut pos: usize) -> usize {
        while pos < self.source.len() && matches!(self.source[pos], b' ' | b'\t' | b'\n' | b'\r') {
            pos += 1;
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tape::Tag;

    fn build(source: &[u8]) -> (Tape, StringBuffer) {
        build_tape(source, &ParserConfig::default(), ScanVariant::Scalar).unwrap()
    }

    #[test]
    fn builds_bare_scalar_document() {
        let (tape, _) = build(b"  42  ");
        assert_eq!(tape.tag_at(1), Tag::Int64);
        assert_eq!(tape.int_at(1), 42);
        assert_eq!(tape.payload_at(0), tape.len() as u64);
    }

    #[test]
    fn builds_bare_float_document() {
        let (tape, _) = build(b"-65.613617");
        assert_eq!(tape.tag_at(1), Tag::Double);
        assert!((tape.double_at(1) - (-65.613617)).abs() < 1e-9);
    }

    #[test]
    fn builds_nested_object_and_array() {
        let source = br#"{"name":"Alice","tags":["a","b"],"active":true,"age":30,"meta":null}"#;
        let (tape, strings) = build(source);
        assert_eq!(tape.tag_at(0), Tag::Root);
        assert_eq!(tape.tag_at(1), Tag::StartObject);
        let end_idx = tape.payload_at(1) as usize;
        assert_eq!(tape.tag_at(end_idx), Tag::EndObject);
        assert_eq!(tape.payload_at(end_idx), 1);

        // First key is "name".
        assert_eq!(tape.tag_at(2), Tag::String);
        let key = strings.resolve(source, tape.payload_at(2) as u32).unwrap();
        assert_eq!(key, "name");
    }

    #[test]
    fn rejects_trailing_comma_by_default() {
        let err = build_tape(br#"[1,2,]"#, &ParserConfig::default(), ScanVariant::Scalar).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TrailingComma));
    }

    #[test]
    fn rejects_mismatched_brackets() {
        let err = build_tape(br#"[1,2"#, &ParserConfig::default(), ScanVariant::Scalar).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnterminatedArray));
    }

    #[test]
    fn rejects_nesting_past_max_depth() {
        let mut config = ParserConfig::default();
        config.max_depth = 2;
        let err = build_tape(br#"[[[1]]]"#, &config, ScanVariant::Scalar).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NestingTooDeep));
    }

    #[test]
    fn empty_object_and_array_round_trip() {
        let (tape, _) = build(b"{}");
        assert_eq!(tape.tag_at(1), Tag::StartObject);
        assert_eq!(tape.tag_at(2), Tag::EndObject);
        let (tape, _) = build(b"[]");
        assert_eq!(tape.tag_at(1), Tag::StartArray);
        assert_eq!(tape.tag_at(2), Tag::EndArray);
    }
}
