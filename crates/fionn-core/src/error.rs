// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy for fionn's parsing surfaces.
//!
//! Every failure the fast path or the permissive parser can produce carries
//! a byte offset and a 1-indexed line/column, per the error handling design:
//! the fast path fails fast, drops the partial tape, and surfaces exactly
//! one [`Error`].

/// Result alias used throughout fionn's parsing crates.
pub type Result<T> = std::result::Result<T, Error>;

/// A 1-indexed source position, plus the raw byte offset it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset into the source buffer.
    pub offset: usize,
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column number.
    pub column: usize,
}

impl Position {
    /// Compute the line/column of `offset` within `source` by counting
    /// newlines up to that point.
    #[must_use]
    pub fn locate(source: &[u8], offset: usize) -> Self {
        let bound = offset.min(source.len());
        let mut line = 1usize;
        let mut col_start = 0usize;
        for (i, &byte) in source[..bound].iter().enumerate() {
            if byte == b'\n' {
                line += 1;
                col_start = i + 1;
            }
        }
        Self {
            offset,
            line,
            column: bound - col_start + 1,
        }
    }
}

/// The kind of parse failure, independent of where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A byte was found where no structural byte or value start is valid.
    UnexpectedCharacter,
    /// The buffer ended mid-value or mid-container.
    UnexpectedEndOfInput,
    /// `\x` where `x` is not one of the defined escape letters.
    InvalidStringEscape,
    /// `\uXXXX` where the four hex digits are missing or malformed.
    InvalidUnicodeEscape,
    /// A `\uD800..=\uDFFF` surrogate that is not part of a valid high/low pair.
    InvalidSurrogate,
    /// A numeric literal that does not conform to RFC 8259 grammar.
    InvalidNumber,
    /// `true`/`false`/`null` misspelled.
    InvalidLiteral,
    /// A string's closing quote was never found.
    UnterminatedString,
    /// An array's closing `]` was never found.
    UnterminatedArray,
    /// An object's closing `}` was never found.
    UnterminatedObject,
    /// An object key was not followed by `:`.
    ExpectedColon,
    /// A value was required but the next token isn't one.
    ExpectedValue,
    /// A trailing comma was seen and `allow_trailing_comma` is off.
    TrailingComma,
    /// Container nesting exceeded `max_depth`.
    NestingTooDeep,
    /// The parser panicked; caught and reported by `parse_safe` instead of
    /// unwinding into the caller.
    Internal,
}

impl ErrorKind {
    fn message(self) -> &'static str {
        match self {
            Self::UnexpectedCharacter => "unexpected character",
            Self::UnexpectedEndOfInput => "unexpected end of input",
            Self::InvalidStringEscape => "invalid string escape",
            Self::InvalidUnicodeEscape => "invalid unicode escape",
            Self::InvalidSurrogate => "invalid surrogate pair",
            Self::InvalidNumber => "invalid number",
            Self::InvalidLiteral => "invalid literal",
            Self::UnterminatedString => "unterminated string",
            Self::UnterminatedArray => "unterminated array",
            Self::UnterminatedObject => "unterminated object",
            Self::ExpectedColon => "expected ':'",
            Self::ExpectedValue => "expected a value",
            Self::TrailingComma => "trailing comma not allowed",
            Self::NestingTooDeep => "nesting too deep",
            Self::Internal => "internal parser error",
        }
    }
}

/// A terminal parse error: the fast path and the permissive parser both
/// stop at the first one and discard whatever partial state they built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("JSON parse error at line {}, column {}: {}", position.line, position.column, kind.message())]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it went wrong.
    pub position: Position,
}

impl Error {
    /// Construct an error for `kind` at `offset` within `source`.
    #[must_use]
    pub fn at(source: &[u8], offset: usize, kind: ErrorKind) -> Self {
        Self {
            kind,
            position: Position::locate(source, offset),
        }
    }

    /// Render the error with up to `radius` bytes of source context on
    /// either side, `...`-bracketed, with a caret under the offending byte.
    #[must_use]
    pub fn with_context(&self, source: &[u8], radius: usize) -> String {
        let offset = self.position.offset.min(source.len());
        let start = offset.saturating_sub(radius);
        let end = (offset + radius).min(source.len());
        let snippet = String::from_utf8_lossy(&source[start..end]);
        let prefix = if start > 0 { "..." } else { "" };
        let suffix = if end < source.len() { "..." } else { "" };
        let caret_col = prefix.len() + (offset - start);
        let mut out = format!("{self}\n{prefix}{snippet}{suffix}\n");
        out.push_str(&" ".repeat(caret_col));
        out.push('^');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_first_line() {
        let pos = Position::locate(b"abc", 2);
        assert_eq!(pos, Position { offset: 2, line: 1, column: 3 });
    }

    #[test]
    fn locates_after_newline() {
        let pos = Position::locate(b"ab\ncd", 4);
        assert_eq!(pos, Position { offset: 4, line: 2, column: 2 });
    }

    #[test]
    fn display_matches_spec_format() {
        let err = Error::at(b"{\"bad\":}", 7, ErrorKind::ExpectedValue);
        assert_eq!(
            err.to_string(),
            "JSON parse error at line 1, column 8: expected a value"
        );
    }

    #[test]
    fn context_marks_offset() {
        let err = Error::at(b"{\"bad\":}", 7, ErrorKind::ExpectedValue);
        let ctx = err.with_context(b"{\"bad\":}", 4);
        assert!(ctx.contains('^'));
    }
}
