// SPDX-License-Identifier: MIT OR Apache-2.0
//! The permissive parser: a plain (non-SIMD, non-tape) recursive-descent
//! parser used only when [`ParserConfig::needs_permissive_parser`] is true.
//! It materializes a [`fionn_core::ValueTree`] directly rather than
//! building a tape, since `allow_comments`/`allow_trailing_comma` are
//! grammar deviations the fast path never needs to understand.

use serde_json::{Map, Value};

use fionn_core::{Error, ErrorKind, ParserConfig, Result};
use fionn_simd::number::{parse_float, parse_int, validate_keyword};

/// Parse `source` under `config`, accepting `//`/`/* */` comments and a
/// single trailing comma when enabled.
///
/// # Errors
/// Returns any [`fionn_core::ErrorKind`] the grammar can produce.
pub fn parse(source: &[u8], config: &ParserConfig) -> Result<Value> {
    let mut p = Permissive { source, pos: 0, config };
    p.skip_trivia();
    let value = p.parse_value(0)?;
    p.skip_trivia();
    if p.pos != source.len() {
        return Err(p.err(ErrorKind::UnexpectedCharacter));
    }
    Ok(value)
}

struct Permissive<'a> {
    source: &'a [u8],
    pos: usize,
    config: &'a ParserConfig,
}

impl<'a> Permissive<'a> {
    fn err(&self, kind: ErrorKind) -> Error {
        Error::at(self.source, self.pos, kind)
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
                self.pos += 1;
            }
            if !self.config.allow_comments {
                return;
            }
            match (self.peek(), self.source.get(self.pos + 1).copied()) {
                (Some(b'/'), Some(b'/')) => {
                    self.pos += 2;
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    self.pos += 2;
                    while self.pos < self.source.len()
                        && !(self.source[self.pos] == b'*'
                            && self.source.get(self.pos + 1) == Some(&b'/'))
                    {
                        self.pos += 1;
                    }
                    self.pos = (self.pos + 2).min(self.source.len());
                }
                _ => return,
            }
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value> {
        if depth > self.config.max_depth {
            return Err(self.err(ErrorKind::NestingTooDeep));
        }
        match self.peek() {
            Some(b'{') => self.parse_object(depth),
            Some(b'[') => self.parse_array(depth),
            Some(b'"') => Ok(Value::String(self.parse_string()?)),
            Some(b't') => {
                self.pos = validate_keyword(self.source, self.pos, b"true")?;
                Ok(Value::Bool(true))
            }
            Some(b'f') => {
                self.pos = validate_keyword(self.source, self.pos, b"false")?;
                Ok(Value::Bool(false))
            }
            Some(b'n') => {
                self.pos = validate_keyword(self.source, self.pos, b"null")?;
                Ok(Value::Null)
            }
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            _ => Err(self.err(ErrorKind::ExpectedValue)),
        }
    }

    fn parse_object(&mut self, depth: usize) -> Result<Value> {
        self.pos += 1; // '{'
        let mut map = Map::new();
        self.skip_trivia();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_trivia();
            if self.peek() != Some(b'"') {
                return Err(self.err(ErrorKind::UnterminatedObject));
            }
            let key = self.parse_string()?;
            self.skip_trivia();
            if self.peek() != Some(b':') {
                return Err(self.err(ErrorKind::ExpectedColon));
            }
            self.pos += 1;
            self.skip_trivia();
            let value = self.parse_value(depth + 1)?;
            map.insert(key, value);
            self.skip_trivia();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia();
                    if self.peek() == Some(b'}') {
                        if self.config.allow_trailing_comma {
                            self.pos += 1;
                            return Ok(Value::Object(map));
                        }
                        return Err(self.err(ErrorKind::TrailingComma));
                    }
                }
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                _ => return Err(self.err(ErrorKind::UnterminatedObject)),
            }
        }
    }

    fn parse_array(&mut self, depth: usize) -> Result<Value> {
        self.pos += 1; // '['
        let mut items = Vec::new();
        self.skip_trivia();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Value::Array(items));
        }
        loop {
            self.skip_trivia();
            items.push(self.parse_value(depth + 1)?);
            self.skip_trivia();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia();
                    if self.peek() == Some(b']') {
                        if self.config.allow_trailing_comma {
                            self.pos += 1;
                            return Ok(Value::Array(items));
                        }
                        return Err(self.err(ErrorKind::TrailingComma));
                    }
                }
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                _ => return Err(self.err(ErrorKind::UnterminatedArray)),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1; // opening quote
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(Error::at(self.source, start, ErrorKind::UnterminatedString)),
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let esc = self.peek().ok_or_else(|| self.err(ErrorKind::InvalidStringEscape))?;
                    match esc {
                        b'"' => out.push('"'),
                        b'\\' => out.push('\\'),
                        b'/' => out.push('/'),
                        b'b' => out.push('\u{8}'),
                        b'f' => out.push('\u{c}'),
                        b'n' => out.push('\n'),
                        b'r' => out.push('\r'),
                        b't' => out.push('\t'),
                        b'u' => {
                            self.pos += 1;
                            let ch = self.parse_unicode_escape()?;
                            out.push(ch);
                            continue;
                        }
                        _ => return Err(self.err(ErrorKind::InvalidStringEscape)),
                    }
                    self.pos += 1;
                }
                Some(_) => {
                    let byte_start = self.pos;
                    while !matches!(self.peek(), None | Some(b'"' | b'\\')) {
                        self.pos += 1;
                    }
                    out.push_str(
                        std::str::from_utf8(&self.source[byte_start..self.pos]).unwrap_or_default(),
                    );
                }
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char> {
        let unit = self.read_hex4()?;
        if (0xD800..=0xDBFF).contains(&unit) {
            if self.source.get(self.pos..self.pos + 2) != Some(b"\\u") {
                return Err(self.err(ErrorKind::InvalidSurrogate));
            }
            self.pos += 2;
            let low = self.read_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.err(ErrorKind::InvalidSurrogate));
            }
            let c = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            char::from_u32(c).ok_or_else(|| self.err(ErrorKind::InvalidSurrogate))
        } else if (0xDC00..=0xDFFF).contains(&unit) {
            Err(self.err(ErrorKind::InvalidSurrogate))
        } else {
            char::from_u32(unit).ok_or_else(|| self.err(ErrorKind::InvalidUnicodeEscape))
        }
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let digits = self
            .source
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.err(ErrorKind::InvalidUnicodeEscape))?;
        let text = std::str::from_utf8(digits).map_err(|_| self.err(ErrorKind::InvalidUnicodeEscape))?;
        let value = u32::from_str_radix(text, 16).map_err(|_| self.err(ErrorKind::InvalidUnicodeEscape))?;
        self.pos += 4;
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => self.pos += 1,
                b'.' | b'e' | b'E' | b'+' | b'-' if self.pos > start => {
                    is_float = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let span = (start, self.pos);
        if is_float {
            let value = parse_float(self.source, span)?;
            Ok(serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number))
        } else {
            let value = parse_int(self.source, span)?;
            Ok(Value::Number(value.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_mode_matches_serde_json() {
        let src = br#"{"a":1,"b":[true,false,null],"c":"hi\n"}"#;
        let ours = parse(src, &ParserConfig::default()).unwrap();
        let theirs: Value = serde_json::from_slice(src).unwrap();
        assert_eq!(ours, theirs);
    }

    #[test]
    fn rejects_trailing_comma_by_default() {
        assert!(parse(br#"[1,2,]"#, &ParserConfig::default()).is_err());
    }

    #[test]
    fn allows_trailing_comma_when_enabled() {
        let config = ParserConfig {
            allow_trailing_comma: true,
            ..ParserConfig::default()
        };
        let value = parse(br#"[1,2,]"#, &config).unwrap();
        assert_eq!(value, serde_json::json!([1, 2]));
    }

    #[test]
    fn allows_comments_when_enabled() {
        let config = ParserConfig {
            allow_comments: true,
            ..ParserConfig::default()
        };
        let src = b"{\n  // a comment\n  \"a\": 1 /* inline */\n}";
        let value = parse(src, &config).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[test]
    fn comments_rejected_by_default() {
        assert!(parse(b"{ // nope\n}", &ParserConfig::default()).is_err());
    }
}
