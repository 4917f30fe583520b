// SPDX-License-Identifier: MIT OR Apache-2.0
//! RFC 6901 JSON Pointer resolution over [`LazyValue`] cursors.
//!
//! Pointer syntax errors (an unescaped `~` sequence, a pointer not starting
//! with `/`) are the only fallible part of this module; a syntactically
//! valid pointer that simply doesn't resolve to anything returns
//! [`LazyValue::not_found`], matching the lazy layer's infallible-by-default
//! design.

use fionn_core::{Error, ErrorKind, Result};

use crate::lazy::LazyValue;

/// Resolve `pointer` (an RFC 6901 JSON Pointer, e.g. `"/a/b/0"`) against
/// `root`.
///
/// # Errors
/// Returns [`ErrorKind::UnexpectedCharacter`] if `pointer` is non-empty and
/// doesn't start with `/`, or contains a `~` not followed by `0` or `1`.
pub fn resolve<'a>(root: LazyValue<'a>, pointer: &str) -> Result<LazyValue<'a>> {
    if pointer.is_empty() {
        return Ok(root);
    }
    if !pointer.starts_with('/') {
        return Err(Error::at(pointer.as_bytes(), 0, ErrorKind::UnexpectedCharacter));
    }

    let mut current = root;
    for raw_segment in pointer[1..].split('/') {
        let segment = unescape_segment(raw_segment)?;
        current = if current.is_array() {
            match parse_array_index(&segment) {
                Some(i) => current.index(i),
                None => LazyValue::not_found(current.doc()),
            }
        } else {
            current.get(&segment)
        };
        if current.is_missing() {
            return Ok(current);
        }
    }
    Ok(current)
}

/// Parse an RFC 6901 array segment: a decimal index with no leading zeros,
/// except the literal `"0"` itself.
fn parse_array_index(segment: &str) -> Option<usize> {
    if segment == "0" {
        return Some(0);
    }
    if segment.is_empty() || segment.starts_with('0') || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse::<usize>().ok()
}

/// RFC 6901 token unescaping: `~1` -> `/`, `~0` -> `~`, applied in that
/// order so `~01` means `~1`, not `/`.
fn unescape_segment(segment: &str) -> Result<String> {
    if !segment.contains('~') {
        return Ok(segment.to_string());
    }
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('1') => out.push('/'),
            Some('0') => out.push('~'),
            _ => {
                return Err(Error::at(segment.as_bytes(), 0, ErrorKind::UnexpectedCharacter));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_to_document;

    #[test]
    fn resolves_nested_pointer() {
        let doc = parse_to_document(br#"{"a":{"b":["x","y","z"]}}"#).unwrap();
        let found = resolve(doc.root(), "/a/b/1").unwrap();
        assert_eq!(found.as_str().as_deref(), Some("y"));
    }

    #[test]
    fn empty_pointer_returns_whole_document() {
        let doc = parse_to_document(br#"{"a":1}"#).unwrap();
        let found = resolve(doc.root(), "").unwrap();
        assert!(found.is_object());
    }

    #[test]
    fn unescapes_tilde_and_slash_tokens() {
        let doc = parse_to_document(br#"{"a/b":1,"c~d":2}"#).unwrap();
        assert_eq!(resolve(doc.root(), "/a~1b").unwrap().as_i64(), Some(1));
        assert_eq!(resolve(doc.root(), "/c~0d").unwrap().as_i64(), Some(2));
    }

    #[test]
    fn missing_path_resolves_to_not_found_not_error() {
        let doc = parse_to_document(br#"{"a":1}"#).unwrap();
        let found = resolve(doc.root(), "/x/y/z").unwrap();
        assert!(found.is_missing());
    }

    #[test]
    fn malformed_escape_is_a_syntax_error() {
        let doc = parse_to_document(br#"{"a":1}"#).unwrap();
        assert!(resolve(doc.root(), "/a~").is_err());
    }

    #[test]
    fn pointer_without_leading_slash_is_an_error() {
        let doc = parse_to_document(br#"{"a":1}"#).unwrap();
        assert!(resolve(doc.root(), "a").is_err());
    }

    #[test]
    fn array_index_with_leading_zero_is_not_found() {
        let doc = parse_to_document(br#"["x","y","z"]"#).unwrap();
        assert!(resolve(doc.root(), "/01").unwrap().is_missing());
        assert_eq!(resolve(doc.root(), "/0").unwrap().as_str().as_deref(), Some("x"));
        assert_eq!(resolve(doc.root(), "/1").unwrap().as_str().as_deref(), Some("y"));
    }
}
