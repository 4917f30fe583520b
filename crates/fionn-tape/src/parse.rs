// SPDX-License-Identifier: MIT OR Apache-2.0
//! Public entry points: the fast tape path (`parse`, `parse_to_document`,
//! `parse_lazy`), the permissive path (`parse_with_config`), and a
//! never-panics wrapper (`parse_safe`).

use std::panic::{self, AssertUnwindSafe};

use fionn_core::{Error, ErrorKind, ParserConfig, Result, ValueTree};
use fionn_simd::sniff;

use crate::builder::build_tape;
use crate::document::Document;
use crate::lazy::LazyValue;

/// Parse `source` into a fully-materialized [`ValueTree`], using the fast
/// SIMD tape path with a Stage 1 variant chosen by [`fionn_simd::sniff`].
///
/// # Errors
/// Returns any parse error the grammar can produce (see
/// [`fionn_core::ErrorKind`]). The default [`ParserConfig`] is strict:
/// no comments, no trailing commas.
pub fn parse(source: &[u8]) -> Result<ValueTree> {
    let doc = parse_to_document(source)?;
    materialize(doc.root())
}

/// Parse `source` into a [`Document`] backed by the tape, without
/// flattening it into a [`ValueTree`]. Equivalent to [`parse_lazy`].
///
/// # Errors
/// See [`parse`].
pub fn parse_to_document(source: &[u8]) -> Result<Document> {
    let config = ParserConfig::default();
    let variant = sniff(source).recommended_variant();
    let (tape, strings) = build_tape(source, &config, variant)?;
    Ok(Document::new(source.to_vec().into_boxed_slice(), tape, strings))
}

/// Parse `source` for lazy, zero-copy navigation via
/// [`Document::root`]/[`crate::pointer::resolve`], deferring all
/// materialization to individual field accesses.
///
/// # Errors
/// See [`parse`].
pub fn parse_lazy(source: &[u8]) -> Result<Document> {
    parse_to_document(source)
}

/// Parse `source` under a custom [`ParserConfig`]. When
/// `config.needs_permissive_parser()`, control passes to the permissive
/// recursive-descent parser (comments/trailing commas); otherwise the fast
/// tape path runs with `config.max_depth` enforced.
///
/// # Errors
/// See [`parse`].
pub fn parse_with_config(source: &[u8], config: &ParserConfig) -> Result<ValueTree> {
    if config.needs_permissive_parser() {
        return crate::permissive::parse(source, config);
    }
    let variant = sniff(source).recommended_variant();
    let (tape, strings) = build_tape(source, config, variant)?;
    let doc = Document::new(source.to_vec().into_boxed_slice(), tape, strings);
    materialize(doc.root())
}

/// Parse `source` the way [`parse`] does, but never unwind into the
/// caller: any internal panic is caught and reported as
/// [`ErrorKind::Internal`] instead.
///
/// # Errors
/// See [`parse`]; additionally returns [`ErrorKind::Internal`] if parsing
/// panicked.
pub fn parse_safe(source: &[u8]) -> Result<ValueTree> {
    panic::catch_unwind(AssertUnwindSafe(|| parse(source)))
        .unwrap_or_else(|_| Err(Error::at(source, 0, ErrorKind::Internal)))
}

/// Recursively flatten a lazy cursor into an owned [`ValueTree`]. Object
/// members materialize in tape order, so a duplicate key's later
/// occurrence overwrites the earlier one (`Map::insert`'s normal
/// last-wins behavior).
///
/// Unlike [`LazyValue`]'s navigation methods, this does not swallow a
/// malformed string escape as "absent" — it uses
/// [`LazyValue::try_as_str`] so a bad `\uXXXX`/surrogate pair surfaces as
/// an `Err` here rather than silently materializing as `null`.
///
/// # Errors
/// Returns the decode error from the first malformed string (key or
/// value) encountered, if any.
fn materialize(value: LazyValue<'_>) -> Result<ValueTree> {
    if let Some(b) = value.as_bool() {
        return Ok(ValueTree::Bool(b));
    }
    if let Some(i) = value.as_i64() {
        return Ok(ValueTree::Number(i.into()));
    }
    if let Some(f) = value.as_f64() {
        return Ok(serde_json::Number::from_f64(f).map_or(ValueTree::Null, ValueTree::Number));
    }
    if let Some(s) = value.try_as_str() {
        return Ok(ValueTree::String(s?.into_owned()));
    }
    if value.is_array() {
        let items: Vec<ValueTree> =
            value.iter_array().map(materialize).collect::<Result<_>>()?;
        return Ok(ValueTree::Array(items));
    }
    if value.is_object() {
        let mut map = serde_json::Map::new();
        for (key, v) in value.iter_object_raw() {
            let key = key.try_as_str().transpose()?.unwrap_or_default();
            map.insert(key.into_owned(), materialize(v)?);
        }
        return Ok(ValueTree::Object(map));
    }
    Ok(ValueTree::Null)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn parse_matches_serde_json_for_representative_document() {
        let src = br#"{"name":"Alice","age":30,"tags":["a","b"],"active":true,"meta":null}"#;
        let ours = parse(src).unwrap();
        let theirs: ValueTree = serde_json::from_slice(src).unwrap();
        assert_eq!(ours, theirs);
    }

    #[test]
    fn parse_lazy_and_parse_agree_via_pointer() {
        let src = br#"{"a":{"b":[1,2,3]}}"#;
        let whole = parse(src).unwrap();
        let expected = whole.pointer("/a/b/1").cloned().unwrap();

        let doc = parse_lazy(src).unwrap();
        let found = crate::pointer::resolve(doc.root(), "/a/b/1").unwrap();
        assert_eq!(materialize(found).unwrap(), expected);
    }

    #[test]
    fn string_with_letter_escape_followed_by_more_content_parses() {
        let src = br#"{"a":"x\ny","b":2}"#;
        let value = parse(src).unwrap();
        assert_eq!(value, serde_json::json!({"a": "x\ny", "b": 2}));
    }

    #[test]
    fn malformed_surrogate_escape_is_a_parse_error_not_null() {
        let src = br#"{"a":"\ud800"}"#;
        let err = parse(src).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidSurrogate));
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let src = br#"{"a":1,"a":2}"#;
        let value = parse(src).unwrap();
        assert_eq!(value, serde_json::json!({"a": 2}));
    }

    #[test]
    fn parse_with_config_enforces_max_depth_on_fast_path() {
        let config = ParserConfig { max_depth: 1, ..ParserConfig::default() };
        let err = parse_with_config(br#"[[1]]"#, &config).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NestingTooDeep));
    }

    #[test]
    fn parse_with_config_uses_permissive_parser_for_comments() {
        let config = ParserConfig { allow_comments: true, ..ParserConfig::default() };
        let value = parse_with_config(b"{ \"a\": 1 // trailing\n}", &config).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[test]
    fn parse_safe_reports_errors_without_panicking() {
        let err = parse_safe(b"{not json}").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    /// A strategy generating arbitrary (non-duplicate-keyed) JSON values,
    /// bounded in depth and breadth to keep cases small.
    pub(crate) fn arbitrary_json() -> impl proptest::strategy::Strategy<Value = serde_json::Value> {
        use proptest::prelude::*;
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::Bool),
            any::<i32>().prop_map(|i| serde_json::Value::Number(i.into())),
            "[a-zA-Z0-9 ]{0,12}".prop_map(serde_json::Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
                proptest::collection::btree_map("[a-zA-Z][a-zA-Z0-9]{0,8}", inner, 0..6).prop_map(
                    |map| serde_json::Value::Object(map.into_iter().collect())
                ),
            ]
        })
    }

    proptest::proptest! {
        /// Property 1: for RFC 8259-valid inputs, the tape builder's
        /// materialized result agrees with the reference `serde_json` parse.
        #[test]
        fn parse_matches_serde_json_for_arbitrary_values(value in arbitrary_json()) {
            let bytes = serde_json::to_vec(&value).unwrap();
            let ours = parse(&bytes).unwrap();
            proptest::prop_assert_eq!(ours, value);
        }

        /// Property 5: `parse_lazy(s).pointer(p) == extract(parse(s), p)` for
        /// every valid pointer into the document (here, every path generated
        /// by walking the materialized tree).
        #[test]
        fn lazy_pointer_matches_full_materialization(value in arbitrary_json()) {
            let bytes = serde_json::to_vec(&value).unwrap();
            let whole = parse(&bytes).unwrap();
            let doc = parse_lazy(&bytes).unwrap();
            for path in collect_pointers(&whole, String::new()) {
                let expected = whole.pointer(&path).cloned();
                let found = crate::pointer::resolve(doc.root(), &path).unwrap();
                let actual = (!found.is_missing()).then(|| materialize(found).unwrap());
                proptest::prop_assert_eq!(actual, expected, "pointer {}", path);
            }
        }
    }

    /// Every RFC 6901 pointer reachable by walking `value`, including the root (`""`).
    fn collect_pointers(value: &serde_json::Value, prefix: String) -> Vec<String> {
        let mut paths = vec![prefix.clone()];
        match value {
            serde_json::Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    paths.extend(collect_pointers(item, format!("{prefix}/{i}")));
                }
            }
            serde_json::Value::Object(map) => {
                for (k, v) in map {
                    let escaped = k.replace('~', "~0").replace('/', "~1");
                    paths.extend(collect_pointers(v, format!("{prefix}/{escaped}")));
                }
            }
            _ => {}
        }
        paths
    }
}


