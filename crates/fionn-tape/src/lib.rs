// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stage 2 and beyond: the tape builder, string side-buffer, lazy access
//! layer, JSON Pointer resolution, the permissive parser, and fionn's
//! public `parse*` entry points.
//!
//! - [`tape`] - the flat tagged-entry tape (§3)
//! - [`strings`] - the string side-buffer and escape decoding
//! - [`builder`] - Stage 2: Structural Index -> tape
//! - [`document`] - the `Arc`-shared parsed document
//! - [`lazy`] - zero-copy navigation over a document's tape
//! - [`pointer`] - RFC 6901 JSON Pointer resolution
//! - [`permissive`] - the non-SIMD fallback parser for relaxed configs
//! - [`parse`] - `parse`, `parse_lazy`, `parse_with_config`, `parse_safe`

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

/// Stage 2: builds a tape from a Stage 1 structural index.
pub mod builder;
/// The `Arc`-shared parsed document (source + tape + string buffer).
pub mod document;
/// Zero-copy lazy navigation over a document's tape.
pub mod lazy;
/// Public parsing entry points.
pub mod parse;
/// The non-SIMD permissive parser for relaxed `ParserConfig`s.
pub mod permissive;
/// RFC 6901 JSON Pointer resolution.
pub mod pointer;
/// The string side-buffer and escape decoding.
pub mod strings;
/// The flat tagged-entry tape representation.
pub mod tape;

pub use document::Document;
pub use lazy::{ArrayIter, LazyValue, ObjectIter};
pub use parse::{parse, parse_lazy, parse_safe, parse_to_document, parse_with_config};
pub use strings::StringBuffer;
pub use tape::{Tag, Tape};
