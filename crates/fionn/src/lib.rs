// SPDX-License-Identifier: MIT OR Apache-2.0
//! # fionn
//!
//! A two-stage, SIMD-accelerated JSON parser: a vectorized structural
//! scanner (Stage 1) feeds a tape builder (Stage 2) that produces a flat,
//! densely-packed tape supporting both full materialization and zero-copy
//! lazy navigation.
//!
//! This crate is the public facade over fionn's constituent crates:
//!
//! - [`fionn_core`] - error taxonomy, [`ParserConfig`], the [`ValueTree`] alias
//! - [`fionn_simd`] - the structural index builder, SWAR number decoders, adaptive sniffing
//! - [`fionn_tape`] - the tape builder, string buffer, lazy access layer, JSON Pointer
//!
//! ```
//! let value = fionn::parse(br#"{"hello":"world"}"#).unwrap();
//! assert_eq!(value["hello"], "world");
//! ```
//!
//! For zero-copy navigation without materializing the whole document:
//!
//! ```
//! let doc = fionn::parse_lazy(br#"{"a":{"b":[1,2,3]}}"#).unwrap();
//! let value = fionn::pointer::resolve(doc.root(), "/a/b/1").unwrap();
//! assert_eq!(value.as_i64(), Some(2));
//! ```

#![doc(html_root_url = "https://docs.rs/fionn/0.1.0")]
#![warn(missing_docs)]

pub use fionn_core::{Error, ErrorKind, ParserConfig, Position, Result, ValueTree};
pub use fionn_simd::{ScanProfile, ScanVariant, StructuralIndex, ValueKind, ValueSpan, sniff};
pub use fionn_tape::{
    ArrayIter, Document, LazyValue, ObjectIter, StringBuffer, Tag, Tape, parse, parse_lazy,
    parse_safe, parse_to_document, parse_with_config, pointer,
};

/// The fionn-core crate, re-exported for callers that want the module path.
pub use fionn_core as core;
/// The fionn-simd crate, re-exported for callers that want the module path.
pub use fionn_simd as simd;
/// The fionn-tape crate, re-exported for callers that want the module path.
pub use fionn_tape as tape;
