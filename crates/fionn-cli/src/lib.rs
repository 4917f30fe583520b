// SPDX-License-Identifier: MIT OR Apache-2.0
//! # fionn-cli
//!
//! Command-line interface for fionn - a SIMD-accelerated JSON parser.
//!
//! ## Installation
//!
//! ```bash
//! cargo install fionn-cli
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Parse JSON and print the materialized value
//! fionn parse data.json
//!
//! # Validate JSON without materializing a value tree
//! fionn validate data.json
//!
//! # Pretty-print or compact-format JSON
//! fionn format data.json
//! fionn format -c data.json
//!
//! # Resolve a JSON Pointer lazily, without parsing the rest of the document
//! fionn pointer /users/0/name data.json
//!
//! # Compare parse throughput against serde_json
//! fionn bench data.json
//! ```
//!
//! ## Subcommands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `parse` | Parse JSON and print the materialized value |
//! | `validate` | Check JSON validity via the fast tape path |
//! | `format` | Pretty-print or compact JSON |
//! | `pointer` | Resolve an RFC 6901 JSON Pointer lazily |
//! | `bench` | Compare parse throughput against `serde_json` |
//!
//! ## Library Usage
//!
//! This crate is primarily a CLI tool. For programmatic access, use the
//! constituent library crates directly:
//!
//! - [`fionn`](https://docs.rs/fionn) - umbrella crate re-exporting the public API
//! - [`fionn-tape`](https://docs.rs/fionn-tape) - tape building, lazy access, JSON Pointer
//! - [`fionn-simd`](https://docs.rs/fionn-simd) - SIMD structural scanning primitives
//! - [`fionn-core`](https://docs.rs/fionn-core) - core types, errors, configuration

#![doc(html_root_url = "https://docs.rs/fionn-cli/0.1.0")]
#![warn(missing_docs)]

/// Re-export of fionn-tape for tape parsing and lazy access.
pub use fionn_tape as tape;

/// Re-export of fionn-core for core types.
pub use fionn_core as core;
