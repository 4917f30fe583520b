// SPDX-License-Identifier: MIT OR Apache-2.0
//! Core types shared across the fionn workspace: errors, parser
//! configuration, and the tape/value-tree seams the other crates build on.
//!
//! - [`error`] - error kinds, positions, and the `Result` alias
//! - [`config`] - parser configuration (`max_depth`, comments, trailing commas)
//! - [`value`] - the compatibility value tree (a thin `serde_json::Value` seam)

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

/// Parser configuration knobs (`max_depth`, `allow_trailing_comma`, `allow_comments`).
pub mod config;
/// Error kinds, source positions, and the `Result` alias used everywhere.
pub mod error;
/// The compatibility value tree.
pub mod value;

pub use config::ParserConfig;
pub use error::{Error, ErrorKind, Position, Result};
pub use value::ValueTree;
