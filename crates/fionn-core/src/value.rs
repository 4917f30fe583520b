// SPDX-License-Identifier: MIT OR Apache-2.0
//! The compatibility value tree.
//!
//! The DOM-style value tree is an external collaborator: the fast path
//! never materializes one on its own. `ValueTree` is a thin alias over
//! [`serde_json::Value`] so that `parse`/`parse_safe`/`parse_with_config`
//! have somewhere to land without fionn inventing its own tree type.

/// The value tree returned by the compatibility parse entry points.
pub type ValueTree = serde_json::Value;
