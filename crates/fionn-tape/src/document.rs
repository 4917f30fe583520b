// SPDX-License-Identifier: MIT OR Apache-2.0
//! The parsed document: source bytes, tape, and string buffer bundled
//! behind an [`Arc`] so that [`crate::lazy::LazyValue`] handles can be
//! copied and passed around freely without touching the allocator.

use std::sync::Arc;

use crate::strings::StringBuffer;
use crate::tape::Tape;

#[derive(Debug)]
pub(crate) struct DocumentData {
    pub(crate) source: Box<[u8]>,
    pub(crate) tape: Tape,
    pub(crate) strings: StringBuffer,
}

/// An owned, successfully-parsed JSON document: the source bytes, the
/// tape, and the string side-buffer, sharing one allocation group.
///
/// Cloning a [`Document`] is an `Arc` bump, not a copy.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) data: Arc<DocumentData>,
}

impl Document {
    pub(crate) fn new(source: Box<[u8]>, tape: Tape, strings: StringBuffer) -> Self {
        Self {
            data: Arc::new(DocumentData { source, tape, strings }),
        }
    }

    /// The original source bytes this document was parsed from.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.data.source
    }

    /// The underlying tape.
    #[must_use]
    pub fn tape(&self) -> &Tape {
        &self.data.tape
    }

    /// A [`crate::lazy::LazyValue`] cursor at the document's root value
    /// (tape index 1, immediately after the `Root` entry).
    #[must_use]
    pub fn root(&self) -> crate::lazy::LazyValue<'_> {
        crate::lazy::LazyValue::at(self, 1)
    }
}
