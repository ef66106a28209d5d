// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page layout, writing new documents, reading and merging
// existing ones.

pub mod layout;
pub mod merge;
pub mod reader;
pub mod writer;

pub use layout::{AssembledDocument, AssembledPage, PageContent};
pub use merge::MergeBuilder;
pub use reader::PdfReader;
pub use writer::PdfWriter;

use lopdf::{Dictionary, Document, Object};

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_KEYS: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Look up `key` on a page dictionary, walking up `/Parent` links when the
/// page does not carry it itself.
pub(crate) fn inherited_attribute<'a>(
    document: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = page;
    // Malformed files can contain /Parent cycles.
    for _ in 0..64 {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = document.get_dictionary(parent_id).ok()?;
    }
    None
}
