// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic extraction traits.

use pagewright_core::error::Result;

/// Pulls the plain text out of a word-processor document.
pub trait TextExtractor: Send + Sync {
    /// Human-readable implementation name for diagnostics.
    fn name(&self) -> &str;

    /// Extract the document's raw text.
    ///
    /// Fails with `PagewrightError::UnreadableDocument` when the bytes are not
    /// a document this extractor understands.
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// Reads the first sheet of a workbook as ordered rows of ordered cells.
pub trait WorkbookReader: Send + Sync {
    fn name(&self) -> &str;

    /// Fails with `PagewrightError::UnreadableWorkbook` on unreadable input.
    fn read_first_sheet(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>>;
}
