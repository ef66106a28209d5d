// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagewright — Extraction collaborator contracts.
//
// Word-processor text extraction and binary workbook decoding are provided by
// the embedding application. This crate defines what the document engine
// expects of them, a stub for builds that have neither, and a delimited-text
// reader that covers CSV/TSV without any external help.

pub mod delimited;
pub mod stub;
pub mod traits;

use std::sync::Arc;

pub use delimited::DelimitedWorkbookReader;
pub use stub::UnavailableExtractor;
pub use traits::{TextExtractor, WorkbookReader};

/// The set of collaborators a source adapter dispatches to.
#[derive(Clone)]
pub struct Collaborators {
    /// Word-processor text extraction.
    pub text: Arc<dyn TextExtractor>,
    /// Binary workbook (xlsx/xls/ods) decoding.
    pub workbook: Arc<dyn WorkbookReader>,
}

impl Collaborators {
    /// Replace the word-processor extractor.
    pub fn with_text(mut self, text: Arc<dyn TextExtractor>) -> Self {
        self.text = text;
        self
    }

    /// Replace the binary workbook reader.
    pub fn with_workbook(mut self, workbook: Arc<dyn WorkbookReader>) -> Self {
        self.workbook = workbook;
        self
    }
}

impl Default for Collaborators {
    /// Both collaborators report themselves unavailable.
    fn default() -> Self {
        Self {
            text: Arc::new(UnavailableExtractor),
            workbook: Arc::new(UnavailableExtractor),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("text", &self.text.name())
            .field("workbook", &self.workbook.name())
            .finish()
    }
}
