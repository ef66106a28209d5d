// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub collaborator for builds that ship no word-processor or workbook decoder.
//
// Every method returns `CollaboratorUnavailable`; the pipeline surfaces that
// as a failed job rather than guessing at the file's contents.

use pagewright_core::error::{PagewrightError, Result};

use crate::traits::*;

/// Extractor that is never able to extract anything.
pub struct UnavailableExtractor;

impl TextExtractor for UnavailableExtractor {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        tracing::warn!(len = bytes.len(), "TextExtractor::extract_text called on stub");
        Err(PagewrightError::CollaboratorUnavailable(
            "word-processor text extraction".into(),
        ))
    }
}

impl WorkbookReader for UnavailableExtractor {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn read_first_sheet(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
        tracing::warn!(len = bytes.len(), "WorkbookReader::read_first_sheet called on stub");
        Err(PagewrightError::CollaboratorUnavailable(
            "binary workbook decoding".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_unavailable() {
        let err = UnavailableExtractor.extract_text(b"PK\x03\x04").unwrap_err();
        assert!(matches!(err, PagewrightError::CollaboratorUnavailable(_)));
        let err = UnavailableExtractor.read_first_sheet(b"PK\x03\x04").unwrap_err();
        assert!(matches!(err, PagewrightError::CollaboratorUnavailable(_)));
    }
}
