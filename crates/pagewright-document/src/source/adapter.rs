// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source adapter — routes one input file to its handler and produces a
// `PageSource`.
//
// Tool-specific operations force their handler (a Word conversion always goes
// through the text extractor); Quick Convert detects the format and, when
// nothing matches, degrades to a labelled placeholder page instead of failing.

use pagewright_bridge::{Collaborators, DelimitedWorkbookReader, WorkbookReader};
use pagewright_core::error::{PagewrightError, Result};
use pagewright_core::types::Operation;
use tracing::{debug, info, instrument, warn};

use super::matcher::{FormatMatcher, SourceKind};
use super::{AdaptedSource, InputFile, PageSource};
use crate::image::processor::ImageProcessor;
use crate::pdf::reader::PdfReader;

/// Normalises input files into page sources.
#[derive(Debug, Clone, Default)]
pub struct SourceAdapter {
    matcher: FormatMatcher,
    collaborators: Collaborators,
}

impl SourceAdapter {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            matcher: FormatMatcher::default(),
            collaborators,
        }
    }

    pub fn with_matcher(mut self, matcher: FormatMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Decide which handler `input` goes to for `operation`.
    pub fn route(&self, input: &InputFile, operation: Operation) -> SourceKind {
        match operation {
            Operation::Merge | Operation::Compress | Operation::View => SourceKind::Pdf,
            Operation::Images => SourceKind::Image,
            Operation::Text => SourceKind::PlainText,
            Operation::Word => SourceKind::WordDocument,
            Operation::Spreadsheet => {
                match self.matcher.resolve(input.mime.as_deref(), &input.name) {
                    kind @ (SourceKind::Csv | SourceKind::Tsv) => kind,
                    _ => SourceKind::Workbook,
                }
            }
            Operation::QuickConvert => self.matcher.resolve(input.mime.as_deref(), &input.name),
            Operation::Presentation | Operation::Password => SourceKind::Unknown,
        }
    }

    /// Produce the page source for one input.
    ///
    /// Unknown formats never fail: they become a `Text` placeholder naming the
    /// file. Every other handler failure is returned as-is.
    #[instrument(skip(self, input), fields(name = %input.name, bytes_len = input.bytes.len()))]
    pub fn adapt(&self, input: &InputFile, operation: Operation) -> Result<AdaptedSource> {
        let kind = self.route(input, operation);
        debug!(?kind, ?operation, "input routed");

        let source = match self.read(input, kind) {
            Ok(source) => source,
            Err(err) if !err.is_fatal() => {
                warn!(%err, "no handler for input, substituting placeholder");
                placeholder(&input.name)
            }
            Err(err) => return Err(err),
        };

        info!(variant = source.variant_name(), ?kind, "input adapted");
        Ok(AdaptedSource {
            name: input.name.clone(),
            kind,
            source,
        })
    }

    fn read(&self, input: &InputFile, kind: SourceKind) -> Result<PageSource> {
        let bytes = input.bytes.as_slice();
        match kind {
            SourceKind::Pdf => {
                let reader = PdfReader::from_bytes(bytes).map_err(|err| match err {
                    PagewrightError::CorruptInput(detail) => {
                        PagewrightError::CorruptInput(format!("{}: {}", input.name, detail))
                    }
                    other => other,
                })?;
                let page_count = reader.page_count();
                Ok(PageSource::ExistingDocument {
                    document: reader.into_document(),
                    page_count,
                })
            }
            SourceKind::Image => {
                let processor = ImageProcessor::from_bytes(bytes)?;
                let (width, height) = (processor.width(), processor.height());
                Ok(PageSource::Image {
                    bitmap: processor.into_opaque_rgb(),
                    width,
                    height,
                })
            }
            SourceKind::PlainText => Ok(PageSource::Text(String::from_utf8_lossy(bytes).into_owned())),
            SourceKind::Csv => Ok(PageSource::RowTable(
                DelimitedWorkbookReader::comma().read_first_sheet(bytes)?,
            )),
            SourceKind::Tsv => Ok(PageSource::RowTable(
                DelimitedWorkbookReader::tab().read_first_sheet(bytes)?,
            )),
            SourceKind::WordDocument => Ok(PageSource::Text(
                self.collaborators.text.extract_text(bytes)?,
            )),
            SourceKind::Workbook => Ok(PageSource::RowTable(
                self.collaborators.workbook.read_first_sheet(bytes)?,
            )),
            SourceKind::Unknown => Err(PagewrightError::UnsupportedFormat(format!(
                "{} ({})",
                input.name,
                input.mime.as_deref().unwrap_or("no MIME type")
            ))),
        }
    }
}

/// The page produced for an input nobody knows how to read.
pub fn placeholder(file_name: &str) -> PageSource {
    PageSource::Text(format!("Converted from {file_name}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::pdf::reader::tests::fixture_pdf;
    use pagewright_bridge::TextExtractor;

    struct FixedText(&'static str);

    impl TextExtractor for FixedText {
        fn name(&self) -> &str {
            "fixed"
        }

        fn extract_text(&self, bytes: &[u8]) -> Result<String> {
            if bytes.starts_with(b"PK") {
                Ok(self.0.to_string())
            } else {
                Err(PagewrightError::UnreadableDocument("not a zip container".into()))
            }
        }
    }

    fn adapter() -> SourceAdapter {
        SourceAdapter::new(Collaborators::default().with_text(Arc::new(FixedText("Hello Word"))))
    }

    #[test]
    fn unknown_quick_convert_becomes_placeholder() {
        let input = InputFile::new("deck.pptx", None, vec![0, 1, 2]);
        let adapted = adapter().adapt(&input, Operation::QuickConvert).unwrap();
        assert_eq!(adapted.kind, SourceKind::Unknown);
        match adapted.source {
            PageSource::Text(text) => assert_eq!(text, "Converted from deck.pptx"),
            other => panic!("expected placeholder text, got {}", other.variant_name()),
        }
    }

    #[test]
    fn quick_convert_prefers_mime_over_extension() {
        let input = InputFile::new("notes.pdf", Some("text/plain"), b"plain words".to_vec());
        let adapted = adapter().adapt(&input, Operation::QuickConvert).unwrap();
        assert!(matches!(adapted.source, PageSource::Text(ref t) if t == "plain words"));
    }

    #[test]
    fn merge_of_garbage_is_corrupt_input() {
        let input = InputFile::new("broken.pdf", Some("application/pdf"), b"nope".to_vec());
        let err = adapter().adapt(&input, Operation::Merge).unwrap_err();
        assert!(matches!(err, PagewrightError::CorruptInput(ref d) if d.contains("broken.pdf")));
    }

    #[test]
    fn pdf_becomes_existing_document() {
        let input = InputFile::new("in.pdf", None, fixture_pdf(&["1", "2"]));
        let adapted = adapter().adapt(&input, Operation::Merge).unwrap();
        assert!(matches!(
            adapted.source,
            PageSource::ExistingDocument { page_count: 2, .. }
        ));
    }

    #[test]
    fn word_goes_through_the_extractor() {
        let input = InputFile::new("letter.docx", None, b"PK\x03\x04".to_vec());
        let adapted = adapter().adapt(&input, Operation::Word).unwrap();
        assert!(matches!(adapted.source, PageSource::Text(ref t) if t == "Hello Word"));

        let bad = InputFile::new("letter.docx", None, b"garbage".to_vec());
        let err = adapter().adapt(&bad, Operation::Word).unwrap_err();
        assert!(matches!(err, PagewrightError::UnreadableDocument(_)));
    }

    #[test]
    fn spreadsheet_reads_csv_locally_and_xlsx_via_collaborator() {
        let csv = InputFile::new("rows.csv", None, b"a,b\nc,d\n".to_vec());
        let adapted = adapter().adapt(&csv, Operation::Spreadsheet).unwrap();
        assert!(matches!(adapted.source, PageSource::RowTable(ref rows) if rows.len() == 2));

        let xlsx = InputFile::new("book.xlsx", None, b"PK".to_vec());
        let err = adapter().adapt(&xlsx, Operation::Spreadsheet).unwrap_err();
        assert!(matches!(err, PagewrightError::CollaboratorUnavailable(_)));
    }

    #[test]
    fn images_operation_rejects_non_images() {
        let input = InputFile::new("photo.jpg", None, b"not really".to_vec());
        let err = adapter().adapt(&input, Operation::Images).unwrap_err();
        assert!(matches!(err, PagewrightError::Image(_)));
    }

    #[test]
    fn extra_matcher_rules_extend_quick_convert() {
        use crate::source::matcher::FormatRule;

        let input = InputFile::new("notes.rtf", None, b"rich enough".to_vec());
        assert_eq!(
            adapter().adapt(&input, Operation::QuickConvert).unwrap().kind,
            SourceKind::Unknown
        );

        let matcher = FormatMatcher::new().with_rule(FormatRule {
            kind: SourceKind::PlainText,
            mime_types: &["text/rtf"],
            extensions: &["rtf"],
        });
        let adapted = adapter()
            .with_matcher(matcher)
            .adapt(&input, Operation::QuickConvert)
            .unwrap();
        assert_eq!(adapted.kind, SourceKind::PlainText);
        assert!(matches!(adapted.source, PageSource::Text(ref t) if t == "rich enough"));
    }
}
