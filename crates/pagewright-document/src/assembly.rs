// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembly engine — turns adapted page sources into one finished PDF.
//
// Three algorithms, selected by operation and source variant:
//   * line layout for text and table rows,
//   * one page per image for image sequences,
//   * structural page copy for merges.
// Whatever ran, the output is re-parsed before it is handed back; an empty or
// page-less result is an error, never a result.

use pagewright_core::config::AppConfig;
use pagewright_core::error::{PagewrightError, Result};
use pagewright_core::types::Operation;
use tracing::{debug, info, instrument, warn};

use crate::pdf::layout::{self, AssembledDocument};
use crate::pdf::merge::MergeBuilder;
use crate::pdf::reader::PdfReader;
use crate::pdf::writer::PdfWriter;
use crate::source::{AdaptedSource, PageSource, SourceKind};

/// A finished, verified document.
#[derive(Debug, Clone)]
pub struct AssembledOutput {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Stateless between runs: nothing survives serialisation.
#[derive(Debug, Clone, Default)]
pub struct AssemblyEngine {
    config: AppConfig,
    writer: PdfWriter,
}

impl AssemblyEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            writer: PdfWriter::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check that `operation` can run on `count` inputs.
    pub fn validate_input_count(operation: Operation, count: usize) -> Result<()> {
        if count == 0 {
            return Err(PagewrightError::InvalidInput(format!(
                "{} needs at least one file",
                operation.display_name()
            )));
        }
        if count > 1 && !operation.accepts_multiple() {
            return Err(PagewrightError::InvalidInput(format!(
                "{} takes a single file, got {}",
                operation.display_name(),
                count
            )));
        }
        Ok(())
    }

    /// Assemble `sources` for `operation` and return the serialised document.
    #[instrument(skip(self, sources), fields(sources = sources.len()))]
    pub fn assemble(
        &self,
        operation: Operation,
        sources: Vec<AdaptedSource>,
    ) -> Result<AssembledOutput> {
        Self::validate_input_count(operation, sources.len())?;

        let bytes = match operation {
            Operation::View => {
                return Err(PagewrightError::InvalidInput(
                    "viewing a document does not assemble anything".into(),
                ));
            }
            Operation::Merge => self.merge(sources)?,
            Operation::Images => self.image_sequence(sources)?,
            Operation::Compress => self.compress(sources)?,
            Operation::Text | Operation::Word | Operation::Spreadsheet | Operation::QuickConvert => {
                self.convert_single(operation, sources)?
            }
            Operation::Presentation | Operation::Password => self.coming_soon(operation, &sources)?,
        };

        let output = verify(bytes)?;
        info!(
            ?operation,
            pages = output.page_count,
            bytes = output.bytes.len(),
            "document assembled"
        );
        Ok(output)
    }

    // -- Algorithms -----------------------------------------------------------

    fn convert_single(&self, operation: Operation, sources: Vec<AdaptedSource>) -> Result<Vec<u8>> {
        let Some(adapted) = sources.into_iter().next() else {
            return Err(PagewrightError::InvalidInput("no input to convert".into()));
        };
        let title = document_title(operation, &adapted.name);

        match adapted.source {
            PageSource::Text(text) => {
                let style = if adapted.kind == SourceKind::WordDocument {
                    &self.config.document_layout
                } else {
                    &self.config.text_layout
                };
                let lines = layout::text_lines(&text, style);
                self.serialize(layout::layout_lines(&lines, style, self.config.paper_size, &title))
            }
            PageSource::RowTable(rows) => {
                let style = &self.config.table_layout;
                let lines = layout::table_lines(&rows);
                self.serialize(layout::layout_lines(&lines, style, self.config.paper_size, &title))
            }
            PageSource::Image { bitmap, .. } => {
                self.serialize(layout::layout_images(vec![bitmap], self.config.paper_size, &title))
            }
            PageSource::ExistingDocument { document, .. } => {
                let mut builder = MergeBuilder::new();
                builder.append_document(&document)?;
                builder.finish()
            }
        }
    }

    /// A listed tool without an implementation still hands back a labelled
    /// one-page document.
    fn coming_soon(&self, operation: Operation, sources: &[AdaptedSource]) -> Result<Vec<u8>> {
        let first = sources.first().map_or("", |adapted| adapted.name.as_str());
        warn!(?operation, "tool not available, producing a notice page");
        let notice = format!("{} - Feature Coming Soon", operation.display_name());
        let style = &self.config.text_layout;
        let lines = layout::text_lines(&notice, style);
        let title = document_title(operation, first);
        self.serialize(layout::layout_lines(&lines, style, self.config.paper_size, &title))
    }

    fn image_sequence(&self, sources: Vec<AdaptedSource>) -> Result<Vec<u8>> {
        let title = document_title(Operation::Images, &sources[0].name);
        let mut bitmaps = Vec::with_capacity(sources.len());
        for adapted in sources {
            match adapted.source {
                PageSource::Image { bitmap, .. } => bitmaps.push(bitmap),
                other => {
                    return Err(PagewrightError::InvalidInput(format!(
                        "{} is a {} source, not an image",
                        adapted.name,
                        other.variant_name()
                    )));
                }
            }
        }
        self.serialize(layout::layout_images(bitmaps, self.config.paper_size, &title))
    }

    /// All-or-nothing: every source must already be a loaded document, and the
    /// output is only produced once every page of every source has been copied.
    fn merge(&self, sources: Vec<AdaptedSource>) -> Result<Vec<u8>> {
        let mut builder = MergeBuilder::new();
        for (index, adapted) in sources.into_iter().enumerate() {
            let PageSource::ExistingDocument { document, page_count } = adapted.source else {
                return Err(PagewrightError::CorruptInput(format!(
                    "{} is not a PDF document",
                    adapted.name
                )));
            };
            let copied = builder.append_document(&document)?;
            debug!(index, name = %adapted.name, page_count, copied, "merge source copied");
        }
        builder.finish()
    }

    fn compress(&self, sources: Vec<AdaptedSource>) -> Result<Vec<u8>> {
        let Some(adapted) = sources.into_iter().next() else {
            return Err(PagewrightError::InvalidInput("no input to compress".into()));
        };
        match adapted.source {
            PageSource::ExistingDocument { document, .. } => {
                PdfReader::from_document(document).compress()
            }
            other => Err(PagewrightError::InvalidInput(format!(
                "only PDFs can be compressed, got a {} source",
                other.variant_name()
            ))),
        }
    }

    fn serialize(&self, assembled: AssembledDocument) -> Result<Vec<u8>> {
        self.writer.serialize(assembled)
    }
}

/// Re-parse the serialised bytes and refuse empty documents.
fn verify(bytes: Vec<u8>) -> Result<AssembledOutput> {
    if bytes.is_empty() {
        return Err(PagewrightError::EmptyOutput);
    }
    let page_count = PdfReader::from_bytes(&bytes)
        .map_err(|err| PagewrightError::Pdf(format!("assembled output does not parse: {err}")))?
        .page_count();
    if page_count == 0 {
        return Err(PagewrightError::EmptyOutput);
    }
    Ok(AssembledOutput { bytes, page_count })
}

fn document_title(operation: Operation, first_input: &str) -> String {
    format!("{} - {}", operation.display_name(), first_input)
}
