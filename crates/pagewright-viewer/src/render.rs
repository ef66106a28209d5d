// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Renderer contract and the built-in layout renderer.
//
// The session only needs two things from a renderer: the page count once a
// document opens, and a surface for a page at a scale. Rasterisation belongs
// to whatever implements the trait; `LayoutRenderer` reports geometry and page
// text from the document structure and is what the headless binary and the
// tests use.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use pagewright_core::error::{PagewrightError, Result};
use pagewright_document::PdfReader;
use tracing::{debug, info, instrument};

use crate::annotation::SurfaceSize;

/// Where a document to open comes from.
#[derive(Debug, Clone)]
pub enum RenderSource {
    /// In-memory bytes, typically resolved from a blob handle.
    Bytes(Arc<[u8]>),
    /// A reference the renderer resolves itself.
    Url(String),
}

/// One rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSurface {
    /// 1-indexed page number.
    pub page: u32,
    pub scale: f32,
    /// Surface width in px.
    pub width: f32,
    /// Surface height in px.
    pub height: f32,
    /// Text laid out on the page, for search highlighting.
    pub text: String,
}

impl PageSurface {
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }
}

/// Opens documents and renders their pages.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Renderer-specific open document.
    type Handle: Send + Sync;

    /// Open a document and report its page count.
    async fn open(&self, source: &RenderSource) -> Result<(Self::Handle, u32)>;

    /// Render 1-indexed `page` at `scale`.
    async fn render_page(&self, handle: &Self::Handle, page: u32, scale: f32)
    -> Result<PageSurface>;
}

/// Structure-only renderer over the PDF reader.
///
/// Surface size is the page's /MediaBox in points times the scale, so at
/// scale 1.0 an A4 page is 595 px wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutRenderer;

impl LayoutRenderer {
    pub fn new() -> Self {
        Self
    }

    async fn load(&self, source: &RenderSource) -> Result<Arc<[u8]>> {
        match source {
            RenderSource::Bytes(bytes) => Ok(Arc::clone(bytes)),
            RenderSource::Url(url) => {
                let lower = url.to_ascii_lowercase();
                if lower.starts_with("http://") || lower.starts_with("https://") {
                    return Err(PagewrightError::RenderError(format!(
                        "remote documents are not fetched: {url}"
                    )));
                }
                let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
                let bytes = tokio::fs::read(&path).await.map_err(|err| {
                    PagewrightError::RenderError(format!("cannot read {}: {err}", path.display()))
                })?;
                Ok(Arc::from(bytes))
            }
        }
    }
}

#[async_trait]
impl PageRenderer for LayoutRenderer {
    type Handle = Arc<PdfReader>;

    #[instrument(skip_all)]
    async fn open(&self, source: &RenderSource) -> Result<(Self::Handle, u32)> {
        let bytes = self.load(source).await?;
        let reader = tokio::task::spawn_blocking(move || PdfReader::from_bytes(&bytes))
            .await
            .map_err(|err| PagewrightError::RenderError(format!("document load aborted: {err}")))?
            .map_err(|err| PagewrightError::RenderError(err.to_string()))?;

        let page_count = u32::try_from(reader.page_count())
            .map_err(|_| PagewrightError::RenderError("page count out of range".into()))?;
        if page_count == 0 {
            return Err(PagewrightError::RenderError("document has no pages".into()));
        }

        info!(page_count, "document opened for viewing");
        Ok((Arc::new(reader), page_count))
    }

    async fn render_page(
        &self,
        handle: &Self::Handle,
        page: u32,
        scale: f32,
    ) -> Result<PageSurface> {
        let reader = Arc::clone(handle);
        let (width_pt, height_pt, text) = tokio::task::spawn_blocking(move || {
            let (width, height) = reader.page_size(page)?;
            Ok::<_, PagewrightError>((width, height, reader.page_text(page)))
        })
        .await
        .map_err(|err| PagewrightError::RenderError(format!("page render aborted: {err}")))?
        .map_err(|err| PagewrightError::RenderError(err.to_string()))?;

        debug!(page, scale, width_pt, height_pt, "page rendered");
        Ok(PageSurface {
            page,
            scale,
            width: width_pt * scale,
            height: height_pt * scale,
            text,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pagewright_core::Operation;
    use pagewright_document::{AssemblyEngine, InputFile, SourceAdapter};

    /// A converted text document of `pages` full pages.
    pub(crate) fn document_bytes(pages: usize) -> Vec<u8> {
        let engine = AssemblyEngine::default();
        // 38 lines fill one page of the default text layout.
        let body: Vec<String> = (0..pages * 38).map(|n| format!("line {n}")).collect();
        let input = InputFile::new("doc.txt", Some("text/plain"), body.join("\n").into_bytes());
        let adapted = SourceAdapter::default().adapt(&input, Operation::Text).unwrap();
        engine.assemble(Operation::Text, vec![adapted]).unwrap().bytes
    }

    #[tokio::test]
    async fn opens_bytes_and_reports_page_count() {
        let renderer = LayoutRenderer::new();
        let source = RenderSource::Bytes(Arc::from(document_bytes(3)));
        let (_, pages) = renderer.open(&source).await.unwrap();
        assert_eq!(pages, 3);
    }

    #[tokio::test]
    async fn surface_scales_with_the_page() {
        let renderer = LayoutRenderer::new();
        let source = RenderSource::Bytes(Arc::from(document_bytes(1)));
        let (handle, _) = renderer.open(&source).await.unwrap();

        let one = renderer.render_page(&handle, 1, 1.0).await.unwrap();
        let two = renderer.render_page(&handle, 1, 2.0).await.unwrap();
        assert!((one.width - 595.3).abs() < 1.0);
        assert!((two.width - 2.0 * one.width).abs() < 0.01);
        assert!((two.height - 2.0 * one.height).abs() < 0.01);
    }

    #[tokio::test]
    async fn out_of_range_page_is_render_error() {
        let renderer = LayoutRenderer::new();
        let source = RenderSource::Bytes(Arc::from(document_bytes(1)));
        let (handle, _) = renderer.open(&source).await.unwrap();
        let err = renderer.render_page(&handle, 4, 1.0).await.unwrap_err();
        assert!(matches!(err, PagewrightError::RenderError(_)));
    }

    #[tokio::test]
    async fn unreadable_sources_are_render_errors() {
        let renderer = LayoutRenderer::new();
        for source in [
            RenderSource::Bytes(Arc::from(b"not a pdf".to_vec())),
            RenderSource::Url("https://example.com/doc.pdf".into()),
            RenderSource::Url("/definitely/not/here.pdf".into()),
        ] {
            let err = renderer.open(&source).await.unwrap_err();
            assert!(matches!(err, PagewrightError::RenderError(_)));
        }
    }

    #[tokio::test]
    async fn opens_local_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, document_bytes(2)).unwrap();

        let renderer = LayoutRenderer::new();
        let url = format!("file://{}", path.display());
        let (_, pages) = renderer.open(&RenderSource::Url(url)).await.unwrap();
        assert_eq!(pages, 2);
    }
}
