// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Viewer session — one open document and all interaction state around it.
//
//   Closed -> Loading -> Ready
//                   \
//                    +-> Error
//
// Opening another document replaces the current one but keeps the session's
// annotations; closing releases the document and drops everything. A blob
// the session created itself (an upload) is revoked when the document is
// replaced, closed, or the session is dropped. A conversion result's blob
// belongs to the pipeline and is left alone.

use pagewright_core::blob::{BlobHandle, BlobStore};
use pagewright_core::config::ViewerConfig;
use pagewright_core::error::{PagewrightError, Result};
use pagewright_document::ConversionResult;
use tracing::{debug, info, instrument, warn};

use crate::annotation::{Annotation, AnnotationId, AnnotationLayer, SurfaceSize};
use crate::render::{PageRenderer, PageSurface, RenderSource};
use crate::search::{HighlightSpan, SearchState};
use crate::stroke::StrokeBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Single,
    Grid,
}

/// Where the open document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOrigin {
    /// A finished conversion; the pipeline owns the blob.
    ConversionResult(BlobHandle),
    /// Bytes handed straight to the viewer; the session owns the blob.
    Upload(BlobHandle),
    Remote(String),
}

impl DocumentOrigin {
    fn owned_blob(&self) -> Option<BlobHandle> {
        match self {
            Self::Upload(handle) => Some(*handle),
            Self::ConversionResult(_) | Self::Remote(_) => None,
        }
    }
}

/// A page the session wants drawn, and at what scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page: u32,
    pub scale: f32,
}

pub struct ViewerSession<R: PageRenderer> {
    renderer: R,
    blobs: BlobStore,
    config: ViewerConfig,

    state: SessionState,
    origin: Option<DocumentOrigin>,
    handle: Option<R::Handle>,
    error: Option<String>,

    page_count: u32,
    current_page: u32,
    /// User-set zoom. Presentation mode overrides it without changing it.
    scale: f32,
    viewport_width: f32,
    view_mode: ViewMode,
    presentation: bool,
    fullscreen: bool,
    dark_invert: bool,

    annotations: AnnotationLayer,
    search: SearchState,
    stroke: Option<StrokeBuilder>,
}

impl<R: PageRenderer> ViewerSession<R> {
    /// Create a closed session. `config` is normalized first, so inverted or
    /// non-finite limits cannot reach the zoom arithmetic.
    pub fn new(renderer: R, blobs: BlobStore, config: ViewerConfig) -> Self {
        let config = config.normalized();
        let annotations = AnnotationLayer::new(config.default_note_text.clone());
        let scale = config.default_scale.clamp(config.min_scale, config.max_scale);
        Self {
            renderer,
            blobs,
            config,
            state: SessionState::Closed,
            origin: None,
            handle: None,
            error: None,
            page_count: 0,
            current_page: 0,
            scale,
            viewport_width: 0.0,
            view_mode: ViewMode::Single,
            presentation: false,
            fullscreen: false,
            dark_invert: false,
            annotations,
            search: SearchState::default(),
            stroke: None,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn origin(&self) -> Option<&DocumentOrigin> {
        self.origin.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// The user-set zoom.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn is_presentation(&self) -> bool {
        self.presentation
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_dark_invert(&self) -> bool {
        self.dark_invert
    }

    /// "3 / 10" style position indicator.
    pub fn page_label(&self) -> String {
        format!("{} / {}", self.current_page, self.page_count)
    }

    // -- Open / close ---------------------------------------------------------

    /// View the output of a finished conversion job.
    pub async fn open_result(&mut self, result: &ConversionResult) -> Result<u32> {
        self.open(DocumentOrigin::ConversionResult(result.handle)).await
    }

    /// View bytes supplied directly. The session owns the blob it creates.
    pub async fn open_upload(&mut self, bytes: Vec<u8>) -> Result<u32> {
        let handle = self.blobs.create(bytes);
        self.open(DocumentOrigin::Upload(handle)).await
    }

    pub async fn open_remote(&mut self, url: impl Into<String>) -> Result<u32> {
        self.open(DocumentOrigin::Remote(url.into())).await
    }

    /// Open a document, replacing any open one. Resolves to the page count.
    #[instrument(skip(self))]
    pub async fn open(&mut self, origin: DocumentOrigin) -> Result<u32> {
        self.release_document();
        self.state = SessionState::Loading;
        self.error = None;
        self.origin = Some(origin.clone());
        info!("opening document");

        let opened = match self.render_source(&origin) {
            Ok(source) => self.renderer.open(&source).await,
            Err(err) => Err(err),
        }
        .and_then(|(handle, page_count)| {
            if page_count == 0 {
                Err(PagewrightError::RenderError("document has no pages".into()))
            } else {
                Ok((handle, page_count))
            }
        });

        match opened {
            Ok((handle, page_count)) => {
                self.handle = Some(handle);
                self.page_count = page_count;
                self.current_page = 1;
                self.state = SessionState::Ready;
                let hidden = self.annotations.unreachable(page_count);
                if hidden > 0 {
                    warn!(hidden, page_count, "annotations point past the last page");
                }
                info!(page_count, "document ready");
                Ok(page_count)
            }
            Err(err) => {
                let err = if matches!(err, PagewrightError::RenderError(_)) {
                    err
                } else {
                    PagewrightError::RenderError(err.to_string())
                };
                warn!(%err, "document failed to open");
                self.state = SessionState::Error;
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Close the viewer: release the document and drop every annotation.
    #[instrument(skip(self))]
    pub fn close(&mut self) {
        self.release_document();
        self.origin = None;
        self.error = None;
        self.state = SessionState::Closed;
        self.annotations.clear();
        self.search = SearchState::default();
        self.view_mode = ViewMode::Single;
        self.presentation = false;
        self.fullscreen = false;
        self.scale = self
            .config
            .default_scale
            .clamp(self.config.min_scale, self.config.max_scale);
        info!("viewer closed");
    }

    fn render_source(&self, origin: &DocumentOrigin) -> Result<RenderSource> {
        match origin {
            DocumentOrigin::ConversionResult(handle) | DocumentOrigin::Upload(handle) => self
                .blobs
                .get(handle)
                .map(RenderSource::Bytes)
                .ok_or_else(|| PagewrightError::RenderError(format!("{handle} was released"))),
            DocumentOrigin::Remote(url) => Ok(RenderSource::Url(url.clone())),
        }
    }

    fn release_document(&mut self) {
        self.handle = None;
        self.stroke = None;
        self.page_count = 0;
        self.current_page = 0;
        if let Some(handle) = self.origin.take().and_then(|origin| origin.owned_blob()) {
            self.blobs.revoke(&handle);
        }
    }

    // -- Navigation -----------------------------------------------------------

    /// Go to a page, clamped to the document. Ignored until a document is ready.
    pub fn set_page(&mut self, page: u32) -> u32 {
        if self.is_ready() {
            self.current_page = page.clamp(1, self.page_count);
        }
        self.current_page
    }

    pub fn next_page(&mut self) -> u32 {
        self.set_page(self.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> u32 {
        self.set_page(self.current_page.saturating_sub(1))
    }

    // -- Zoom -----------------------------------------------------------------

    /// Set the user zoom, clamped to the configured range.
    pub fn set_scale(&mut self, scale: f32) -> f32 {
        if scale.is_finite() {
            let clamped = scale.clamp(self.config.min_scale, self.config.max_scale);
            // Keep repeated ±step arithmetic on whole percentages.
            self.scale = (clamped * 100.0).round() / 100.0;
        }
        self.scale
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_scale(self.scale + self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_scale(self.scale - self.config.zoom_step)
    }

    /// Width of the container the page is shown in, in px.
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width.max(0.0);
    }

    /// The scale pages are actually drawn at in single-page view.
    pub fn effective_scale(&self) -> f32 {
        if self.presentation && self.viewport_width > 0.0 {
            (self.viewport_width / self.config.presentation_reference_width)
                .clamp(self.config.min_scale, self.config.max_scale)
        } else {
            self.scale
        }
    }

    // -- View mode and flags --------------------------------------------------

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Pick a page from the grid previews and return to single-page view.
    pub fn select_preview(&mut self, page: u32) -> u32 {
        self.view_mode = ViewMode::Single;
        self.set_page(page)
    }

    pub fn toggle_presentation(&mut self) -> bool {
        self.presentation = !self.presentation;
        debug!(presentation = self.presentation, "presentation toggled");
        self.presentation
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }

    pub fn toggle_dark_invert(&mut self) -> bool {
        self.dark_invert = !self.dark_invert;
        self.dark_invert
    }

    // -- Rendering ------------------------------------------------------------

    /// Pages the current view shows. Grid view asks for every page at the
    /// preview scale; single view asks for the current page.
    pub fn render_requests(&self) -> Vec<RenderRequest> {
        if !self.is_ready() {
            return Vec::new();
        }
        match self.view_mode {
            ViewMode::Grid => (1..=self.page_count)
                .map(|page| RenderRequest {
                    page,
                    scale: self.config.grid_preview_scale,
                })
                .collect(),
            ViewMode::Single => vec![RenderRequest {
                page: self.current_page,
                scale: self.effective_scale(),
            }],
        }
    }

    /// Render everything [`render_requests`](Self::render_requests) lists.
    pub async fn render_visible(&self) -> Result<Vec<PageSurface>> {
        let Some(handle) = self.handle.as_ref() else {
            return Ok(Vec::new());
        };
        let mut surfaces = Vec::new();
        for request in self.render_requests() {
            surfaces.push(
                self.renderer
                    .render_page(handle, request.page, request.scale)
                    .await?,
            );
        }
        Ok(surfaces)
    }

    // -- Notes ----------------------------------------------------------------

    pub fn annotations(&self) -> &AnnotationLayer {
        &self.annotations
    }

    /// Annotations to draw over the current page.
    pub fn visible_annotations(&self) -> Vec<&Annotation> {
        self.annotations.on_page(self.current_page).collect()
    }

    pub fn set_note_mode(&mut self, enabled: bool) {
        self.annotations.set_note_mode(enabled);
    }

    /// Place a note on the current page at normalized `(x, y)`.
    pub fn add_note(&mut self, x: f32, y: f32) -> Option<AnnotationId> {
        if !self.is_ready() {
            return None;
        }
        self.annotations.add_note(self.current_page, x, y)
    }

    pub fn update_note(&mut self, id: AnnotationId, text: impl Into<String>) -> bool {
        self.annotations.update_note(id, text)
    }

    pub fn delete_note(&mut self, id: AnnotationId) -> bool {
        self.annotations.delete_note(id)
    }

    pub fn toggle_note_open(&mut self, id: AnnotationId) -> bool {
        self.annotations.toggle_note_open(id)
    }

    // -- Ink ------------------------------------------------------------------

    /// Pointer down on the current page's surface.
    pub fn begin_stroke(&mut self, raw_x: f32, raw_y: f32, surface: SurfaceSize) {
        if !self.is_ready() {
            return;
        }
        // A pointer-up that never arrived: keep what was drawn so far.
        if let Some(unfinished) = self.stroke.take() {
            debug!(
                page = unfinished.page(),
                points = unfinished.point_count(),
                "closing unfinished stroke"
            );
            if let Some(stroke) = unfinished.finish() {
                self.annotations.add_stroke(stroke);
            }
        }
        let mut builder =
            StrokeBuilder::begin(self.current_page, self.config.ink_color, self.config.ink_width);
        builder.extend(raw_x, raw_y, surface);
        self.stroke = Some(builder);
    }

    /// Pointer move. Ignored when no gesture is in progress.
    pub fn extend_stroke(&mut self, raw_x: f32, raw_y: f32, surface: SurfaceSize) {
        if let Some(builder) = self.stroke.as_mut() {
            builder.extend(raw_x, raw_y, surface);
        }
    }

    /// Pointer up: store the gesture as one stroke.
    pub fn end_stroke(&mut self) -> Option<AnnotationId> {
        let stroke = self.stroke.take()?.finish()?;
        Some(self.annotations.add_stroke(stroke))
    }

    // -- Search ---------------------------------------------------------------

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search.query = query.into();
    }

    pub fn search_query(&self) -> &str {
        &self.search.query
    }

    pub fn highlight_page<'a>(&self, page_text: &'a str) -> Vec<HighlightSpan<'a>> {
        self.search.highlight(page_text)
    }
}

impl<R: PageRenderer> Drop for ViewerSession<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.origin.as_ref().and_then(DocumentOrigin::owned_blob) {
            self.blobs.revoke(&handle);
        }
    }
}
