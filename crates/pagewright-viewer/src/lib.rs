// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagewright-viewer — Interactive viewing of finished documents.
//
// A `ViewerSession` owns one open document: its page, zoom, view mode, and
// presentation flags, plus the notes and ink strokes pinned to its pages in
// zoom-independent coordinates. Pixels come from a `PageRenderer`.

pub mod annotation;
pub mod render;
pub mod search;
pub mod session;
pub mod stroke;

pub use annotation::{
    Annotation, AnnotationId, AnnotationLayer, InkStroke, NormalizedPoint, Note, SurfaceSize,
};
pub use render::{LayoutRenderer, PageRenderer, PageSurface, RenderSource};
pub use search::{HighlightSpan, SearchState, highlight};
pub use session::{DocumentOrigin, RenderRequest, SessionState, ViewMode, ViewerSession};
pub use stroke::StrokeBuilder;
