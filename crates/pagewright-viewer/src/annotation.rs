// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotation layer data model.
//
// Every coordinate is a percentage of the page surface (0..=100 on both axes,
// origin top-left). Zooming or resizing the surface changes where a point is
// drawn, never what is stored.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Stable identifier of a note or stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationId(pub Uuid);

impl AnnotationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnnotationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rendered size of a page surface in px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// A point in page-fraction space, each axis clamped to `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Convert a pointer position on a surface of the given size.
    ///
    /// A zero-sized surface maps everything to the origin.
    pub fn from_surface(raw_x: f32, raw_y: f32, surface: SurfaceSize) -> Self {
        if surface.is_degenerate() {
            return Self::new(0.0, 0.0);
        }
        Self::new(
            raw_x / surface.width * 100.0,
            raw_y / surface.height * 100.0,
        )
    }

    /// Where this point falls on a surface of the given size.
    pub fn to_surface(&self, surface: SurfaceSize) -> (f32, f32) {
        (
            self.x / 100.0 * surface.width,
            self.y / 100.0 * surface.height,
        )
    }
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}

/// A sticky note pinned to a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: AnnotationId,
    /// 1-indexed page the note was placed on.
    pub page: u32,
    pub position: NormalizedPoint,
    pub text: String,
    pub is_open: bool,
}

/// One continuous freehand gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkStroke {
    pub id: AnnotationId,
    pub page: u32,
    pub points: Vec<NormalizedPoint>,
    /// RGB.
    pub color: [u8; 3],
    /// Width in px at scale 1.0.
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    Note(Note),
    Ink(InkStroke),
}

impl Annotation {
    pub fn id(&self) -> AnnotationId {
        match self {
            Self::Note(note) => note.id,
            Self::Ink(stroke) => stroke.id,
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            Self::Note(note) => note.page,
            Self::Ink(stroke) => stroke.page,
        }
    }
}

/// Notes and ink strokes of one viewer session, in creation order.
#[derive(Debug, Clone)]
pub struct AnnotationLayer {
    annotations: Vec<Annotation>,
    note_mode: bool,
    default_note_text: String,
}

impl AnnotationLayer {
    pub fn new(default_note_text: impl Into<String>) -> Self {
        Self {
            annotations: Vec::new(),
            note_mode: false,
            default_note_text: default_note_text.into(),
        }
    }

    // -- Note placement mode --------------------------------------------------

    pub fn note_mode(&self) -> bool {
        self.note_mode
    }

    pub fn set_note_mode(&mut self, enabled: bool) {
        self.note_mode = enabled;
    }

    // -- Notes ----------------------------------------------------------------

    /// Place a note at a normalized position, open for editing.
    ///
    /// Does nothing and returns `None` unless note placement mode is on.
    pub fn add_note(&mut self, page: u32, x: f32, y: f32) -> Option<AnnotationId> {
        if !self.note_mode {
            debug!(page, "note placement ignored outside note mode");
            return None;
        }
        let note = Note {
            id: AnnotationId::new(),
            page,
            position: NormalizedPoint::new(x, y),
            text: self.default_note_text.clone(),
            is_open: true,
        };
        let id = note.id;
        debug!(%id, page, x = note.position.x, y = note.position.y, "note added");
        self.annotations.push(Annotation::Note(note));
        Some(id)
    }

    /// Replace a note's text. Returns whether a note with `id` exists.
    pub fn update_note(&mut self, id: AnnotationId, text: impl Into<String>) -> bool {
        match self.note_mut(id) {
            Some(note) => {
                note.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn toggle_note_open(&mut self, id: AnnotationId) -> bool {
        match self.note_mut(id) {
            Some(note) => {
                note.is_open = !note.is_open;
                true
            }
            None => false,
        }
    }

    pub fn delete_note(&mut self, id: AnnotationId) -> bool {
        let before = self.annotations.len();
        self.annotations
            .retain(|annotation| !matches!(annotation, Annotation::Note(note) if note.id == id));
        before != self.annotations.len()
    }

    pub fn note(&self, id: AnnotationId) -> Option<&Note> {
        self.annotations.iter().find_map(|annotation| match annotation {
            Annotation::Note(note) if note.id == id => Some(note),
            _ => None,
        })
    }

    fn note_mut(&mut self, id: AnnotationId) -> Option<&mut Note> {
        self.annotations.iter_mut().find_map(|annotation| match annotation {
            Annotation::Note(note) if note.id == id => Some(note),
            _ => None,
        })
    }

    // -- Ink ------------------------------------------------------------------

    pub fn add_stroke(&mut self, stroke: InkStroke) -> AnnotationId {
        let id = stroke.id;
        debug!(%id, page = stroke.page, points = stroke.points.len(), "stroke added");
        self.annotations.push(Annotation::Ink(stroke));
        id
    }

    // -- Queries --------------------------------------------------------------

    pub fn all(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn on_page(&self, page: u32) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |annotation| annotation.page() == page)
    }

    /// Annotations on pages a document of `page_count` pages does not have.
    /// They are kept, just never drawn.
    pub fn unreachable(&self, page_count: u32) -> usize {
        self.annotations
            .iter()
            .filter(|annotation| annotation.page() == 0 || annotation.page() > page_count)
            .count()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
        self.note_mode = false;
    }
}
