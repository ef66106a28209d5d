// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{Orientation, PaperSize};

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Paper size for every assembled page.
    pub paper_size: PaperSize,
    /// Layout used for plain-text sources.
    pub text_layout: LayoutStyle,
    /// Layout used for text extracted from word-processor documents.
    pub document_layout: LayoutStyle,
    /// Layout used for spreadsheet rows.
    pub table_layout: LayoutStyle,
    /// Viewer limits and defaults.
    pub viewer: ViewerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            text_layout: LayoutStyle::text(),
            document_layout: LayoutStyle::document(),
            table_layout: LayoutStyle::table(),
            viewer: ViewerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Replace settings that would break the viewer; see
    /// [`ViewerConfig::normalized`].
    pub fn normalized(mut self) -> Self {
        self.viewer = self.viewer.normalized();
        self
    }
}

/// Line-flow layout parameters, all distances in millimetres from the top-left
/// corner of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutStyle {
    pub orientation: Orientation,
    /// Font size in points.
    pub font_size_pt: f32,
    pub left_margin_mm: f32,
    /// Cursor position of the first line on every page.
    pub top_margin_mm: f32,
    /// Vertical advance per line.
    pub line_pitch_mm: f32,
    /// Printable limit: once the cursor passes it, the next line opens a new page.
    pub bottom_limit_mm: f32,
    /// Width lines are wrapped to. `None` keeps each input line intact.
    pub wrap_width_mm: Option<f32>,
}

impl LayoutStyle {
    /// Plain text: 12 pt, wrapped to 180 mm.
    pub fn text() -> Self {
        Self {
            orientation: Orientation::Portrait,
            font_size_pt: 12.0,
            left_margin_mm: 15.0,
            top_margin_mm: 20.0,
            line_pitch_mm: 7.0,
            bottom_limit_mm: 280.0,
            wrap_width_mm: Some(180.0),
        }
    }

    /// Word-processor text: 11 pt, wrapped to 170 mm.
    pub fn document() -> Self {
        Self {
            orientation: Orientation::Portrait,
            font_size_pt: 11.0,
            left_margin_mm: 20.0,
            top_margin_mm: 20.0,
            line_pitch_mm: 7.0,
            bottom_limit_mm: 280.0,
            wrap_width_mm: Some(170.0),
        }
    }

    /// Spreadsheet rows: landscape, 10 pt, one unwrapped line per row.
    pub fn table() -> Self {
        Self {
            orientation: Orientation::Landscape,
            font_size_pt: 10.0,
            left_margin_mm: 15.0,
            top_margin_mm: 20.0,
            line_pitch_mm: 8.0,
            bottom_limit_mm: 190.0,
            wrap_width_mm: None,
        }
    }
}

/// Viewer zoom limits and annotation defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Increment used by zoom in / zoom out.
    pub zoom_step: f32,
    pub default_scale: f32,
    /// Fixed scale of grid-mode previews, independent of the user scale.
    pub grid_preview_scale: f32,
    /// Page width (px at scale 1.0) that presentation mode fits to the viewport.
    pub presentation_reference_width: f32,
    /// Text given to a freshly placed note.
    pub default_note_text: String,
    /// RGB ink colour for new strokes.
    pub ink_color: [u8; 3],
    /// Stroke width in px at scale 1.0.
    pub ink_width: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 3.0,
            zoom_step: 0.1,
            default_scale: 1.0,
            grid_preview_scale: 0.3,
            presentation_reference_width: 595.0,
            default_note_text: "New note".to_string(),
            ink_color: [239, 68, 68],
            ink_width: 2.0,
        }
    }
}

/// Smallest zoom step that survives rounding the scale to whole percent.
pub const MIN_ZOOM_STEP: f32 = 0.01;

impl ViewerConfig {
    /// Make the limits usable: non-finite or non-positive values fall back to
    /// their defaults, inverted scale bounds are swapped, and the zoom step is
    /// raised to [`MIN_ZOOM_STEP`].
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();

        let positive_or = |value: f32, fallback: f32, field: &str| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                warn!(field, value, fallback, "invalid viewer setting, using default");
                fallback
            }
        };
        self.min_scale = positive_or(self.min_scale, defaults.min_scale, "min_scale");
        self.max_scale = positive_or(self.max_scale, defaults.max_scale, "max_scale");
        if self.min_scale > self.max_scale {
            warn!(
                min_scale = self.min_scale,
                max_scale = self.max_scale,
                "scale bounds inverted, swapping"
            );
            std::mem::swap(&mut self.min_scale, &mut self.max_scale);
        }

        self.default_scale = positive_or(self.default_scale, defaults.default_scale, "default_scale");
        self.grid_preview_scale = positive_or(
            self.grid_preview_scale,
            defaults.grid_preview_scale,
            "grid_preview_scale",
        );
        self.presentation_reference_width = positive_or(
            self.presentation_reference_width,
            defaults.presentation_reference_width,
            "presentation_reference_width",
        );
        self.ink_width = positive_or(self.ink_width, defaults.ink_width, "ink_width");

        let step = positive_or(self.zoom_step, defaults.zoom_step, "zoom_step");
        if step < MIN_ZOOM_STEP {
            warn!(zoom_step = step, "zoom step too small, raising to 0.01");
        }
        self.zoom_step = step.max(MIN_ZOOM_STEP);
        self
    }
}
