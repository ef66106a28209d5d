// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pagewright document engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the user asked a conversion job to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Plain text to PDF.
    Text,
    /// Word-processor document to PDF (text only).
    Word,
    /// First sheet of a workbook to PDF, one row per line.
    Spreadsheet,
    /// One page per image, in selection order.
    Images,
    /// Concatenate existing PDFs.
    Merge,
    /// Detect the format and convert whatever it is.
    QuickConvert,
    /// Re-save an existing PDF with pruned objects and compressed streams.
    Compress,
    /// Open the input directly in the viewer; nothing is assembled.
    View,
    /// Presentation to PDF. No converter yet: yields a labelled notice page.
    Presentation,
    /// Password-protect a PDF. Not available yet: yields a labelled notice page.
    Password,
}

impl Operation {
    /// Display name used in progress and result messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Text => "Text to PDF",
            Self::Word => "Word to PDF",
            Self::Spreadsheet => "Excel to PDF",
            Self::Images => "Image to PDF",
            Self::Merge => "Merge PDF",
            Self::QuickConvert => "Quick Convert",
            Self::Compress => "Compress",
            Self::View => "View PDF",
            Self::Presentation => "PPT to PDF",
            Self::Password => "Password",
        }
    }

    /// Whether the operation accepts more than one input file.
    pub fn accepts_multiple(&self) -> bool {
        matches!(self, Self::Images | Self::Merge)
    }

    /// Whether the operation runs the assembly engine at all.
    pub fn assembles(&self) -> bool {
        !matches!(self, Self::View)
    }

    /// Parse the short keyword used on the command line and in config.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "word" | "docx" => Some(Self::Word),
            "excel" | "spreadsheet" | "xlsx" => Some(Self::Spreadsheet),
            "image" | "images" => Some(Self::Images),
            "merge" => Some(Self::Merge),
            "quick" | "convert" => Some(Self::QuickConvert),
            "compress" => Some(Self::Compress),
            "view" => Some(Self::View),
            "ppt" | "pptx" | "presentation" => Some(Self::Presentation),
            "secure" | "password" => Some(Self::Password),
            _ => None,
        }
    }
}

/// Lifecycle phases of a conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    /// No job, or the previous one was reset.
    Idle,
    /// Source adapters are reading the inputs.
    Reading,
    /// The assembly engine is laying out and serialising.
    Finalizing,
    /// A result is available and awaits acknowledgment.
    Done,
    /// The job failed and awaits acknowledgment.
    Error,
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Reading | Self::Finalizing)
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Portrait dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in millimetres with the given orientation applied.
    pub fn oriented_mm(&self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        let (short, long) = (w.min(h) as f32, w.max(h) as f32);
        match orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }
}
