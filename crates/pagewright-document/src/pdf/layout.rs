// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page layout — turns text lines, table rows, and bitmaps into an in-memory
// paginated document. Everything here is pure; serialisation lives in
// `writer`.
//
// Vertical positions are millimetres measured down from the top edge of the
// page, which is how the layout cursor moves.

use image::RgbImage;
use pagewright_core::config::LayoutStyle;
use pagewright_core::types::{Orientation, PaperSize};
use tracing::debug;

/// Separator placed between spreadsheet cells on a flattened row.
pub const CELL_SEPARATOR: &str = " | ";

/// Millimetres per typographic point.
const MM_PER_PT: f32 = 0.3528;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH_EM: f32 = 0.50;

/// One line of text with its baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub y_mm: f32,
}

/// Where an image sits on its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub x_mm: f32,
    /// Distance from the top edge to the image's top edge.
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

#[derive(Debug, Clone)]
pub enum PageContent {
    Lines {
        font_size_pt: f32,
        left_margin_mm: f32,
        lines: Vec<PlacedLine>,
    },
    Image {
        bitmap: RgbImage,
        placement: ImagePlacement,
    },
}

/// A page: its size plus what is drawn on it.
#[derive(Debug, Clone)]
pub struct AssembledPage {
    pub width_mm: f32,
    pub height_mm: f32,
    pub content: PageContent,
}

/// Paginated content prior to serialisation.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub title: String,
    pub pages: Vec<AssembledPage>,
}

impl AssembledDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

// -- Text -----------------------------------------------------------------------

/// Split text into the lines a style will draw, wrapping when the style has a
/// wrap width.
pub fn text_lines(text: &str, style: &LayoutStyle) -> Vec<String> {
    match style.wrap_width_mm {
        Some(width_mm) => {
            let glyph_mm = AVG_GLYPH_WIDTH_EM * style.font_size_pt * MM_PER_PT;
            let max_chars = ((width_mm / glyph_mm) as usize).max(1);
            wrap_text(text, max_chars)
        }
        None => text.lines().map(|line| line.replace('\t', "    ")).collect(),
    }
}

/// Flatten table rows to one delimited line per row.
pub fn table_lines(rows: &[Vec<String>]) -> Vec<String> {
    rows.iter().map(|row| row.join(CELL_SEPARATOR)).collect()
}

/// Lay lines out top to bottom at a fixed pitch, opening a new page whenever
/// the cursor has moved past the printable limit.
///
/// Always yields at least one page, so an empty text becomes one blank page.
pub fn layout_lines(
    lines: &[String],
    style: &LayoutStyle,
    paper: PaperSize,
    title: &str,
) -> AssembledDocument {
    let (width_mm, height_mm) = paper.oriented_mm(style.orientation);
    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    let mut cursor_mm = style.top_margin_mm;

    for line in lines {
        if cursor_mm > style.bottom_limit_mm {
            pages.push(Vec::new());
            cursor_mm = style.top_margin_mm;
        }
        if let Some(page) = pages.last_mut() {
            page.push(PlacedLine {
                text: line.clone(),
                y_mm: cursor_mm,
            });
        }
        cursor_mm += style.line_pitch_mm;
    }

    debug!(lines = lines.len(), pages = pages.len(), "Text layout complete");

    AssembledDocument {
        title: title.to_string(),
        pages: pages
            .into_iter()
            .map(|lines| AssembledPage {
                width_mm,
                height_mm,
                content: PageContent::Lines {
                    font_size_pt: style.font_size_pt,
                    left_margin_mm: style.left_margin_mm,
                    lines,
                },
            })
            .collect(),
    }
}

/// How many pages `layout_lines` would produce for `line_count` lines.
pub fn pages_needed(line_count: usize, style: &LayoutStyle) -> usize {
    let mut pages = 1;
    let mut cursor_mm = style.top_margin_mm;
    for _ in 0..line_count {
        if cursor_mm > style.bottom_limit_mm {
            pages += 1;
            cursor_mm = style.top_margin_mm;
        }
        cursor_mm += style.line_pitch_mm;
    }
    pages
}

// -- Images ---------------------------------------------------------------------

/// Size an image to the full page width with its aspect ratio preserved,
/// shrinking it further if that would run past the bottom of the page.
///
/// The image is anchored to the top of the page and centred horizontally
/// when the height limit makes it narrower than the page.
pub fn fit_image(
    pixel_width: u32,
    pixel_height: u32,
    page_width_mm: f32,
    page_height_mm: f32,
) -> ImagePlacement {
    let aspect = pixel_height.max(1) as f32 / pixel_width.max(1) as f32;
    let mut width_mm = page_width_mm;
    let mut height_mm = page_width_mm * aspect;

    if height_mm > page_height_mm {
        height_mm = page_height_mm;
        width_mm = page_height_mm / aspect;
    }

    ImagePlacement {
        x_mm: (page_width_mm - width_mm) / 2.0,
        y_mm: 0.0,
        width_mm,
        height_mm,
    }
}

/// One portrait page per image, in the order given.
pub fn layout_images(images: Vec<RgbImage>, paper: PaperSize, title: &str) -> AssembledDocument {
    let (width_mm, height_mm) = paper.oriented_mm(Orientation::Portrait);
    let pages = images
        .into_iter()
        .map(|bitmap| {
            let placement = fit_image(bitmap.width(), bitmap.height(), width_mm, height_mm);
            debug!(
                pixel_width = bitmap.width(),
                pixel_height = bitmap.height(),
                ?placement,
                "Image placed"
            );
            AssembledPage {
                width_mm,
                height_mm,
                content: PageContent::Image { bitmap, placement },
            }
        })
        .collect();

    AssembledDocument {
        title: title.to_string(),
        pages,
    }
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then performs simple word-wrap within each
/// paragraph. Words longer than `max_width` are force-broken.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut result = Vec::new();

    for paragraph in text.lines() {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_len = 0usize;

        for word in words {
            let word_len = word.chars().count();
            if word_len > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_width).peekable();
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        result.push(chunk.iter().collect());
                    } else {
                        current_line = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
                current_len += 1 + word_len;
            } else {
                result.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
                current_len = word_len;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}
