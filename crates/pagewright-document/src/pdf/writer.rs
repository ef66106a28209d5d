// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise an assembled document using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use pagewright_core::error::PagewrightError;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use super::layout::{AssembledDocument, ImagePlacement, PageContent, PlacedLine};

const IMAGE_DPI: f32 = 72.0;

/// Serialises [`AssembledDocument`]s into PDF bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfWriter;

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Turn every assembled page into PDF operations and save the result.
    #[instrument(skip_all, fields(pages = assembled.pages.len()))]
    pub fn serialize(&self, assembled: AssembledDocument) -> Result<Vec<u8>, PagewrightError> {
        let mut doc = PdfDocument::new(&assembled.title);
        let mut pages: Vec<PdfPage> = Vec::with_capacity(assembled.pages.len());

        for page in assembled.pages {
            let page_h_pt = Mm(page.height_mm).into_pt().0;
            let ops = match page.content {
                PageContent::Lines {
                    font_size_pt,
                    left_margin_mm,
                    lines,
                } => text_ops(&lines, font_size_pt, left_margin_mm, page_h_pt),
                PageContent::Image { bitmap, placement } => {
                    let (width, height) = bitmap.dimensions();
                    let raw = RawImage {
                        pixels: RawImageData::U8(bitmap.into_raw()),
                        width: width as usize,
                        height: height as usize,
                        data_format: RawImageFormat::RGB8,
                        tag: Vec::new(),
                    };
                    let xobject_id = doc.add_image(&raw);
                    vec![Op::UseXobject {
                        id: xobject_id,
                        transform: image_transform(width, height, &placement, page_h_pt),
                    }]
                }
            };
            pages.push(PdfPage::new(Mm(page.width_mm), Mm(page.height_mm), ops));
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings while saving");
        }

        info!(
            title = %assembled.title,
            output_bytes = output.len(),
            "PDF serialised"
        );
        Ok(output)
    }
}

fn text_ops(lines: &[PlacedLine], font_size_pt: f32, left_margin_mm: f32, page_h_pt: f32) -> Vec<Op> {
    let x_pt = Mm(left_margin_mm).into_pt().0;
    let mut ops: Vec<Op> = Vec::with_capacity(lines.len() * 5);

    for line in lines {
        if line.text.is_empty() {
            continue;
        }
        // PDF y grows upwards from the bottom edge.
        let y_pt = page_h_pt - Mm(line.y_mm).into_pt().0;

        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(x_pt),
                y: Pt(y_pt),
            },
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(font_size_pt),
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(line.text.clone())],
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::EndTextSection);
    }

    debug!(lines = lines.len(), "text page encoded");
    ops
}

/// Scale the bitmap from its native size (one pixel per point at 72 DPI) to
/// the placement box, anchored at the box's bottom-left corner.
fn image_transform(
    pixel_width: u32,
    pixel_height: u32,
    placement: &ImagePlacement,
    page_h_pt: f32,
) -> XObjectTransform {
    let width_pt = Mm(placement.width_mm).into_pt().0;
    let height_pt = Mm(placement.height_mm).into_pt().0;
    let x_pt = Mm(placement.x_mm).into_pt().0;
    let y_pt = page_h_pt - Mm(placement.y_mm).into_pt().0 - height_pt;

    XObjectTransform {
        translate_x: Some(Pt(x_pt)),
        translate_y: Some(Pt(y_pt)),
        scale_x: Some(width_pt / pixel_width.max(1) as f32),
        scale_y: Some(height_pt / pixel_height.max(1) as f32),
        dpi: Some(IMAGE_DPI),
        rotate: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout::{layout_images, layout_lines, text_lines};
    use crate::pdf::reader::PdfReader;
    use image::RgbImage;
    use pagewright_core::config::LayoutStyle;
    use pagewright_core::types::PaperSize;

    #[test]
    fn text_document_serialises_every_page() {
        let style = LayoutStyle::text();
        let text = "word ".repeat(5000);
        let lines = text_lines(&text, &style);
        let assembled = layout_lines(&lines, &style, PaperSize::A4, "Long");
        let expected = assembled.page_count();
        assert!(expected > 1);

        let bytes = PdfWriter::new().serialize(assembled).unwrap();
        assert_eq!(PdfReader::from_bytes(&bytes).unwrap().page_count(), expected);
    }

    #[test]
    fn image_page_has_page_size() {
        let assembled = layout_images(vec![RgbImage::new(20, 10)], PaperSize::A4, "Image");
        let bytes = PdfWriter::new().serialize(assembled).unwrap();
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 1);
        let (w, h) = reader.page_size(1).unwrap();
        assert!((w - 595.3).abs() < 1.0, "width {w}");
        assert!((h - 841.9).abs() < 1.0, "height {h}");
    }
}
