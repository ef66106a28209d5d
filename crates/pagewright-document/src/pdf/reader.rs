// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — load and inspect existing PDF documents using the `lopdf`
// crate.

use lopdf::{Document, Object, ObjectId};
use pagewright_core::error::PagewrightError;
use tracing::{debug, info, instrument, warn};

use super::inherited_attribute;

/// US Letter, used when a page has no usable /MediaBox anywhere in its tree.
const FALLBACK_MEDIA_BOX: (f32, f32) = (612.0, 792.0);

/// Reads an existing PDF file.
///
/// Wraps `lopdf::Document` and exposes page-level inspection plus the
/// compress-and-resave operation.
#[derive(Debug)]
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Parse raw PDF bytes already in memory.
    ///
    /// Unparseable input is reported as `CorruptInput`.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PagewrightError> {
        let document = Document::load_mem(data).map_err(|err| {
            PagewrightError::CorruptInput(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId, PagewrightError> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            PagewrightError::Pdf(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    /// Page size in points (width, height) for a 1-indexed page, with
    /// inherited /MediaBox and /Rotate applied.
    pub fn page_size(&self, page_number: u32) -> Result<(f32, f32), PagewrightError> {
        let page_id = self.page_id(page_number)?;
        let page = self.document.get_dictionary(page_id).map_err(|err| {
            PagewrightError::Pdf(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        let (width, height) = inherited_attribute(&self.document, page, b"MediaBox")
            .and_then(|obj| self.resolve(obj).as_array().ok())
            .and_then(|rect| media_box_size(&self.document, rect))
            .unwrap_or_else(|| {
                warn!(page_number, "no usable /MediaBox, assuming Letter");
                FALLBACK_MEDIA_BOX
            });

        let rotation = inherited_attribute(&self.document, page, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360);

        if rotation == 90 || rotation == 270 {
            Ok((height, width))
        } else {
            Ok((width, height))
        }
    }

    /// Extract the text of a 1-indexed page. Pages whose fonts lack a usable
    /// encoding come back empty rather than failing.
    pub fn page_text(&self, page_number: u32) -> String {
        match self.document.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(err) => {
                warn!(page_number, %err, "text extraction failed");
                String::new()
            }
        }
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => self.document.get_object(*id).unwrap_or(object),
            other => other,
        }
    }

    // -- Re-save --------------------------------------------------------------

    /// Drop unreachable objects, compress every stream, and serialise.
    #[instrument(skip(self))]
    pub fn compress(&self) -> Result<Vec<u8>, PagewrightError> {
        let mut doc = self.document.clone();
        let pruned = doc.prune_objects();
        doc.compress();

        let mut output = Vec::new();
        doc.save_to(&mut output).map_err(|err| {
            PagewrightError::Pdf(format!("failed to serialise compressed PDF: {}", err))
        })?;

        info!(
            pruned_objects = pruned.len(),
            output_bytes = output.len(),
            "PDF compressed"
        );
        Ok(output)
    }
}

fn media_box_size(document: &Document, rect: &[Object]) -> Option<(f32, f32)> {
    if rect.len() != 4 {
        return None;
    }
    let mut coords = [0f32; 4];
    for (slot, value) in coords.iter_mut().zip(rect) {
        let value = match value {
            Object::Reference(id) => document.get_object(*id).ok()?,
            other => other,
        };
        *slot = value.as_float().ok()?;
    }
    let width = (coords[2] - coords[0]).abs();
    let height = (coords[3] - coords[1]).abs();
    (width > 0.0 && height > 0.0).then_some((width, height))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Stream, dictionary};

    /// Build a PDF whose pages each show one label and share a single font.
    pub(crate) fn fixture_pdf(labels: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for label in labels {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*label)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn counts_pages() {
        let reader = PdfReader::from_bytes(&fixture_pdf(&["one", "two", "three"])).unwrap();
        assert_eq!(reader.page_count(), 3);
    }

    #[test]
    fn garbage_is_corrupt_input() {
        let err = PdfReader::from_bytes(b"%PDF-1.4 this is not a pdf").err().unwrap();
        assert!(matches!(err, PagewrightError::CorruptInput(_)));
    }

    #[test]
    fn page_size_uses_inherited_media_box() {
        let reader = PdfReader::from_bytes(&fixture_pdf(&["a"])).unwrap();
        assert_eq!(reader.page_size(1).unwrap(), (595.0, 842.0));
        assert!(reader.page_size(2).is_err());
    }

    #[test]
    fn compress_keeps_every_page() {
        let reader = PdfReader::from_bytes(&fixture_pdf(&["a", "b"])).unwrap();
        let compressed = reader.compress().unwrap();
        assert_eq!(PdfReader::from_bytes(&compressed).unwrap().page_count(), 2);
    }
}
