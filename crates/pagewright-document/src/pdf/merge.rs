// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page merging — structural copy of pages and everything they reference from
// loaded source documents into one new document.
//
// Copies are keyed by source object id, scoped to one source document: an
// object shared by several pages of the same source is copied once, while
// identical-looking objects from different sources stay distinct.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use pagewright_core::error::PagewrightError;
use tracing::{debug, info, instrument, warn};

use super::{INHERITABLE_KEYS, inherited_attribute};

/// Accumulates pages from source documents, in the order they are appended.
pub struct MergeBuilder {
    target: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    sources: usize,
}

impl Default for MergeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeBuilder {
    /// Start an empty document with a catalog and an empty page tree.
    pub fn new() -> Self {
        let mut target = Document::with_version("1.5");
        let pages_id = target.new_object_id();
        let catalog_id = target.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        target.trailer.set("Root", catalog_id);

        Self {
            target,
            pages_id,
            kids: Vec::new(),
            sources: 0,
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Copy every page of `source`, in page order, to the end of the output.
    ///
    /// Returns the number of pages copied.
    #[instrument(skip_all, fields(source_index = self.sources))]
    pub fn append_document(&mut self, source: &Document) -> Result<usize, PagewrightError> {
        let mut copier = ObjectCopier::new(source);
        let pages = source.get_pages();

        // `get_pages` is keyed by 1-indexed page number, so iteration follows
        // the source's reading order.
        for (page_number, page_id) in &pages {
            let copied = copier.copy_page(&mut self.target, *page_id, self.pages_id)?;
            debug!(page_number, ?page_id, ?copied, "page copied");
            self.kids.push(Object::Reference(copied));
        }

        self.sources += 1;
        debug!(
            pages = pages.len(),
            objects_copied = copier.remap.len(),
            "source document appended"
        );
        Ok(pages.len())
    }

    /// Write the page tree and serialise the merged document.
    #[instrument(skip(self), fields(pages = self.kids.len(), sources = self.sources))]
    pub fn finish(mut self) -> Result<Vec<u8>, PagewrightError> {
        let count = self.kids.len() as i64;
        self.target.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );

        let mut output = Vec::new();
        self.target.save_to(&mut output).map_err(|err| {
            PagewrightError::Pdf(format!("failed to serialise merged PDF: {}", err))
        })?;

        info!(pages = count, output_bytes = output.len(), "Merge complete");
        Ok(output)
    }
}

/// Copies objects from one source document, remembering what it has copied.
struct ObjectCopier<'a> {
    source: &'a Document,
    /// Source object id -> target object id.
    remap: BTreeMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            remap: BTreeMap::new(),
        }
    }

    /// Copy one page dictionary and its resources, attaching it to `parent`.
    fn copy_page(
        &mut self,
        target: &mut Document,
        page_id: ObjectId,
        parent: ObjectId,
    ) -> Result<ObjectId, PagewrightError> {
        let source = self.source;
        let page = source.get_dictionary(page_id).map_err(|err| {
            PagewrightError::CorruptInput(format!("cannot read page object {:?}: {}", page_id, err))
        })?;

        // The copied page leaves its page tree behind, so anything it
        // inherited from there has to move onto the page itself.
        let mut flattened = page.clone();
        for key in INHERITABLE_KEYS {
            if !flattened.has(key) {
                if let Some(value) = inherited_attribute(source, page, key) {
                    flattened.set(key.to_vec(), value.clone());
                }
            }
        }

        // A link on an earlier page may already have pulled this page in.
        let new_id = match self.remap.get(&page_id) {
            Some(id) => *id,
            None => {
                let id = target.new_object_id();
                self.remap.insert(page_id, id);
                id
            }
        };

        let mut copied = self.copy_dictionary(target, &flattened)?;
        copied.set("Parent", Object::Reference(parent));
        target.objects.insert(new_id, Object::Dictionary(copied));
        Ok(new_id)
    }

    fn copy_reference(
        &mut self,
        target: &mut Document,
        source_id: ObjectId,
    ) -> Result<ObjectId, PagewrightError> {
        if let Some(id) = self.remap.get(&source_id) {
            return Ok(*id);
        }

        // Reserve the id before recursing so reference cycles terminate.
        let new_id = target.new_object_id();
        self.remap.insert(source_id, new_id);

        let source = self.source;
        let copied = match source.get_object(source_id) {
            Ok(object) => self.copy_object(target, object)?,
            Err(err) => {
                warn!(?source_id, %err, "Cannot resolve reference, using Null");
                Object::Null
            }
        };
        target.objects.insert(new_id, copied);
        Ok(new_id)
    }

    fn copy_object(
        &mut self,
        target: &mut Document,
        object: &Object,
    ) -> Result<Object, PagewrightError> {
        match object {
            Object::Reference(id) => Ok(Object::Reference(self.copy_reference(target, *id)?)),
            Object::Dictionary(dict) => Ok(Object::Dictionary(self.copy_dictionary(target, dict)?)),
            Object::Array(items) => {
                let mut copied = Vec::with_capacity(items.len());
                for item in items {
                    copied.push(self.copy_object(target, item)?);
                }
                Ok(Object::Array(copied))
            }
            Object::Stream(stream) => {
                // Content stays encoded; /Filter travels with the dictionary.
                let mut copied = stream.clone();
                copied.dict = self.copy_dictionary(target, &stream.dict)?;
                Ok(Object::Stream(copied))
            }
            other => Ok(other.clone()),
        }
    }

    fn copy_dictionary(
        &mut self,
        target: &mut Document,
        dict: &Dictionary,
    ) -> Result<Dictionary, PagewrightError> {
        // Page-tree back links are rebuilt by the builder, never copied.
        let is_tree_node = matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Page") | Ok(b"Pages")
        );

        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            if is_tree_node && key == b"Parent" {
                continue;
            }
            copied.set(key.clone(), self.copy_object(target, value)?);
        }
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::pdf::reader::PdfReader;
    use crate::pdf::reader::tests::fixture_pdf;

    fn merge(sources: &[Vec<u8>]) -> Vec<u8> {
        let mut builder = MergeBuilder::new();
        for bytes in sources {
            let doc = PdfReader::from_bytes(bytes).unwrap().into_document();
            builder.append_document(&doc).unwrap();
        }
        builder.finish().unwrap()
    }

    fn walk(doc: &Document, object: &Object, seen: &mut BTreeSet<ObjectId>) {
        match object {
            Object::Reference(id) => {
                if seen.insert(*id) {
                    if let Ok(inner) = doc.get_object(*id) {
                        walk(doc, inner, seen);
                    }
                }
            }
            Object::Dictionary(dict) => {
                for (key, value) in dict.iter() {
                    if key != b"Parent" {
                        walk(doc, value, seen);
                    }
                }
            }
            Object::Array(items) => items.iter().for_each(|item| walk(doc, item, seen)),
            Object::Stream(stream) => walk(doc, &Object::Dictionary(stream.dict.clone()), seen),
            _ => {}
        }
    }

    /// Every object reachable from a page, ignoring page-tree back links.
    fn reachable(doc: &Document, page_id: ObjectId) -> BTreeSet<ObjectId> {
        let mut seen = BTreeSet::new();
        walk(doc, &Object::Reference(page_id), &mut seen);
        seen
    }

    /// Like `reachable`, plus whatever the page inherits from its ancestors.
    fn reachable_with_inherited(doc: &Document, page_id: ObjectId) -> BTreeSet<ObjectId> {
        let mut seen = reachable(doc, page_id);
        let page = doc.get_dictionary(page_id).unwrap();
        for key in INHERITABLE_KEYS {
            if let Some(value) = inherited_attribute(doc, page, key) {
                walk(doc, value, &mut seen);
            }
        }
        seen
    }

    /// `object` with every reference replaced by its target, so trees from
    /// different documents compare by content.
    fn resolved(doc: &Document, object: &Object) -> Object {
        match object {
            Object::Reference(id) => doc
                .get_object(*id)
                .map(|inner| resolved(doc, inner))
                .unwrap_or(Object::Null),
            Object::Dictionary(dict) => {
                let mut out = Dictionary::new();
                for (key, value) in dict.iter() {
                    if key != b"Parent" {
                        out.set(key.clone(), resolved(doc, value));
                    }
                }
                Object::Dictionary(out)
            }
            Object::Array(items) => Object::Array(items.iter().map(|i| resolved(doc, i)).collect()),
            other => other.clone(),
        }
    }

    fn page_contents(doc: &Document) -> Vec<Vec<u8>> {
        doc.get_pages()
            .values()
            .map(|id| doc.get_page_content(*id).unwrap())
            .collect()
    }

    #[test]
    fn page_count_is_sum_in_source_order() {
        let a = fixture_pdf(&["a1", "a2"]);
        let b = fixture_pdf(&["b1"]);
        let c = fixture_pdf(&["c1", "c2", "c3"]);
        let merged = merge(&[a.clone(), b.clone(), c.clone()]);

        let merged_doc = PdfReader::from_bytes(&merged).unwrap().into_document();
        assert_eq!(merged_doc.get_pages().len(), 6);

        let mut expected = Vec::new();
        for source in [&a, &b, &c] {
            let doc = PdfReader::from_bytes(source).unwrap().into_document();
            expected.extend(page_contents(&doc));
        }
        assert_eq!(page_contents(&merged_doc), expected);
    }

    #[test]
    fn shared_resources_are_copied_once_per_source() {
        let merged = merge(&[fixture_pdf(&["x", "y"]), fixture_pdf(&["z"])]);
        let doc = PdfReader::from_bytes(&merged).unwrap().into_document();

        let fonts = doc
            .objects
            .values()
            .filter(|obj| {
                obj.as_dict()
                    .and_then(|d| d.get(b"Type"))
                    .and_then(Object::as_name)
                    .map(|name| name == b"Font")
                    .unwrap_or(false)
            })
            .count();
        // One font from the first source (shared by both its pages), one from
        // the second: no duplication within a source, no dedup across them.
        assert_eq!(fonts, 2);

        let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        let first = reachable(&doc, pages[0]);
        let second = reachable(&doc, pages[1]);
        let third = reachable(&doc, pages[2]);
        assert!(!first.is_disjoint(&second));
        assert!(first.is_disjoint(&third));
        assert!(second.is_disjoint(&third));
    }

    #[test]
    fn copied_page_resources_match_the_original() {
        let source_bytes = fixture_pdf(&["only"]);
        let source = PdfReader::from_bytes(&source_bytes).unwrap().into_document();
        let source_page = *source.get_pages().values().next().unwrap();

        let merged = merge(&[source_bytes]);
        let doc = PdfReader::from_bytes(&merged).unwrap().into_document();
        let merged_page = *doc.get_pages().values().next().unwrap();

        // Resources and MediaBox were inherited in the source; the copy holds
        // them directly and reaches the same objects.
        assert_eq!(
            reachable(&doc, merged_page).len(),
            reachable_with_inherited(&source, source_page).len()
        );

        let page = doc.get_dictionary(merged_page).unwrap();
        let source_dict = source.get_dictionary(source_page).unwrap();
        for key in [b"Resources".as_slice(), b"MediaBox".as_slice()] {
            let copied = page.get(key).unwrap();
            let original = inherited_attribute(&source, source_dict, key).unwrap();
            assert_eq!(resolved(&doc, copied), resolved(&source, original));
        }
    }

    #[test]
    fn empty_builder_has_no_pages() {
        let merged = MergeBuilder::new().finish().unwrap();
        let doc = Document::load_mem(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 0);
    }
}
