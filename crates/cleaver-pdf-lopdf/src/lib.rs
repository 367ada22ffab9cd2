//! lopdf-based implementation of [`PdfStructure`].
//!
//! This crate is the isolation layer for the PDF object-model dependency:
//! the detection pipeline only sees the `cleaver-core` backend contract, so
//! swapping the PDF library touches nothing else.
//!
//! Extraction is deliberately best-effort. Page count and per-page text are
//! required; outline bookmarks and page labels degrade to empty values when
//! missing or malformed, matching the contract's "absent structure is not an
//! error" rule.

use std::collections::HashMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use cleaver_core::{BackendError, OutlineNode, PageText, PdfStructure};

mod labels;
mod outline;
mod text;

/// PDF structure extractor backed by `lopdf::Document`.
pub struct LopdfStructure {
    doc: Document,
    /// Page object ids in document order.
    page_ids: Vec<ObjectId>,
    /// Reverse map: page object id -> 0-based page index.
    page_index_by_id: HashMap<ObjectId, usize>,
}

impl LopdfStructure {
    /// Open a PDF from the filesystem.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let doc = Document::load(path)
            .map_err(|e| BackendError::OpenError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_document(doc))
    }

    /// Open a PDF from an in-memory byte buffer.
    pub fn from_bytes(data: &[u8]) -> Result<Self, BackendError> {
        let doc = Document::load_mem(data).map_err(|e| BackendError::OpenError(e.to_string()))?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: Document) -> Self {
        // get_pages is keyed by 1-based page number, already in order.
        let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        let page_index_by_id = page_ids
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index))
            .collect();
        debug!(pages = page_ids.len(), "PDF loaded");
        Self {
            doc,
            page_ids,
            page_index_by_id,
        }
    }

    fn page_dict(&self, page_index: usize) -> Result<&Dictionary, BackendError> {
        let id = self
            .page_ids
            .get(page_index)
            .ok_or_else(|| BackendError::StructureError(format!("no page {page_index}")))?;
        self.doc
            .get_object(*id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::StructureError(format!("page {page_index}: {e}")))
    }
}

impl PdfStructure for LopdfStructure {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_text(&self, page_index: usize) -> Result<PageText, BackendError> {
        let page = self.page_dict(page_index)?;
        text::extract_page_text(&self.doc, page)
            .map_err(|e| BackendError::StructureError(format!("page {page_index}: {e}")))
    }

    fn outline(&self) -> Vec<OutlineNode> {
        outline::extract_outline(&self.doc, &self.page_index_by_id)
    }

    fn page_labels(&self) -> Option<Vec<String>> {
        labels::extract_page_labels(&self.doc, self.page_ids.len())
    }
}

/// Follow reference chains to the target object. Bounded so a reference
/// cycle in a damaged file cannot loop forever.
pub(crate) fn resolve<'a>(doc: &'a Document, mut object: &'a Object) -> &'a Object {
    for _ in 0..16 {
        match object {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(target) => object = target,
                Err(_) => return object,
            },
            _ => return object,
        }
    }
    object
}

pub(crate) fn as_f32(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
