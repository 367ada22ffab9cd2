use thiserror::Error;
use tracing::debug;

pub mod builder;
pub mod keywords;
pub mod probes;
pub mod ranges;
pub mod scanner;

pub use ranges::{RangeError, parse_page_ranges};
// Re-export domain types from core (canonical definitions live there)
pub use cleaver_core::{
    BoundarySignal, Confidence, DetectedDocument, DetectionResult, PageProbe, PdfStructure,
    SignalKind,
};

#[derive(Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Backend(#[from] cleaver_core::BackendError),
}

/// Detect logical document boundaries across a merged multi-document PDF.
///
/// Pipeline:
/// 1. Run the structural probes once, up front (outline bookmarks,
///    page-label resets)
/// 2. Scan each page's text in index order for keyword / page-number /
///    document-reference evidence
/// 3. Score each page and classify it as boundary or continuation
/// 4. Fold the boundary pages into contiguous per-document page ranges
///
/// The result partitions `[1, page_count]`; page 1 always starts the first
/// document. Detection-phase failures abort with no partial result.
pub fn detect_documents(backend: &dyn PdfStructure) -> Result<DetectionResult, DetectError> {
    let page_count = backend.page_count();
    if page_count == 0 {
        return Ok(DetectionResult {
            page_count: 0,
            pages: vec![],
            documents: vec![],
            is_scanned_pdf: false,
        });
    }

    let outline_hits = probes::outline_probe(&backend.outline());
    let labels = backend.page_labels();
    let label_hits = probes::page_label_probe(labels.as_deref());
    debug!(
        pages = page_count,
        bookmarks = outline_hits.len(),
        label_resets = label_hits.len(),
        "structural probes complete"
    );

    let mut pages = Vec::with_capacity(page_count);
    let mut scanned_pages = 0usize;

    for page_index in 0..page_count {
        let text = backend.page_text(page_index)?;

        let mut signals = Vec::new();
        if let Some(hit) = outline_hits.get(&page_index) {
            signals.push(hit.clone());
        }
        if let Some(hit) = label_hits.get(&page_index) {
            signals.push(hit.clone());
        }

        let textual = scanner::scan_page(&text);
        if textual.iter().any(|s| s.kind == SignalKind::Scanned) {
            scanned_pages += 1;
        }
        signals.extend(textual);

        let probe = PageProbe::new(page_index, signals);
        debug!(
            page = page_index,
            score = probe.total_score,
            boundary = probe.is_boundary,
            "scored page"
        );
        pages.push(probe);
    }

    let documents = builder::build_documents(&pages);
    let is_scanned_pdf = scanned_pages == page_count;

    Ok(DetectionResult {
        page_count,
        pages,
        documents,
        is_scanned_pdf,
    })
}
