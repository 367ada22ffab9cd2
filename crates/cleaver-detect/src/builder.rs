//! Document builder: converts the ordered set of boundary pages into
//! contiguous, non-overlapping 1-based page ranges.

use cleaver_core::{DetectedDocument, PageProbe, format_page_range};

/// Build the document list from scored pages.
///
/// Every boundary page starts a document that runs up to the page before the
/// next boundary; the last document runs to the end. Each document inherits
/// confidence and signals from its leading page. The probes are expected in
/// page order with page 0 marked as a boundary (see `PageProbe::new`), which
/// makes the output partition `[1, page_count]` exactly.
pub fn build_documents(pages: &[PageProbe]) -> Vec<DetectedDocument> {
    let boundaries: Vec<usize> = pages
        .iter()
        .filter(|p| p.is_boundary)
        .map(|p| p.page_index)
        .collect();

    let mut documents = Vec::with_capacity(boundaries.len());
    for (index, &start) in boundaries.iter().enumerate() {
        let end = match boundaries.get(index + 1) {
            Some(&next) => next - 1,
            None => pages.len() - 1,
        };

        let page_start = (start + 1) as u32;
        let page_end = (end + 1) as u32;
        let lead = &pages[start];

        documents.push(DetectedDocument {
            index,
            page_start,
            page_end,
            page_range: format_page_range(page_start, page_end),
            confidence: lead.confidence(),
            signals: lead.signals.clone(),
        });
    }

    documents
}
