use serde::Serialize;

pub mod backend;

// Re-export for convenience
pub use backend::{BackendError, OutlineNode, PageText, PdfStructure, TextRun};

/// The kind of evidence a page carries about being (or not being) the first
/// page of a logical sub-document.
///
/// This is a closed set: the scorer and document builder only ever sum the
/// attached scores, so new heuristics can be added here without touching
/// either of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    /// A document-type keyword ("invoice", "faktur", 发票, ...) in the upper
    /// portion of the page.
    Keyword,
    /// The matched keyword was set in a large font (>= 18 pt).
    KeywordLarge,
    /// A "Page 1 of N" marker anywhere on the page.
    PageOneOf,
    /// The page-label sequence reset to "1" at this page.
    PageLabelReset,
    /// An outline bookmark points at this page.
    OutlineBookmark,
    /// A document-reference pattern (INV-001, PO#123) in the upper portion.
    DocRef,
    /// Continuation evidence ("Page 3 of 7", "continued"); argues against a
    /// boundary.
    Continuation,
    /// The page has no extractable text at all.
    Scanned,
}

/// One scored unit of boundary evidence attached to a page.
///
/// Positive scores argue for a boundary, negative scores against it, and a
/// zero score is purely informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundarySignal {
    pub kind: SignalKind,
    /// Human-readable description of what matched.
    pub label: String,
    pub score: i32,
}

impl BoundarySignal {
    pub fn keyword(matched: &str) -> Self {
        Self {
            kind: SignalKind::Keyword,
            label: format!("keyword \"{matched}\" in upper portion"),
            score: 40,
        }
    }

    pub fn keyword_large(matched: &str) -> Self {
        Self {
            kind: SignalKind::KeywordLarge,
            label: format!("keyword \"{matched}\" set in large font"),
            score: 25,
        }
    }

    pub fn page_one_of(total: &str) -> Self {
        Self {
            kind: SignalKind::PageOneOf,
            label: format!("\"Page 1 of {total}\" marker"),
            score: 35,
        }
    }

    pub fn page_label_reset(label: &str) -> Self {
        Self {
            kind: SignalKind::PageLabelReset,
            label: format!("page label reset to \"{label}\""),
            score: 70,
        }
    }

    pub fn outline_bookmark() -> Self {
        Self {
            kind: SignalKind::OutlineBookmark,
            label: "outline bookmark destination".to_string(),
            score: 80,
        }
    }

    pub fn doc_ref(matched: &str) -> Self {
        Self {
            kind: SignalKind::DocRef,
            label: format!("document reference \"{matched}\""),
            score: 20,
        }
    }

    pub fn continuation_page(page: u32, total: u32) -> Self {
        Self {
            kind: SignalKind::Continuation,
            label: format!("\"Page {page} of {total}\" continuation marker"),
            score: -60,
        }
    }

    pub fn continuation_word(matched: &str) -> Self {
        Self {
            kind: SignalKind::Continuation,
            label: format!("continuation word \"{matched}\""),
            score: -40,
        }
    }

    pub fn scanned() -> Self {
        Self {
            kind: SignalKind::Scanned,
            label: "no extractable text".to_string(),
            score: 0,
        }
    }
}

/// Sum the scores of a signal list.
///
/// Pure aggregation: every heuristic contributes only through the score it
/// attached to its signal.
pub fn score(signals: &[BoundarySignal]) -> i32 {
    signals.iter().map(|s| s.score).sum()
}

/// Minimum aggregate score for a non-first page to be called a boundary.
pub const BOUNDARY_THRESHOLD: i32 = 50;

/// Minimum aggregate score for `Confidence::High`.
pub const HIGH_CONFIDENCE_THRESHOLD: i32 = 80;

/// Qualitative bucket derived from a page's aggregate signal score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_score(score: i32) -> Self {
        if score >= HIGH_CONFIDENCE_THRESHOLD {
            Confidence::High
        } else if score >= BOUNDARY_THRESHOLD {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Everything detection learned about a single page. Immutable after scoring.
#[derive(Debug, Clone, Serialize)]
pub struct PageProbe {
    /// 0-based page index.
    pub page_index: usize,
    /// Signals in the order they were gathered (structural, then textual).
    pub signals: Vec<BoundarySignal>,
    pub total_score: i32,
    pub is_boundary: bool,
}

impl PageProbe {
    /// Score a page's gathered signals. Page 0 is a boundary by definition,
    /// regardless of score.
    pub fn new(page_index: usize, signals: Vec<BoundarySignal>) -> Self {
        let total_score = score(&signals);
        let is_boundary = page_index == 0 || total_score >= BOUNDARY_THRESHOLD;
        Self {
            page_index,
            signals,
            total_score,
            is_boundary,
        }
    }

    pub fn confidence(&self) -> Confidence {
        Confidence::from_score(self.total_score)
    }
}

/// Render a 1-based inclusive page range for display: `"4"` or `"4-7"`.
pub fn format_page_range(start: u32, end: u32) -> String {
    if start == end {
        format!("{start}")
    } else {
        format!("{start}-{end}")
    }
}

/// One logical sub-document of the merged PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedDocument {
    /// 0-based position within the batch.
    pub index: usize,
    /// 1-based inclusive first page.
    pub page_start: u32,
    /// 1-based inclusive last page.
    pub page_end: u32,
    /// Display form of the range, `"1-3"` or `"7"`.
    pub page_range: String,
    pub confidence: Confidence,
    /// Signals copied from the document's leading boundary page.
    pub signals: Vec<BoundarySignal>,
}

/// The outcome of boundary detection over a whole merged PDF.
///
/// `documents` partitions `[1, page_count]` into contiguous, non-overlapping,
/// ordered ranges; the first document always starts at page 1.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    pub page_count: usize,
    pub pages: Vec<PageProbe>,
    pub documents: Vec<DetectedDocument>,
    /// True iff every page had zero extractable text (image-only scan).
    pub is_scanned_pdf: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_sums_positive_and_negative() {
        let signals = vec![
            BoundarySignal::keyword("invoice"),
            BoundarySignal::keyword_large("invoice"),
            BoundarySignal::continuation_word("continued"),
        ];
        assert_eq!(score(&signals), 40 + 25 - 40);
    }

    #[test]
    fn score_of_empty_list_is_zero() {
        assert_eq!(score(&[]), 0);
    }

    #[test]
    fn confidence_thresholds() {
        assert_eq!(Confidence::from_score(80), Confidence::High);
        assert_eq!(Confidence::from_score(120), Confidence::High);
        assert_eq!(Confidence::from_score(79), Confidence::Medium);
        assert_eq!(Confidence::from_score(50), Confidence::Medium);
        assert_eq!(Confidence::from_score(49), Confidence::Low);
        assert_eq!(Confidence::from_score(-60), Confidence::Low);
    }

    #[test]
    fn page_zero_is_always_a_boundary() {
        let probe = PageProbe::new(0, vec![BoundarySignal::continuation_page(2, 3)]);
        assert!(probe.is_boundary);
        assert_eq!(probe.total_score, -60);
        assert_eq!(probe.confidence(), Confidence::Low);
    }

    #[test]
    fn later_pages_need_the_threshold() {
        let below = PageProbe::new(3, vec![BoundarySignal::keyword("receipt")]);
        assert!(!below.is_boundary);

        let at = PageProbe::new(
            3,
            vec![
                BoundarySignal::keyword("receipt"),
                BoundarySignal::doc_ref("RC-77"),
            ],
        );
        assert_eq!(at.total_score, 60);
        assert!(at.is_boundary);
    }

    #[test]
    fn synthetic_header_page_scores_one_hundred() {
        // Upper-portion keyword at >= 18pt plus "Page 1 of 3".
        let probe = PageProbe::new(
            4,
            vec![
                BoundarySignal::keyword("invoice"),
                BoundarySignal::keyword_large("invoice"),
                BoundarySignal::page_one_of("3"),
            ],
        );
        assert_eq!(probe.total_score, 100);
        assert!(probe.is_boundary);
        assert_eq!(probe.confidence(), Confidence::High);
    }

    #[test]
    fn format_page_range_collapses_single_pages() {
        assert_eq!(format_page_range(7, 7), "7");
        assert_eq!(format_page_range(1, 3), "1-3");
    }

    #[test]
    fn signal_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&SignalKind::PageLabelReset).unwrap();
        assert_eq!(json, "\"page-label-reset\"");
    }
}
