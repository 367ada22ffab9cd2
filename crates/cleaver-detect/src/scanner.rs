//! Per-page text scanner: turns a page's positioned runs into boundary and
//! anti-boundary signals.

use cleaver_core::{BoundarySignal, PageText, TextRun};

use crate::keywords;

/// Runs at or above this normalized y (0 = bottom, 1 = top) form the "upper
/// portion" of the page, where document-type headers conventionally appear.
pub const UPPER_PORTION_MIN_Y: f32 = 0.6;

/// Font size, in points, at which a matched keyword counts as a heading.
pub const LARGE_FONT_PT: f32 = 18.0;

fn normalized_y(run: &TextRun, height: f32) -> f32 {
    if height > 0.0 {
        run.y / height
    } else {
        // Position unknown; keep the run eligible for header matching.
        1.0
    }
}

fn joined(runs: &[&TextRun]) -> String {
    runs.iter()
        .map(|r| r.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scan one page's text for boundary evidence.
///
/// A page with no runs at all yields exactly one `Scanned` signal; text
/// heuristics cannot run on it.
pub fn scan_page(page: &PageText) -> Vec<BoundarySignal> {
    if page.runs.is_empty() {
        return vec![BoundarySignal::scanned()];
    }

    let all: Vec<&TextRun> = page.runs.iter().collect();
    let upper: Vec<&TextRun> = page
        .runs
        .iter()
        .filter(|r| normalized_y(r, page.height) >= UPPER_PORTION_MIN_Y)
        .collect();

    let upper_text = joined(&upper);
    let full_text = joined(&all);

    let mut signals = Vec::new();

    // Document-type keyword in the upper portion; first table entry only.
    if let Some((_, matched)) = keywords::first_keyword_match(&upper_text) {
        signals.push(BoundarySignal::keyword(&matched));

        // Large-font bonus: only an upper run containing the matched text
        // itself qualifies, not an unrelated large heading.
        let matched_lower = matched.to_lowercase();
        if upper
            .iter()
            .any(|r| r.font_size >= LARGE_FONT_PT && r.text.to_lowercase().contains(&matched_lower))
        {
            signals.push(BoundarySignal::keyword_large(&matched));
        }
    }

    if let Some(caps) = keywords::PAGE_ONE_OF.captures(&full_text) {
        signals.push(BoundarySignal::page_one_of(&caps[1]));
    }

    if let Some(m) = keywords::DOC_REF.find(&upper_text) {
        signals.push(BoundarySignal::doc_ref(m.as_str()));
    }

    // Continuation anti-signals; both may fire on the same page.
    for caps in keywords::PAGE_N_OF_M.captures_iter(&full_text) {
        // Numbers too large for u32 saturate; they still mark a continuation.
        let n: u32 = caps[1].parse().unwrap_or(u32::MAX);
        let total: u32 = caps[2].parse().unwrap_or(u32::MAX);
        if n > 1 {
            signals.push(BoundarySignal::continuation_page(n, total));
            break;
        }
    }
    if let Some((_, matched)) = keywords::first_continuation_match(&full_text) {
        signals.push(BoundarySignal::continuation_word(&matched));
    }

    signals
}
