//! Manual page-range override parser.
//!
//! Accepts a comma-separated list of `N` and `N-M` tokens (1-based,
//! inclusive) and produces the same document shape as detection. Manual
//! input is trusted: every document gets high confidence and no signals.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use cleaver_core::{Confidence, DetectedDocument, format_page_range};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeError {
    #[error("no page ranges given")]
    Empty,
    #[error("invalid range \"{0}\": expected a page number or start-end")]
    BadToken(String),
    #[error("invalid range \"{0}\": pages are numbered from 1")]
    PageZero(String),
    #[error("invalid range \"{0}\": start page is after end page")]
    Inverted(String),
    #[error("range \"{token}\" is out of bounds: the document has {page_count} pages")]
    OutOfBounds { token: String, page_count: usize },
    #[error("range \"{token}\" overlaps the previous range, which ends at page {previous_end}")]
    Overlap { token: String, previous_end: u32 },
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)(?:-(\d+))?$").unwrap());

/// Parse a manual override like `"1-3,4-6,7"` against a known page count.
///
/// Tokens must be ordered and non-overlapping; gaps between ranges are
/// permitted (uncovered pages are simply not cut). Any invalid token fails
/// the whole parse with no partial result.
pub fn parse_page_ranges(
    input: &str,
    page_count: usize,
) -> Result<Vec<DetectedDocument>, RangeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RangeError::Empty);
    }

    let mut documents = Vec::new();
    let mut previous_end: Option<u32> = None;

    for (index, raw) in trimmed.split(',').enumerate() {
        let token = raw.trim();
        let caps = TOKEN_RE
            .captures(token)
            .ok_or_else(|| RangeError::BadToken(token.to_string()))?;

        let start: u32 = caps[1]
            .parse()
            .map_err(|_| RangeError::BadToken(token.to_string()))?;
        let end: u32 = match caps.get(2) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| RangeError::BadToken(token.to_string()))?,
            None => start,
        };

        if start < 1 || end < 1 {
            return Err(RangeError::PageZero(token.to_string()));
        }
        if start > end {
            return Err(RangeError::Inverted(token.to_string()));
        }
        if end as usize > page_count {
            return Err(RangeError::OutOfBounds {
                token: token.to_string(),
                page_count,
            });
        }
        if let Some(previous_end) = previous_end
            && start <= previous_end
        {
            return Err(RangeError::Overlap {
                token: token.to_string(),
                previous_end,
            });
        }

        previous_end = Some(end);
        documents.push(DetectedDocument {
            index,
            page_start: start,
            page_end: end,
            page_range: format_page_range(start, end),
            confidence: Confidence::High,
            signals: vec![],
        });
    }

    Ok(documents)
}
