//! Static multilingual pattern tables for the per-page text scanner.
//!
//! The tables are data, not behavior: adding a language means adding rows
//! here. Alphabetic entries match as case-insensitive whole words; CJK
//! entries match as plain substrings because word boundaries do not apply.

use once_cell::sync::Lazy;
use regex::Regex;

/// A compiled keyword table entry.
pub struct Keyword {
    /// Canonical English label for the document type this keyword marks.
    pub label: &'static str,
    pub pattern: Regex,
}

fn word(label: &'static str, pattern: &str) -> Keyword {
    Keyword {
        label,
        pattern: Regex::new(&format!(r"(?i)\b(?:{pattern})\b")).unwrap(),
    }
}

fn substring(label: &'static str, literal: &str) -> Keyword {
    Keyword {
        label,
        pattern: Regex::new(&regex::escape(literal)).unwrap(),
    }
}

/// Ordered document-type keyword table. Multi-word entries come before their
/// single-word prefixes so the most specific wording wins; only the first
/// matching entry is scored.
pub static DOCUMENT_KEYWORDS: Lazy<Vec<Keyword>> = Lazy::new(|| {
    vec![
        // English
        word("tax invoice", r"tax\s+invoice"),
        word("credit note", r"credit\s+note"),
        word("purchase order", r"purchase\s+order"),
        word("statement of account", r"statement\s+of\s+account"),
        word("billing statement", r"billing\s+statement"),
        word("invoice", r"invoice"),
        word("receipt", r"receipt"),
        word("bill", r"bill"),
        // Filipino
        word("receipt", r"resibo"),
        word("bill", r"singil"),
        // Indonesian / Malay
        word("credit note", r"nota\s+kredit"),
        word("purchase order", r"pesanan\s+pembelian"),
        word("invoice", r"faktur"),
        word("invoice", r"invois"),
        word("receipt", r"kwitansi|kuitansi"),
        word("receipt", r"resit"),
        // Vietnamese
        word("invoice", r"hóa\s+đơn"),
        word("purchase order", r"đơn\s+đặt\s+hàng"),
        word("receipt", r"biên\s+lai"),
        word("receipt", r"phiếu\s+thu"),
        // Chinese (simplified + traditional)
        substring("purchase order", "采购订单"),
        substring("purchase order", "採購訂單"),
        substring("invoice", "发票"),
        substring("invoice", "發票"),
        substring("receipt", "收据"),
        substring("receipt", "收據"),
        substring("bill", "账单"),
        substring("bill", "帳單"),
    ]
});

/// Continuation phrases that argue against a page starting a new document.
pub static CONTINUATION_WORDS: Lazy<Vec<Keyword>> = Lazy::new(|| {
    vec![
        word("continued", r"continued"),
        word("continued", r"cont['’]d"),
        word("continued", r"lanjutan"),
        word("continued", r"tiếp\s+theo"),
    ]
});

/// `Page 1 of N`; the first capture is N.
pub static PAGE_ONE_OF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpage\s+1\s+of\s+(\d+)\b").unwrap());

/// `Page N of M`; captures N and M; the caller checks `N > 1`.
pub static PAGE_N_OF_M: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpage\s+(\d+)\s+of\s+(\d+)\b").unwrap());

/// Transaction-style document reference: a 2-3 letter type prefix, a
/// separator, and at least two digits (`INV-001`, `PO#123`, `CN/2044`).
pub static DOC_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z]{2,3}\s?[-#:/]\s?\d{2,}\b").unwrap());

/// First matching document-type keyword in `text`, as `(label, matched)`.
pub fn first_keyword_match(text: &str) -> Option<(&'static str, String)> {
    DOCUMENT_KEYWORDS
        .iter()
        .find_map(|k| k.pattern.find(text).map(|m| (k.label, m.as_str().to_string())))
}

/// First matching continuation phrase in `text`, as `(label, matched)`.
pub fn first_continuation_match(text: &str) -> Option<(&'static str, String)> {
    CONTINUATION_WORDS
        .iter()
        .find_map(|k| k.pattern.find(text).map(|m| (k.label, m.as_str().to_string())))
}
