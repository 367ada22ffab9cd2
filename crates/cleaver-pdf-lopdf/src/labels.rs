//! Page-label expansion: turns the catalog /PageLabels number tree into one
//! display label per page, the way a viewer would show them.

use lopdf::{Dictionary, Document, Object};

use crate::resolve;

/// Expand /PageLabels to `page_count` display labels, or `None` when the
/// document defines no labels. Malformed entries fall back to decimal
/// numbering rather than failing.
pub(crate) fn extract_page_labels(doc: &Document, page_count: usize) -> Option<Vec<String>> {
    let catalog = doc.catalog().ok()?;
    let tree = catalog
        .get(b"PageLabels")
        .ok()
        .and_then(|t| resolve(doc, t).as_dict().ok())?;

    let mut ranges = Vec::new();
    collect_number_tree(doc, tree, &mut ranges);
    if ranges.is_empty() {
        return None;
    }
    ranges.sort_by_key(|(start, _)| *start);

    let mut labels = Vec::with_capacity(page_count);
    for page in 0..page_count {
        // The applicable range is the last one starting at or before `page`.
        let range = ranges
            .iter()
            .rev()
            .find(|(start, _)| *start <= page);
        let label = match range {
            Some((start, dict)) => format_label(doc, dict, page - start),
            None => (page + 1).to_string(),
        };
        labels.push(label);
    }
    Some(labels)
}

/// Collect `(start_page, range_dict)` pairs from a number tree, following
/// /Kids nodes iteratively.
fn collect_number_tree<'a>(
    doc: &'a Document,
    root: &'a Dictionary,
    ranges: &mut Vec<(usize, &'a Dictionary)>,
) {
    let mut stack = vec![root];
    let mut guard = 0;
    while let Some(node) = stack.pop() {
        guard += 1;
        if guard > 4096 {
            break;
        }
        if let Ok(Object::Array(pairs)) = node.get(b"Nums").map(|n| resolve(doc, n)) {
            for pair in pairs.chunks_exact(2) {
                if let (Object::Integer(start), value) = (&pair[0], &pair[1])
                    && *start >= 0
                    && let Ok(dict) = resolve(doc, value).as_dict()
                {
                    ranges.push((*start as usize, dict));
                }
            }
        }
        if let Ok(Object::Array(kids)) = node.get(b"Kids").map(|k| resolve(doc, k)) {
            for kid in kids {
                if let Ok(dict) = resolve(doc, kid).as_dict() {
                    stack.push(dict);
                }
            }
        }
    }
}

/// Format the label for the page `offset` pages into a label range.
fn format_label(doc: &Document, range: &Dictionary, offset: usize) -> String {
    let prefix = match range.get(b"P").map(|p| resolve(doc, p)) {
        Ok(Object::String(bytes, _)) => bytes.iter().map(|&b| b as char).collect(),
        _ => String::new(),
    };
    let start = match range.get(b"St").map(|s| resolve(doc, s)) {
        Ok(Object::Integer(st)) if *st >= 1 => *st as usize,
        _ => 1,
    };
    let number = start + offset;

    let numeral = match range.get(b"S").map(|s| resolve(doc, s)) {
        Ok(Object::Name(style)) => match style.as_slice() {
            b"D" => number.to_string(),
            b"R" => roman(number).to_uppercase(),
            b"r" => roman(number),
            b"A" => letters(number).to_uppercase(),
            b"a" => letters(number),
            _ => number.to_string(),
        },
        // No numbering style: the label is just the prefix.
        _ => String::new(),
    };

    format!("{prefix}{numeral}")
}

/// Lowercase roman numerals (1 -> "i").
fn roman(mut number: usize) -> String {
    const TABLE: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, digits) in TABLE {
        while number >= value {
            out.push_str(digits);
            number -= value;
        }
    }
    out
}

/// Lowercase letter numbering (1 -> "a", 27 -> "aa").
fn letters(number: usize) -> String {
    if number == 0 {
        return String::new();
    }
    let letter = char::from(b'a' + ((number - 1) % 26) as u8);
    let repeat = (number - 1) / 26 + 1;
    std::iter::repeat_n(letter, repeat).collect()
}
