//! Positioned text-run extraction from page content streams.
//!
//! Tracks just enough of the text state machine to answer the questions the
//! scanner asks: what text appears, how high on the page, and at what font
//! size. Horizontal position, rotation, and glyph metrics are ignored.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object};

use cleaver_core::{PageText, TextRun};

use crate::{as_f32, resolve};

/// US Letter fallback when no MediaBox is present anywhere in the page tree.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

pub(crate) fn extract_page_text(
    doc: &Document,
    page: &Dictionary,
) -> Result<PageText, lopdf::Error> {
    let media_box = find_media_box(doc, page);
    let height = media_box[3] - media_box[1];

    let Ok(contents) = page.get(b"Contents") else {
        // A page with no content stream is a valid (blank or image-less) page.
        return Ok(PageText {
            runs: vec![],
            height,
        });
    };

    let data = content_data(doc, contents)?;
    if data.is_empty() {
        return Ok(PageText {
            runs: vec![],
            height,
        });
    }

    let content = Content::decode(&data)?;
    let runs = collect_runs(&content);
    Ok(PageText { runs, height })
}

/// MediaBox from the page dictionary or, when inherited, its /Parent chain.
fn find_media_box(doc: &Document, page: &Dictionary) -> [f32; 4] {
    let mut dict = page;
    // Page trees are shallow; the bound guards against parent cycles.
    for _ in 0..32 {
        if let Ok(object) = dict.get(b"MediaBox")
            && let Object::Array(values) = resolve(doc, object)
        {
            let bounds: Vec<f32> = values.iter().filter_map(as_f32).collect();
            if bounds.len() == 4 {
                return [bounds[0], bounds[1], bounds[2], bounds[3]];
            }
        }
        match dict.get(b"Parent").map(|p| resolve(doc, p)) {
            Ok(Object::Dictionary(parent)) => dict = parent,
            _ => break,
        }
    }
    DEFAULT_MEDIA_BOX
}

/// Concatenate the page's content stream(s), following references and
/// decompressing each stream.
fn content_data(doc: &Document, contents: &Object) -> Result<Vec<u8>, lopdf::Error> {
    match resolve(doc, contents) {
        Object::Stream(stream) => stream.decompressed_content(),
        Object::Array(parts) => {
            let mut data = Vec::new();
            for part in parts {
                data.extend(content_data(doc, part)?);
                data.push(b'\n');
            }
            Ok(data)
        }
        _ => Ok(Vec::new()),
    }
}

/// Text-state tracking across content operations.
struct TextState {
    /// Font size set by the last Tf.
    font_size: f32,
    /// Vertical scale of the current text matrix (Tm d component).
    matrix_scale: f32,
    /// Current vertical position in text space.
    y: f32,
    /// Line leading for T* / ' / ".
    leading: f32,
}

impl TextState {
    fn new() -> Self {
        Self {
            font_size: 0.0,
            matrix_scale: 1.0,
            y: 0.0,
            leading: 0.0,
        }
    }

    fn effective_font_size(&self) -> f32 {
        (self.font_size * self.matrix_scale).abs()
    }
}

fn collect_runs(content: &Content) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut state = TextState::new();

    for operation in &content.operations {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "BT" => {
                state.y = 0.0;
                state.matrix_scale = 1.0;
            }
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(as_f32) {
                    state.font_size = size;
                }
            }
            "Tm" => {
                // [a b c d e f]: d scales the font, f is the baseline y.
                if operands.len() == 6 {
                    if let Some(d) = as_f32(&operands[3]) {
                        state.matrix_scale = d;
                    }
                    if let Some(f) = as_f32(&operands[5]) {
                        state.y = f;
                    }
                }
            }
            "Td" => {
                if let Some(ty) = operands.get(1).and_then(as_f32) {
                    state.y += ty * state.matrix_scale;
                }
            }
            "TD" => {
                if let Some(ty) = operands.get(1).and_then(as_f32) {
                    state.leading = -ty;
                    state.y += ty * state.matrix_scale;
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(as_f32) {
                    state.leading = leading;
                }
            }
            "T*" => {
                state.y -= state.leading * state.matrix_scale;
            }
            "Tj" => {
                push_run(&mut runs, &state, show_text(operands.first()));
            }
            "'" => {
                state.y -= state.leading * state.matrix_scale;
                push_run(&mut runs, &state, show_text(operands.first()));
            }
            "\"" => {
                state.y -= state.leading * state.matrix_scale;
                push_run(&mut runs, &state, show_text(operands.get(2)));
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = operands.first() {
                    let mut text = String::new();
                    for part in parts {
                        if let Object::String(bytes, _) = part {
                            text.push_str(&decode_string(bytes));
                        }
                    }
                    push_run(&mut runs, &state, text);
                }
            }
            _ => {}
        }
    }

    runs
}

fn show_text(operand: Option<&Object>) -> String {
    match operand {
        Some(Object::String(bytes, _)) => decode_string(bytes),
        _ => String::new(),
    }
}

fn push_run(runs: &mut Vec<TextRun>, state: &TextState, text: String) {
    if text.trim().is_empty() {
        return;
    }
    runs.push(TextRun {
        text,
        y: state.y,
        font_size: state.effective_font_size(),
    });
}

/// Decode PDF string bytes to a Rust string.
///
/// UTF-16BE strings carry a BOM; everything else is treated as a Latin-1
/// superset, which is close enough to PDFDocEncoding for keyword matching.
/// CID-encoded text without a usable mapping comes out garbled and simply
/// fails to match any pattern.
fn decode_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;

    fn content(operations: Vec<Operation>) -> Content {
        Content { operations }
    }

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    #[test]
    fn tj_runs_carry_position_and_size() {
        let runs = collect_runs(&content(vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 24.into()]),
            op(
                "Tm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    72.into(),
                    760.into(),
                ],
            ),
            op("Tj", vec![Object::string_literal("INVOICE")]),
            op("ET", vec![]),
        ]));
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "INVOICE");
        assert!((runs[0].y - 760.0).abs() < 0.01);
        assert!((runs[0].font_size - 24.0).abs() < 0.01);
    }

    #[test]
    fn td_moves_are_cumulative() {
        let runs = collect_runs(&content(vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("Td", vec![0.into(), 700.into()]),
            op("Tj", vec![Object::string_literal("first")]),
            op("Td", vec![0.into(), Object::Real(-14.0)]),
            op("Tj", vec![Object::string_literal("second")]),
            op("ET", vec![]),
        ]));
        assert_eq!(runs.len(), 2);
        assert!((runs[0].y - 700.0).abs() < 0.01);
        assert!((runs[1].y - 686.0).abs() < 0.01);
    }

    #[test]
    fn tm_scale_multiplies_the_font_size() {
        let runs = collect_runs(&content(vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
            op(
                "Tm",
                vec![
                    2.into(),
                    0.into(),
                    0.into(),
                    2.into(),
                    0.into(),
                    500.into(),
                ],
            ),
            op("Tj", vec![Object::string_literal("big")]),
            op("ET", vec![]),
        ]));
        assert!((runs[0].font_size - 24.0).abs() < 0.01);
    }

    #[test]
    fn tj_array_concatenates_with_kerning_ignored() {
        let runs = collect_runs(&content(vec![
            op("BT", vec![]),
            op("Td", vec![0.into(), 600.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("IN"),
                    Object::Integer(-120),
                    Object::string_literal("VOICE"),
                ])],
            ),
            op("ET", vec![]),
        ]));
        assert_eq!(runs[0].text, "INVOICE");
    }

    #[test]
    fn t_star_advances_by_leading() {
        let runs = collect_runs(&content(vec![
            op("BT", vec![]),
            op("TL", vec![14.into()]),
            op("Td", vec![0.into(), 700.into()]),
            op("Tj", vec![Object::string_literal("one")]),
            op("T*", vec![]),
            op("Tj", vec![Object::string_literal("two")]),
            op("ET", vec![]),
        ]));
        assert!((runs[1].y - 686.0).abs() < 0.01);
    }

    #[test]
    fn whitespace_only_runs_are_dropped() {
        let runs = collect_runs(&content(vec![
            op("BT", vec![]),
            op("Tj", vec![Object::string_literal("   ")]),
            op("ET", vec![]),
        ]));
        assert!(runs.is_empty());
    }

    #[test]
    fn utf16be_strings_decode() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "发票".encode_utf16() {
            bytes.extend(unit.to_be_bytes());
        }
        assert_eq!(decode_string(&bytes), "发票");
    }

    #[test]
    fn latin1_bytes_decode() {
        assert_eq!(decode_string(b"Facture n\xB0 12"), "Facture n° 12");
    }
}
