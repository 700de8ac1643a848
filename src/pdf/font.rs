//! Helvetica metrics for overlay text
//!
//! Overlays draw with the built-in Helvetica Type1 font, one of the 14
//! standard PDF fonts every viewer ships, so no font program needs to be
//! embedded. Placement still needs glyph widths: this table carries the
//! Helvetica advance widths for the printable ASCII range in 1/1000ths of
//! the em square.

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Helvetica advance widths for characters 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Fallback advance for characters outside the table.
const DEFAULT_WIDTH: u16 = 556;

/// Measure a string rendered in Helvetica at `font_size` points.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 32) as usize])
            } else {
                u32::from(DEFAULT_WIDTH)
            }
        })
        .sum();
    f64::from(units) / 1000.0 * font_size
}

/// Add a Helvetica Type1 font dictionary to the document.
pub fn add_helvetica(doc: &mut Document) -> ObjectId {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    doc.add_object(Object::Dictionary(font))
}

/// Escape special characters for a PDF literal string.
pub fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}
