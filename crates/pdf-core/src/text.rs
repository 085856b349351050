//! PDF text string encoding
//!
//! Field names and values are PDF text strings: either PDFDocEncoding
//! (a single-byte superset of ASCII) or UTF-16BE prefixed with a byte order mark.

use lopdf::{Object, StringFormat};

const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// PDFDocEncoding code points that differ from Latin-1, for bytes 0x18..=0x1F
const PDF_DOC_LOW: [char; 8] = [
    '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}', '\u{02DC}',
];

/// Same for bytes 0x80..=0xA0. 0x9F is undefined.
const PDF_DOC_HIGH: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
    '\u{20AC}',
];

/// Encode a value as a PDF text string object
///
/// ASCII values whose bytes read back unchanged as PDFDocEncoding are written
/// as literal strings. Anything else (for example Vietnamese names with
/// diacritics) is written as UTF-16BE with a BOM so every conforming viewer
/// decodes it the same way.
pub fn encode_text_string(value: &str) -> Object {
    if value.bytes().all(|b| b.is_ascii() && !matches!(b, 0x18..=0x1F | 0x7F)) {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = Vec::with_capacity(2 + value.len() * 2);
    bytes.extend_from_slice(&UTF16BE_BOM);
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode the raw bytes of a PDF text string
///
/// Handles UTF-16BE with BOM, UTF-8 with BOM (PDF 2.0), and falls back to
/// PDFDocEncoding. Its undefined bytes decode to U+FFFD.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&UTF16BE_BOM[..]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    if let Some(rest) = bytes.strip_prefix(&UTF8_BOM[..]) {
        return String::from_utf8_lossy(rest).into_owned();
    }

    bytes.iter().map(|&b| pdf_doc_char(b)).collect()
}

fn pdf_doc_char(byte: u8) -> char {
    match byte {
        0x18..=0x1F => PDF_DOC_LOW[usize::from(byte - 0x18)],
        0x80..=0xA0 => PDF_DOC_HIGH[usize::from(byte - 0x80)],
        0x7F | 0xAD => char::REPLACEMENT_CHARACTER,
        _ => char::from(byte),
    }
}

/// Read a string-like object (string or name) as text
pub(crate) fn object_to_text(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}
