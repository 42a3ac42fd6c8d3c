//! Unicode to WinAnsi conversion for standard-font text
//!
//! The standard-14 Helvetica faces are shown with WinAnsiEncoding.
//! ASCII passes through, U+00A0..=U+00FF maps to itself (WinAnsi agrees
//! with Latin-1 there), and the Windows punctuation block at 0x80..0x9F
//! goes through a small table. Anything else becomes '?'.

/// Characters occupying the 0x80..=0x9F WinAnsi slots
const HIGH_CONTROL_SLOTS: &[(char, u8)] = &[
    ('\u{20AC}', 0x80), // euro sign
    ('\u{201A}', 0x82), // single low quote
    ('\u{0192}', 0x83), // f with hook
    ('\u{201E}', 0x84), // double low quote
    ('\u{2026}', 0x85), // ellipsis
    ('\u{2020}', 0x86), // dagger
    ('\u{2021}', 0x87), // double dagger
    ('\u{02C6}', 0x88), // circumflex accent
    ('\u{2030}', 0x89), // per mille
    ('\u{0160}', 0x8A), // S caron
    ('\u{2039}', 0x8B), // single left guillemet
    ('\u{0152}', 0x8C), // OE ligature
    ('\u{017D}', 0x8E), // Z caron
    ('\u{2018}', 0x91), // left single quote
    ('\u{2019}', 0x92), // right single quote
    ('\u{201C}', 0x93), // left double quote
    ('\u{201D}', 0x94), // right double quote
    ('\u{2022}', 0x95), // bullet
    ('\u{2013}', 0x96), // en dash
    ('\u{2014}', 0x97), // em dash
    ('\u{02DC}', 0x98), // small tilde
    ('\u{2122}', 0x99), // trademark
    ('\u{0161}', 0x9A), // s caron
    ('\u{203A}', 0x9B), // single right guillemet
    ('\u{0153}', 0x9C), // oe ligature
    ('\u{017E}', 0x9E), // z caron
    ('\u{0178}', 0x9F), // Y diaeresis
];

fn encode_char(ch: char) -> u8 {
    let code = ch as u32;
    match code {
        0x00..=0x7F => code as u8,
        0xA0..=0xFF => code as u8,
        _ => HIGH_CONTROL_SLOTS
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, b)| *b)
            .unwrap_or(b'?'),
    }
}

/// Convert a string to WinAnsi bytes for a `show` operation
pub fn winansi(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}
