//! WinAnsiEncoding for the base-14 fonts.
//!
//! Latin-1 maps to itself; the 0x80..=0x9F block carries the Windows-1252
//! punctuation models like to emit (smart quotes, dashes, bullets).

/// Windows-1252 characters in 0x80..=0x9F that differ from Latin-1.
const CP1252_EXTRAS: &[(char, u8)] = &[
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Returns the WinAnsi byte for `c`, or `None` if the font cannot show it.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(c as u32 as u8),
        _ => CP1252_EXTRAS
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, byte)| *byte),
    }
}

pub fn is_encodable(s: &str) -> bool {
    s.chars().all(|c| win_ansi_byte(c).is_some())
}

/// Drops every character the font cannot encode. Tabs become spaces first.
pub fn strip_unencodable(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\t' { ' ' } else { c })
        .filter(|c| win_ansi_byte(*c).is_some())
        .collect()
}

/// Encodes a string already passed through `strip_unencodable`.
/// Any character that still cannot be encoded is skipped.
pub fn encode(s: &str) -> Vec<u8> {
    s.chars().filter_map(win_ansi_byte).collect()
}
