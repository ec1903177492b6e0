//! Text helpers for terminal output
//!
//! Line-feed wrapping for raw-mode writes, column-width padding that
//! accounts for wide (CJK) glyphs, and natural-order sort keys.

use std::cmp::Ordering;

use unicode_width::UnicodeWidthStr;

const CRLF: &[u8] = b"\r\n";

/// Surround bytes with `before` and `after` CRLF pairs
pub fn wrap_with_line_feed(data: &[u8], before: usize, after: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + CRLF.len() * (before + after));
    for _ in 0..before {
        out.extend_from_slice(CRLF);
    }
    out.extend_from_slice(data);
    for _ in 0..after {
        out.extend_from_slice(CRLF);
    }
    out
}

/// Surround text with `before` and `after` CRLF pairs
pub fn wrap_str_with_line_feed(text: &str, before: usize, after: usize) -> String {
    format!("{}{}{}", "\r\n".repeat(before), text, "\r\n".repeat(after))
}

/// Terminal column width of a string
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad `s` with `fill` until it spans `width` columns.
///
/// Strings already at or past `width` are returned unchanged.
pub fn pad_to_width(s: &str, width: usize, fill: char) -> String {
    let current = display_width(s);
    if current >= width {
        return s.to_string();
    }
    let mut padded = String::with_capacity(s.len() + (width - current));
    padded.push_str(s);
    padded.extend(std::iter::repeat(fill).take(width - current));
    padded
}

/// Pad each field to its column width and join with a space
pub fn format_columns<S: AsRef<str>>(widths: &[usize], fields: &[S]) -> String {
    widths
        .iter()
        .zip(fields)
        .map(|(width, field)| pad_to_width(field.as_ref(), *width, ' '))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Widest display width among `items`, never less than 1
pub fn max_display_width<S: AsRef<str>>(items: &[S]) -> usize {
    items
        .iter()
        .map(|s| display_width(s.as_ref()))
        .max()
        .unwrap_or(0)
        .max(1)
}

/// One run of a natural sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NaturalPart {
    Number(u64),
    Text(String),
}

impl PartialOrd for NaturalPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NaturalPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            // Digits sort before letters, as in ASCII
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

/// Split a string into alternating lowercase text and integer runs.
///
/// `"test-01-02-db"` becomes `["test-", 1, "-", 2, "-db"]`, so `host-10`
/// orders after `host-2`. Digit runs too long for `u64` stay text.
pub fn natural_key(s: &str) -> Vec<NaturalPart> {
    let mut parts = Vec::new();
    let mut word = String::new();
    let mut in_digits = false;

    for ch in s.chars() {
        let is_digit = ch.is_ascii_digit();
        if !word.is_empty() && is_digit != in_digits {
            parts.push(natural_part(&word, in_digits));
            word.clear();
        }
        in_digits = is_digit;
        word.push(ch);
    }
    if !word.is_empty() {
        parts.push(natural_part(&word, in_digits));
    }
    parts
}

fn natural_part(word: &str, digits: bool) -> NaturalPart {
    if digits {
        if let Ok(n) = word.parse() {
            return NaturalPart::Number(n);
        }
    }
    NaturalPart::Text(word.to_lowercase())
}

/// Case-sensitive substring search across several fields
pub fn matches_any<S: AsRef<str>>(fields: &[S], needle: &str) -> bool {
    fields.iter().any(|field| field.as_ref().contains(needle))
}
