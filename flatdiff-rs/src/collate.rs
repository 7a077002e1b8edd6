//! Locale-aware key ordering.
//!
//! Approximates the root collation order used by locale-sensitive string
//! comparison: whitespace and punctuation sort before digits, digits before
//! letters, and letters compare by base letter at the primary level, so `é`
//! sorts with `e` and case is ignored. Ties fall back to accents, then case
//! (lowercase first) and finally to code points, so the ordering is total.
//!
//! Accents are folded for Latin-1 and Latin Extended-A letters. Other
//! scripts compare by code point within the letter class.

use std::cmp::Ordering;

/// Rank of ASCII whitespace and punctuation in root collation order.
const PUNCTUATION_ORDER: &str = "\t\n\u{b}\u{c}\r _-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Offset placing non-ASCII symbols after the ranked ASCII punctuation.
const OTHER_SYMBOL_BASE: u32 = 0x100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
    Symbol,
    Digit,
    Letter,
}

fn primary_weight(c: char) -> (Class, u32) {
    if let Some(digit) = c.to_digit(10) {
        return (Class::Digit, digit);
    }
    if c.is_alphabetic() {
        return (Class::Letter, base_letter(lowercase(c)) as u32);
    }
    match PUNCTUATION_ORDER.find(c) {
        Some(rank) => (Class::Symbol, rank as u32),
        None => (Class::Symbol, OTHER_SYMBOL_BASE + c as u32),
    }
}

fn lowercase(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Strips the accent from a lowercase Latin letter.
fn base_letter(c: char) -> char {
    match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => c,
    }
}

/// Compares two strings in locale-aware order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary_weight)
        .cmp(b.chars().map(primary_weight))
        .then_with(|| a.chars().map(lowercase).cmp(b.chars().map(lowercase)))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}
