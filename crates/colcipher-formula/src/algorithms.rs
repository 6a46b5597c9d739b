//! The character-level transforms behind each algorithm.
//!
//! Plain functions over `&str`; parameter handling and error policy live in
//! [`crate::registry`] and [`crate::engine`].

use std::collections::HashMap;

const ALPHABET_LEN: i64 = 26;
const DIGITS_LEN: i64 = 10;

/// Rotates ASCII letters by `letter_shift` within their case and ASCII digits
/// by `digit_shift`. All other characters pass through unchanged.
///
/// Shifts of any sign or magnitude are normalised with a Euclidean remainder.
pub fn rotate_ascii(value: &str, letter_shift: i64, digit_shift: i64) -> String {
    let letters = letter_shift.rem_euclid(ALPHABET_LEN) as u8;
    let digits = digit_shift.rem_euclid(DIGITS_LEN) as u8;
    value
        .chars()
        .map(|c| match c {
            'a'..='z' => rotate_in(c, b'a', 26, letters),
            'A'..='Z' => rotate_in(c, b'A', 26, letters),
            '0'..='9' => rotate_in(c, b'0', 10, digits),
            other => other,
        })
        .collect()
}

fn rotate_in(c: char, base: u8, len: u8, shift: u8) -> char {
    let offset = (c as u8 - base + shift) % len;
    char::from(base + offset)
}

/// Caesar encode: letters mod 26 and digits mod 10, both by `shift`.
pub fn caesar_encode(value: &str, shift: i64) -> String {
    rotate_ascii(value, shift, shift)
}

/// Caesar decode: the inverse rotation of [`caesar_encode`].
pub fn caesar_decode(value: &str, shift: i64) -> String {
    rotate_ascii(
        value,
        ALPHABET_LEN - shift.rem_euclid(ALPHABET_LEN),
        DIGITS_LEN - shift.rem_euclid(DIGITS_LEN),
    )
}

/// Reverses the sequence of ASCII alphanumerics, leaving every other
/// character at its original position. Applying it twice is the identity.
pub fn reverse_alphanumerics(value: &str) -> String {
    let mut reversed = value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<Vec<_>>()
        .into_iter()
        .rev();
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                reversed.next().unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Left circular rotation of the character sequence by `shift`.
///
/// Strings of zero or one character are returned unchanged.
pub fn rotate_left(value: &str, shift: i64) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= 1 {
        return value.to_string();
    }
    let s = shift.rem_euclid(len as i64) as usize;
    chars[s..].iter().chain(chars[..s].iter()).collect()
}

/// The inverse of [`rotate_left`] for the same `shift`.
pub fn rotate_right(value: &str, shift: i64) -> String {
    let len = value.chars().count();
    if len <= 1 {
        return value.to_string();
    }
    let s = shift.rem_euclid(len as i64);
    rotate_left(value, len as i64 - s)
}

/// Replaces every character found in `table`; others pass through.
pub fn substitute(value: &str, table: &HashMap<char, char>) -> String {
    value
        .chars()
        .map(|c| table.get(&c).copied().unwrap_or(c))
        .collect()
}

/// Builds the encode table from mapping pairs.
pub fn forward_table(pairs: &[(char, char)]) -> HashMap<char, char> {
    pairs.iter().copied().collect()
}

/// Builds the decode table (value to key) from mapping pairs.
///
/// When several keys map to the same value the last pair in insertion order
/// wins, so decoding a non-injective mapping is lossy.
pub fn inverse_table(pairs: &[(char, char)]) -> HashMap<char, char> {
    pairs.iter().map(|&(from, to)| (to, from)).collect()
}

/// Mapped values produced by more than one key, in first-seen order.
pub fn ambiguous_targets(pairs: &[(char, char)]) -> Vec<char> {
    let mut seen: HashMap<char, usize> = HashMap::new();
    let mut order = Vec::new();
    for &(_, to) in pairs {
        let count = seen.entry(to).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(to);
        }
    }
    order
}

/// Swaps the case of ASCII letters.
pub fn swap_ascii_case(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() {
                c.to_ascii_uppercase()
            } else if c.is_ascii_uppercase() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}

/// Mirrors ASCII letters within their alphabet (a <-> z, B <-> Y).
pub fn atbash(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            'a'..='z' => char::from(b'z' - (c as u8 - b'a')),
            'A'..='Z' => char::from(b'Z' - (c as u8 - b'A')),
            other => other,
        })
        .collect()
}
