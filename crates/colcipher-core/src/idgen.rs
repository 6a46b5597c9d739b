//! SHA256 + base36 formula id generation.

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::{Digest, Sha256};

/// Prefix for generated formula ids.
pub const FORMULA_ID_PREFIX: &str = "fm";

/// Number of base36 characters after the prefix.
pub const FORMULA_ID_LENGTH: usize = 6;

/// Upper bound on nonce retries in [`unique_formula_id`].
const MAX_NONCE: u32 = 64;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Converts a byte slice to a base36 string of exactly `length` characters.
///
/// Shorter results are left-padded with `0`; longer ones keep the least
/// significant digits.
pub fn encode_base36(data: &[u8], length: usize) -> String {
    let mut num = BigUint::from_bytes_be(data);
    let base = BigUint::from(36u32);

    let mut digits: Vec<char> = Vec::with_capacity(length);
    while !num.is_zero() {
        let rem = &num % &base;
        num /= &base;
        let idx = rem.to_u32_digits().first().copied().unwrap_or(0) as usize;
        digits.push(char::from(BASE36_ALPHABET[idx]));
    }
    while digits.len() < length {
        digits.push('0');
    }
    digits.truncate(length);
    digits.iter().rev().collect()
}

/// Derives a formula id from its name, creation time and a nonce.
///
/// Format: `fm-` followed by six base36 characters.
pub fn generate_formula_id(name: &str, created_at: DateTime<Utc>, nonce: u32) -> String {
    let content = format!(
        "{}|{}|{}",
        name,
        created_at.timestamp_nanos_opt().unwrap_or(0),
        nonce
    );
    let hash = Sha256::digest(content.as_bytes());
    // 4 bytes = 32 bits, a little over six base36 digits.
    let short = encode_base36(&hash[..4], FORMULA_ID_LENGTH);
    format!("{}-{}", FORMULA_ID_PREFIX, short)
}

/// Generates an id not rejected by `taken`, bumping the nonce on collision.
///
/// Returns `None` only if every nonce up to the retry limit collides.
pub fn unique_formula_id<F>(name: &str, created_at: DateTime<Utc>, taken: F) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    (0..MAX_NONCE)
        .map(|nonce| generate_formula_id(name, created_at, nonce))
        .find(|id| !taken(id))
}
