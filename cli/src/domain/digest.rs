//! Hex digest helpers.

use std::fmt::Write as _;

/// Lowercase hex encoding of `bytes`.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

/// Compare an expected digest from config with a computed one.
///
/// Case and surrounding whitespace in `expected` are ignored.
#[must_use]
pub fn digests_match(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}
