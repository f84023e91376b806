//! One-time response token generation.
//!
//! A response token is a bearer capability: whoever holds the emailed link
//! may drive one lifecycle transition. Tokens come from the thread-local
//! CSPRNG and are hex-encoded so they embed in URL paths without escaping.

use std::fmt::Write;

use rand::RngCore;

/// Random bytes per token (256 bits of entropy).
pub const RESPONSE_TOKEN_BYTES: usize = 32;

/// Length of the hex-encoded token string.
pub const RESPONSE_TOKEN_LENGTH: usize = RESPONSE_TOKEN_BYTES * 2;

/// Generate a fresh response token.
pub fn generate_response_token() -> String {
    let mut bytes = [0u8; RESPONSE_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

/// Whether `token` has the shape of a generated token (64 lowercase hex chars).
///
/// Used to short-circuit lookups for obviously forged values.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == RESPONSE_TOKEN_LENGTH
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn token_is_64_lowercase_hex_chars() {
        let token = generate_response_token();
        assert_eq!(token.len(), RESPONSE_TOKEN_LENGTH);
        assert!(is_well_formed(&token));
    }

    #[test]
    fn large_sample_has_no_collisions() {
        let sample: HashSet<String> = (0..20_000).map(|_| generate_response_token()).collect();
        assert_eq!(sample.len(), 20_000);
    }

    #[test]
    fn malformed_tokens_are_detected() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("not-a-token"));
        assert!(!is_well_formed(&"A".repeat(RESPONSE_TOKEN_LENGTH)));
        assert!(!is_well_formed(&"a".repeat(RESPONSE_TOKEN_LENGTH + 1)));
    }

    #[test]
    fn hex_encoding_is_zero_padded() {
        assert_eq!(hex_encode(&[0x00, 0x0f, 0xff]), "000fff");
    }
}
