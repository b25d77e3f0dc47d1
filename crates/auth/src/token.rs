//! Opaque session token generation.

use rand::RngCore;
use rand::rngs::OsRng;

/// Raw entropy per token: 48 bytes (384 bits), hex-encoded to 96 characters.
pub const SESSION_TOKEN_BYTES: usize = 48;

/// Generates a fresh session token from the OS CSPRNG.
///
/// The value is a bearer credential. Treat it like a password: never log it.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_ninety_six_lowercase_hex_chars() {
        let token = generate_session_token();
        assert_eq!(token.len(), SESSION_TOKEN_BYTES * 2);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn consecutive_tokens_differ() {
        // With 384 bits of entropy a collision here means the RNG is broken.
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
    }
}
