use sha2::{Digest, Sha256};

/// SHA-256 of `token`, hex-encoded.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compares a presented admin token against the configured secret without
/// leaking the match position through timing. Hashing both sides first also
/// keeps a length mismatch from short-circuiting the comparison.
pub fn admin_token_matches(presented: &str, configured: &str) -> bool {
    constant_time_eq(
        hash_token(presented).as_bytes(),
        hash_token(configured).as_bytes(),
    )
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_token_produces_hex_sha256() {
        let hash = hash_token("test");
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn matching_tokens_compare_equal() {
        assert!(admin_token_matches("secret-token", "secret-token"));
    }

    #[test]
    fn mismatched_tokens_compare_unequal() {
        assert!(!admin_token_matches("secret-token", "other-token"));
        assert!(!admin_token_matches("", "other-token"));
        assert!(!admin_token_matches("secret", "secret "));
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }
}
