/// Refresh token generation
///
/// Refresh tokens are 64 alphanumeric characters drawn from the thread-local
/// CSPRNG (about 381 bits of entropy). Clients hold the plaintext; stores
/// only ever see the SHA-256 fingerprint.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

const REFRESH_TOKEN_LENGTH: usize = 64;

pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Lowercase hex SHA-256 of the bearer string
pub fn fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token();

        assert_eq!(token.len(), REFRESH_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let tokens: std::collections::HashSet<_> =
            (0..100).map(|_| generate_refresh_token()).collect();
        assert_eq!(tokens.len(), 100);
    }

    #[test]
    fn test_fingerprint() {
        let token = generate_refresh_token();
        let hash = fingerprint(&token);

        assert_eq!(hash, fingerprint(&token));
        assert_ne!(hash, token);
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, fingerprint(&generate_refresh_token()));
    }
}
