use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Rotation credential. At most one record exists per user.
///
/// `token_hash` is the SHA-256 digest of the bearer string handed to the
/// client; the plaintext never reaches a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn new(user_id: Uuid, token_hash: String, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at: Utc::now() + ttl,
        }
    }

    /// A token whose expiry equals `now` is already dead.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Replace the token value and push the expiry out by `ttl`.
    pub fn rotate(&mut self, token_hash: String, ttl: Duration) {
        self.token_hash = token_hash;
        self.expires_at = Utc::now() + ttl;
    }
}
