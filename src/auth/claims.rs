/// JWT Claims structure
///
/// Payload of an access token: the username as subject, the user id, the
/// role the user held when the token was minted, and the standard RFC 7519
/// timestamps. Ownership checks use `uid`; usernames can change hands.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Role;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// User id
    pub uid: Uuid,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create new claims expiring `expiry_seconds` from now
    pub fn new(
        user_id: Uuid,
        subject: String,
        role: Role,
        expiry_seconds: i64,
        issuer: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: subject,
            uid: user_id,
            role,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    pub fn username(&self) -> &str {
        &self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the token was issued to the user with `user_id`.
    pub fn is_subject(&self, user_id: Uuid) -> bool {
        self.uid == user_id
    }
}
