/// Persistence contracts for users and refresh tokens.
///
/// Both contracts are object safe so that services hold them as
/// `Arc<dyn ...>`; `postgres` backs them with sqlx, `memory` with in-process
/// maps that keep the same semantics.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{RefreshToken, User};

pub use memory::{InMemoryRefreshTokenStore, InMemoryUserStore};
pub use postgres::{PgRefreshTokenStore, PgUserStore};

/// Persistence faults. Only `UniqueViolation` is ever anticipated by callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate entry: {0}")]
    UniqueViolation(String),
    #[error("Database unavailable: {0}")]
    Unavailable(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    StoreError::UniqueViolation(db_err.message().to_string())
                } else {
                    StoreError::Database(db_err.message().to_string())
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Corrupt(err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Pre-check only. A concurrent insert can still win; `save` reports that
    /// as `StoreError::UniqueViolation`.
    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError>;

    /// Insert, or update in place when a record with `user.id` exists.
    async fn save(&self, user: &User) -> Result<User, StoreError>;

    /// Ordered by creation time, then id.
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn find_by_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError>;

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<RefreshToken>, StoreError>;

    /// Upsert. A record that already exists for the same user is overwritten in
    /// place and keeps its id, so a user never has two rows.
    async fn save(&self, token: &RefreshToken) -> Result<RefreshToken, StoreError>;

    /// Atomic compare-and-set: replace the token value and expiry only if the
    /// record still holds `current_hash`. `None` means another rotation (or a
    /// delete) got there first.
    async fn rotate(
        &self,
        current_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<RefreshToken>, StoreError>;

    /// Remove the record if it still holds the same token value.
    async fn delete(&self, token: &RefreshToken) -> Result<(), StoreError>;

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), StoreError>;
}
