use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RefreshTokenStore, StoreError, UserStore};
use crate::domain::{RefreshToken, User};

/// Process-local user store. Username uniqueness is enforced under the write
/// lock, mirroring the UNIQUE constraint of the `users` table.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.username == username))
    }

    async fn save(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == user.username && u.id != user.id) {
            return Err(StoreError::UniqueViolation(format!(
                "username {:?} already exists",
                user.username
            )));
        }

        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                // created_at is fixed at first insert
                let created_at = existing.created_at;
                *existing = user.clone();
                existing.created_at = created_at;
                Ok(existing.clone())
            }
            None => {
                users.push(user.clone());
                Ok(user.clone())
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let mut users = self.users.read().await.clone();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }
}

/// Process-local refresh token store, keyed by owner so that a second record
/// for the same user cannot exist.
#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: RwLock<HashMap<Uuid, RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn find_by_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<RefreshToken>, StoreError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(&user_id).cloned())
    }

    async fn save(&self, token: &RefreshToken) -> Result<RefreshToken, StoreError> {
        let mut tokens = self.tokens.write().await;

        if tokens
            .values()
            .any(|t| t.token_hash == token.token_hash && t.user_id != token.user_id)
        {
            return Err(StoreError::UniqueViolation("token_hash already exists".to_string()));
        }

        let stored = tokens
            .entry(token.user_id)
            .and_modify(|existing| {
                existing.token_hash = token.token_hash.clone();
                existing.expires_at = token.expires_at;
            })
            .or_insert_with(|| token.clone());

        Ok(stored.clone())
    }

    async fn rotate(
        &self,
        current_hash: &str,
        new_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<RefreshToken>, StoreError> {
        let mut tokens = self.tokens.write().await;

        let Some(token) = tokens.values_mut().find(|t| t.token_hash == current_hash) else {
            return Ok(None);
        };
        token.token_hash = new_hash.to_string();
        token.expires_at = expires_at;

        Ok(Some(token.clone()))
    }

    async fn delete(&self, token: &RefreshToken) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write().await;

        let matches = tokens
            .get(&token.user_id)
            .map(|t| t.id == token.id && t.token_hash == token.token_hash)
            .unwrap_or(false);
        if matches {
            tokens.remove(&token.user_id);
        }

        Ok(())
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.tokens.write().await.remove(&user_id);
        Ok(())
    }
}
