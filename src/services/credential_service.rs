/// Credential lifecycle: registration, login and refresh-token rotation.
///
/// Every successful workflow leaves exactly one refresh token record for the
/// user. Refresh rotates the presented token with an atomic compare-and-set,
/// so when two requests race on the same token only one of them gets a new
/// pair and the other sees `RefreshTokenNotFound`.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::auth::{fingerprint, generate_refresh_token, PasswordHasher, TokenSigner};
use crate::domain::{AuthResult, LoginRequest, RefreshToken, RegisterRequest, Role, User};
use crate::error::{AppError, AuthError, ErrorContext};
use crate::store::{RefreshTokenStore, StoreError, UserStore};
use crate::validators::{validate_name, validate_password, validate_username};

pub struct CredentialService {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    hasher: Arc<dyn PasswordHasher>,
    signer: Arc<dyn TokenSigner>,
    refresh_token_ttl: Duration,
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        hasher: Arc<dyn PasswordHasher>,
        signer: Arc<dyn TokenSigner>,
        refresh_token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            hasher,
            signer,
            refresh_token_ttl,
        }
    }

    /// Create a USER account and hand out its first token pair.
    ///
    /// # Errors
    /// - `ValidationError` for blank or malformed fields
    /// - `UsernameTaken` if the username exists, including when a concurrent
    ///   registration wins between the pre-check and the insert
    #[tracing::instrument(name = "register", skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResult, AppError> {
        let username = validate_username(&request.username)?;
        let first_name = validate_name("firstName", &request.first_name)?;
        let last_name = validate_name("lastName", &request.last_name)?;
        validate_password(&request.password)?;

        if self.users.exists_by_username(&username).await? {
            return Err(AuthError::UsernameTaken.into());
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(username, first_name, last_name, password_hash, Role::User);
        let user = self.users.save(&user).await.map_err(|e| match e {
            StoreError::UniqueViolation(_) => AppError::Auth(AuthError::UsernameTaken),
            other => other.into(),
        })?;

        let refresh_token = self.issue_or_rotate_refresh_token(&user).await?;
        let result = self.auth_result(&user, refresh_token)?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(result)
    }

    /// Authenticate by username and password.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// `InvalidCredentials`.
    #[tracing::instrument(name = "login", skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResult, AppError> {
        let user = match self.users.find_by_username(request.username.trim()).await? {
            Some(user) => user,
            None => {
                self.hasher.verify_decoy(&request.password);
                tracing::debug!(reason = "unknown_username", "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.hasher.verify(&request.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, reason = "password_mismatch", "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.refresh_tokens.delete_by_user_id(user.id).await?;
        let refresh_token = self.issue_or_rotate_refresh_token(&user).await?;
        let result = self.auth_result(&user, refresh_token)?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(result)
    }

    /// Exchange a refresh token for a new pair. The presented token is dead
    /// once this returns successfully.
    ///
    /// # Errors
    /// - `RefreshTokenNotFound` if the token is unknown or was rotated by a
    ///   concurrent request
    /// - `RefreshTokenExpired` if it expired; the record is removed
    #[tracing::instrument(name = "refresh", skip_all)]
    pub async fn refresh(&self, presented: &str) -> Result<AuthResult, AppError> {
        let context = ErrorContext::new("token_refresh");
        if presented.trim().is_empty() {
            return Err(AuthError::RefreshTokenNotFound.into());
        }

        let current_hash = fingerprint(presented);
        let record = self
            .refresh_tokens
            .find_by_token(&current_hash)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)?;
        let context = context.with_user_id(record.user_id);

        if record.is_expired() {
            self.refresh_tokens.delete(&record).await?;
            tracing::info!(user_id = %record.user_id, "Expired refresh token removed");
            return Err(AuthError::RefreshTokenExpired.into());
        }

        // Role is read from the user record, never from the token.
        let user = match self.users.find_by_id(record.user_id).await? {
            Some(user) => user,
            None => {
                let err = AppError::Internal("refresh token owner does not exist".to_string());
                context.log_error(&err);
                return Err(err);
            }
        };

        let new_token = generate_refresh_token();
        let rotated = self
            .refresh_tokens
            .rotate(&current_hash, &fingerprint(&new_token), Utc::now() + self.refresh_token_ttl)
            .await?;
        if rotated.is_none() {
            let err = AppError::Auth(AuthError::RefreshTokenNotFound);
            context.log_error(&err);
            return Err(err);
        }

        let result = self.auth_result(&user, new_token)?;

        tracing::info!(user_id = %user.id, "Refresh token rotated");
        Ok(result)
    }

    /// Give `user` a fresh refresh token, overwriting the existing record in
    /// place when there is one. Returns the plaintext for the client.
    async fn issue_or_rotate_refresh_token(&self, user: &User) -> Result<String, AppError> {
        let token = generate_refresh_token();
        let token_hash = fingerprint(&token);

        let record = match self.refresh_tokens.find_by_user_id(user.id).await? {
            Some(mut existing) => {
                existing.rotate(token_hash, self.refresh_token_ttl);
                existing
            }
            None => RefreshToken::new(user.id, token_hash, self.refresh_token_ttl),
        };
        self.refresh_tokens.save(&record).await?;

        Ok(token)
    }

    fn auth_result(&self, user: &User, refresh_token: String) -> Result<AuthResult, AppError> {
        let access = self.signer.sign(user.id, &user.username, user.role)?;
        Ok(AuthResult::bearer(access.token, refresh_token, access.expires_in))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BcryptHasher, JwtSigner};
    use crate::configuration::JwtSettings;
    use crate::store::{InMemoryRefreshTokenStore, InMemoryUserStore};

    struct Fixture {
        service: CredentialService,
        users: Arc<InMemoryUserStore>,
        tokens: Arc<InMemoryRefreshTokenStore>,
        signer: Arc<JwtSigner>,
    }

    fn fixture_with_ttl(refresh_ttl: Duration) -> Fixture {
        let users = Arc::new(InMemoryUserStore::new());
        let tokens = Arc::new(InMemoryRefreshTokenStore::new());
        let signer = Arc::new(JwtSigner::new(&JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: refresh_ttl.num_seconds(),
            issuer: "test".to_string(),
        }));
        let hasher = Arc::new(BcryptHasher::new(BcryptHasher::MIN_COST).unwrap());

        let service = CredentialService::new(
            users.clone(),
            tokens.clone(),
            hasher,
            signer.clone(),
            refresh_ttl,
        );

        Fixture {
            service,
            users,
            tokens,
            signer,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_ttl(Duration::days(7))
    }

    fn registration(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            password: password.to_string(),
        }
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    async fn token_record_for(f: &Fixture, username: &str) -> Option<RefreshToken> {
        let user = f.users.find_by_username(username).await.unwrap().unwrap();
        f.tokens.find_by_user_id(user.id).await.unwrap()
    }

    #[tokio::test]
    async fn register_returns_bearer_pair_for_a_user_role() {
        let f = fixture();

        let result = f.service.register(&registration("alice", "pw123")).await.unwrap();

        assert_eq!(result.token_type, "Bearer");
        assert_eq!(result.expires_in, 900);
        let claims = f.signer.verify(&result.access_token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, Role::User);

        let user = f.users.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(claims.uid, user.id);
        assert_ne!(user.password_hash, "pw123");
        let record = f.tokens.find_by_user_id(user.id).await.unwrap().unwrap();
        assert_eq!(record.token_hash, fingerprint(&result.refresh_token));
    }

    #[tokio::test]
    async fn register_twice_fails_with_username_taken() {
        let f = fixture();
        f.service.register(&registration("alice", "pw123")).await.unwrap();

        let err = f.service.register(&registration("alice", "other")).await.unwrap_err();

        assert_eq!(err.auth_kind(), Some(AuthError::UsernameTaken));
        assert_eq!(f.users.len().await, 1);
    }

    #[tokio::test]
    async fn register_rejects_blank_fields() {
        let f = fixture();

        let mut req = registration("  ", "pw123");
        assert!(matches!(f.service.register(&req).await, Err(AppError::Validation(_))));

        req = registration("alice", "");
        assert!(matches!(f.service.register(&req).await, Err(AppError::Validation(_))));

        req = registration("alice", "pw123");
        req.first_name = String::new();
        assert!(matches!(f.service.register(&req).await, Err(AppError::Validation(_))));

        assert!(f.users.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_registration_of_same_username_yields_one_user() {
        let f = fixture();
        let req = registration("alice", "pw123");

        let (a, b) = tokio::join!(f.service.register(&req), f.service.register(&req));

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let err = a.err().or(b.err()).unwrap();
        assert_eq!(err.auth_kind(), Some(AuthError::UsernameTaken));
        assert_eq!(f.users.len().await, 1);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let f = fixture();
        f.service.register(&registration("alice", "pw123")).await.unwrap();

        let wrong_password = f.service.login(&login("alice", "nope")).await.unwrap_err();
        let unknown_user = f.service.login(&login("mallory", "pw123")).await.unwrap_err();

        assert_eq!(wrong_password.auth_kind(), Some(AuthError::InvalidCredentials));
        assert_eq!(unknown_user.auth_kind(), Some(AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn login_replaces_the_refresh_token() {
        let f = fixture();
        let registered = f.service.register(&registration("alice", "pw123")).await.unwrap();

        let logged_in = f.service.login(&login("alice", "pw123")).await.unwrap();

        assert_ne!(logged_in.refresh_token, registered.refresh_token);
        assert_eq!(f.tokens.len().await, 1);
        let record = token_record_for(&f, "alice").await.unwrap();
        assert_eq!(record.token_hash, fingerprint(&logged_in.refresh_token));

        let stale = f.service.refresh(&registered.refresh_token).await.unwrap_err();
        assert_eq!(stale.auth_kind(), Some(AuthError::RefreshTokenNotFound));
    }

    #[tokio::test]
    async fn refresh_rotation_scenario() {
        let f = fixture();
        let a1 = f.service.register(&registration("alice", "pw123")).await.unwrap();

        let a2 = f.service.refresh(&a1.refresh_token).await.unwrap();
        assert_ne!(a2.refresh_token, a1.refresh_token);

        let replay = f.service.refresh(&a1.refresh_token).await.unwrap_err();
        assert_eq!(replay.auth_kind(), Some(AuthError::RefreshTokenNotFound));

        let a3 = f.service.refresh(&a2.refresh_token).await.unwrap();
        assert_ne!(a3.refresh_token, a2.refresh_token);
        assert_eq!(f.tokens.len().await, 1);
    }

    #[tokio::test]
    async fn refresh_keeps_the_record_identity() {
        let f = fixture();
        let a1 = f.service.register(&registration("alice", "pw123")).await.unwrap();
        let before = token_record_for(&f, "alice").await.unwrap();

        f.service.refresh(&a1.refresh_token).await.unwrap();

        let after = token_record_for(&f, "alice").await.unwrap();
        assert_eq!(after.id, before.id);
        assert_ne!(after.token_hash, before.token_hash);
    }

    #[tokio::test]
    async fn refresh_unknown_or_blank_token_is_not_found() {
        let f = fixture();

        for presented in ["", "   ", "definitely-not-a-token"] {
            let err = f.service.refresh(presented).await.unwrap_err();
            assert_eq!(err.auth_kind(), Some(AuthError::RefreshTokenNotFound));
        }
    }

    #[tokio::test]
    async fn expired_refresh_token_is_rejected_and_removed() {
        // a zero TTL token is expired as soon as it is issued
        let f = fixture_with_ttl(Duration::zero());
        let a1 = f.service.register(&registration("alice", "pw123")).await.unwrap();

        let err = f.service.refresh(&a1.refresh_token).await.unwrap_err();

        assert_eq!(err.auth_kind(), Some(AuthError::RefreshTokenExpired));
        assert!(f.tokens.find_by_token(&fingerprint(&a1.refresh_token)).await.unwrap().is_none());

        let again = f.service.refresh(&a1.refresh_token).await.unwrap_err();
        assert_eq!(again.auth_kind(), Some(AuthError::RefreshTokenNotFound));
    }

    #[tokio::test]
    async fn expired_record_inserted_directly_is_rejected() {
        let f = fixture();
        f.service.register(&registration("alice", "pw123")).await.unwrap();
        let user = f.users.find_by_username("alice").await.unwrap().unwrap();

        let stale = "stale-token-value";
        f.tokens
            .save(&RefreshToken::new(user.id, fingerprint(stale), Duration::minutes(-1)))
            .await
            .unwrap();

        let err = f.service.refresh(stale).await.unwrap_err();
        assert_eq!(err.auth_kind(), Some(AuthError::RefreshTokenExpired));
        assert!(f.tokens.is_empty().await);

        // login issues a brand new record
        f.service.login(&login("alice", "pw123")).await.unwrap();
        assert_eq!(f.tokens.len().await, 1);
    }

    #[tokio::test]
    async fn refresh_picks_up_role_changes() {
        let f = fixture();
        let a1 = f.service.register(&registration("alice", "pw123")).await.unwrap();

        let mut user = f.users.find_by_username("alice").await.unwrap().unwrap();
        user.role = Role::Admin;
        f.users.save(&user).await.unwrap();

        let a2 = f.service.refresh(&a1.refresh_token).await.unwrap();
        assert_eq!(f.signer.verify(&a2.access_token).unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn concurrent_refresh_has_exactly_one_winner() {
        let f = fixture();
        let a1 = f.service.register(&registration("alice", "pw123")).await.unwrap();

        let (first, second) = tokio::join!(
            f.service.refresh(&a1.refresh_token),
            f.service.refresh(&a1.refresh_token)
        );

        let (winner, loser) = match (first, second) {
            (Ok(w), Err(l)) | (Err(l), Ok(w)) => (w, l),
            (a, b) => panic!("expected one winner, got {:?} and {:?}", a.is_ok(), b.is_ok()),
        };
        assert_eq!(loser.auth_kind(), Some(AuthError::RefreshTokenNotFound));
        assert_eq!(f.tokens.len().await, 1);
        let record = token_record_for(&f, "alice").await.unwrap();
        assert_eq!(record.token_hash, fingerprint(&winner.refresh_token));
    }

    #[tokio::test]
    async fn many_concurrent_refreshes_still_leave_one_record() {
        let f = Arc::new(fixture());
        let a1 = f.service.register(&registration("alice", "pw123")).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let f = f.clone();
                let token = a1.refresh_token.clone();
                tokio::spawn(async move { f.service.refresh(&token).await })
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            if let Ok(result) = handle.await.unwrap() {
                winners.push(result);
            }
        }

        assert_eq!(winners.len(), 1);
        let record = token_record_for(&f, "alice").await.unwrap();
        assert_eq!(record.token_hash, fingerprint(&winners[0].refresh_token));
        assert_eq!(f.tokens.len().await, 1);
    }
}
