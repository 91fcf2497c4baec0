/// User profile reads and updates, and admin role changes.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::PasswordHasher;
use crate::domain::{Role, UpdateUserRequest, User, UserResponse};
use crate::error::{AppError, AuthError};
use crate::store::{StoreError, UserStore};
use crate::validators::{validate_name, validate_password, validate_username};

pub struct UserService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

/// Absent and blank fields mean "leave unchanged".
fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    async fn load(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    pub async fn find_user(&self, id: Uuid) -> Result<User, AppError> {
        self.load(id).await
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<UserResponse, AppError> {
        Ok(UserResponse::from(&self.load(id).await?))
    }

    pub async fn find_all_users(&self) -> Result<Vec<UserResponse>, AppError> {
        Ok(self.users.list_all().await?.iter().map(UserResponse::from).collect())
    }

    #[tracing::instrument(name = "update_user", skip(self, request))]
    pub async fn update(&self, id: Uuid, request: &UpdateUserRequest) -> Result<UserResponse, AppError> {
        let mut user = self.load(id).await?;

        if let Some(username) = provided(&request.username) {
            let username = validate_username(username)?;
            if username != user.username && self.users.exists_by_username(&username).await? {
                return Err(AuthError::UsernameTaken.into());
            }
            user.username = username;
        }
        if let Some(password) = provided(&request.password) {
            validate_password(password)?;
            user.password_hash = self.hasher.hash(password)?;
        }
        if let Some(first_name) = provided(&request.first_name) {
            user.first_name = validate_name("firstName", first_name)?;
        }
        if let Some(last_name) = provided(&request.last_name) {
            user.last_name = validate_name("lastName", last_name)?;
        }

        let user = self.users.save(&user).await.map_err(|e| match e {
            StoreError::UniqueViolation(_) => AppError::Auth(AuthError::UsernameTaken),
            other => other.into(),
        })?;

        tracing::info!(user_id = %user.id, "User profile updated");
        Ok(UserResponse::from(&user))
    }

    #[tracing::instrument(name = "update_role", skip(self))]
    pub async fn update_role(&self, id: Uuid, role: Role) -> Result<UserResponse, AppError> {
        let mut user = self.load(id).await?;
        user.role = role;
        let user = self.users.save(&user).await?;

        tracing::info!(user_id = %user.id, role = %role, "User role updated");
        Ok(UserResponse::from(&user))
    }
}
