/// One-shot startup seeding of the administrative account.
///
/// Called explicitly from `main` once the stores are ready. Running it any
/// number of times leaves exactly one account with the configured username.

use crate::auth::PasswordHasher;
use crate::configuration::AdminSettings;
use crate::domain::{Role, User};
use crate::error::{AppError, ConfigError};
use crate::store::{StoreError, UserStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    AlreadyPresent,
}

pub async fn ensure_admin_user(
    users: &dyn UserStore,
    hasher: &dyn PasswordHasher,
    settings: &AdminSettings,
) -> Result<BootstrapOutcome, AppError> {
    let username = settings.username.trim();
    if username.is_empty() {
        return Err(ConfigError::MissingRequired("admin.username".to_string()).into());
    }
    if settings.password.trim().is_empty() {
        return Err(ConfigError::MissingRequired("admin.password".to_string()).into());
    }

    if users.exists_by_username(username).await? {
        tracing::info!(username = %username, "Admin user already exists, skipping creation");
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let admin = User::new(
        username.to_string(),
        "Initial".to_string(),
        "Admin".to_string(),
        hasher.hash(&settings.password)?,
        Role::Admin,
    );

    match users.save(&admin).await {
        Ok(admin) => {
            tracing::info!(user_id = %admin.id, username = %admin.username, "Initial admin user created");
            Ok(BootstrapOutcome::Created)
        }
        // another instance seeded it between the check and the insert
        Err(StoreError::UniqueViolation(_)) => Ok(BootstrapOutcome::AlreadyPresent),
        Err(e) => Err(e.into()),
    }
}
