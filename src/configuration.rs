use chrono::Duration;

use crate::auth::BcryptHasher;
use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub password: PasswordSettings,
    pub admin: AdminSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,   // seconds (e.g., 900 for 15 minutes)
    pub refresh_token_expiry: i64,  // seconds (e.g., 604800 for 7 days)
    pub issuer: String,
}

impl JwtSettings {
    pub const MIN_SECRET_LENGTH: usize = 32;

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_token_expiry)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct PasswordSettings {
    pub bcrypt_cost: u32,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Account seeded at startup when missing
#[derive(serde::Deserialize, Clone)]
pub struct AdminSettings {
    #[serde(default = "default_admin_username")]
    pub username: String,
    pub password: String,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl Settings {
    /// Reject values that would let the server start in an insecure or
    /// meaningless state.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < JwtSettings::MIN_SECRET_LENGTH {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                JwtSettings::MIN_SECRET_LENGTH
            )));
        }
        if self.jwt.access_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.access_token_expiry must be positive".to_string(),
            ));
        }
        if self.jwt.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.refresh_token_expiry must be positive".to_string(),
            ));
        }
        if !(BcryptHasher::MIN_COST..=BcryptHasher::MAX_COST).contains(&self.password.bcrypt_cost) {
            return Err(ConfigError::InvalidValue(format!(
                "password.bcrypt_cost must be between {} and {}",
                BcryptHasher::MIN_COST,
                BcryptHasher::MAX_COST
            )));
        }
        if self.admin.username.trim().is_empty() {
            return Err(ConfigError::MissingRequired("admin.username".to_string()));
        }
        if self.admin.password.trim().is_empty() {
            return Err(ConfigError::MissingRequired("admin.password".to_string()));
        }
        Ok(())
    }
}

/// Load `configuration.yaml` (optional) overlaid with `APP_`-prefixed
/// environment variables, e.g. `APP_JWT__SECRET`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
