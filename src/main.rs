use std::net::TcpListener;
use std::sync::Arc;

use roleauth::auth::{BcryptHasher, JwtSigner};
use roleauth::bootstrap::ensure_admin_user;
use roleauth::configuration::get_configuration;
use roleauth::startup::{run, AppContext};
use roleauth::store::{PgRefreshTokenStore, PgUserStore};
use roleauth::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::PgPoolOptions;

fn startup_error(kind: std::io::ErrorKind, message: &str) -> std::io::Error {
    std::io::Error::new(kind, message.to_string())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_subscriber(get_subscriber("info", std::io::stdout))
        .map_err(|e| startup_error(std::io::ErrorKind::Other, &e.to_string()))?;

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(startup_error(std::io::ErrorKind::InvalidInput, "Configuration error"));
        }
    };
    if let Err(e) = configuration.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return Err(startup_error(std::io::ErrorKind::InvalidInput, "Configuration error"));
    }
    tracing::info!("Configuration loaded successfully");

    let pool = PgPoolOptions::new()
        .max_connections(configuration.database.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            startup_error(std::io::ErrorKind::ConnectionRefused, "Database connection error")
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {}", e);
        startup_error(std::io::ErrorKind::Other, "Database migration error")
    })?;
    tracing::info!("Database ready");

    let user_store = Arc::new(PgUserStore::new(pool.clone()));
    let token_store = Arc::new(PgRefreshTokenStore::new(pool));
    let hasher = Arc::new(
        BcryptHasher::new(configuration.password.bcrypt_cost)
            .map_err(|e| startup_error(std::io::ErrorKind::InvalidInput, &e.to_string()))?,
    );
    let signer = Arc::new(JwtSigner::new(&configuration.jwt));

    ensure_admin_user(user_store.as_ref(), hasher.as_ref(), &configuration.admin)
        .await
        .map_err(|e| {
            tracing::error!("Failed to seed admin user: {}", e);
            startup_error(std::io::ErrorKind::Other, "Admin bootstrap error")
        })?;

    let context = AppContext::new(
        user_store,
        token_store,
        hasher,
        signer,
        configuration.jwt.refresh_token_ttl(),
    );

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, context)?.await
}
