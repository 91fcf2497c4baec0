use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use chrono::Duration;

use crate::auth::{PasswordHasher, TokenSigner};
use crate::error::{AppError, ValidationError};
use crate::logger::RequestLogger;
use crate::middleware::AccessGuard;
use crate::routes;
use crate::services::{CredentialService, UserService};
use crate::store::{RefreshTokenStore, UserStore};

/// Services shared by every worker
#[derive(Clone)]
pub struct AppContext {
    pub credentials: Arc<CredentialService>,
    pub users: Arc<UserService>,
    pub signer: Arc<dyn TokenSigner>,
}

impl AppContext {
    pub fn new(
        user_store: Arc<dyn UserStore>,
        token_store: Arc<dyn RefreshTokenStore>,
        hasher: Arc<dyn PasswordHasher>,
        signer: Arc<dyn TokenSigner>,
        refresh_token_ttl: Duration,
    ) -> Self {
        let credentials = CredentialService::new(
            user_store.clone(),
            token_store,
            hasher.clone(),
            signer.clone(),
            refresh_token_ttl,
        );
        let users = UserService::new(user_store, hasher);

        Self {
            credentials: Arc::new(credentials),
            users: Arc::new(users),
            signer,
        }
    }
}

pub fn run(listener: TcpListener, context: AppContext) -> Result<Server, std::io::Error> {
    let credentials = web::Data::from(context.credentials);
    let users = web::Data::from(context.users);
    let signer = context.signer;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(AccessGuard::new(signer.clone(), routes::access_policy()))
            .wrap(RequestLogger)
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                tracing::debug!(error = %err, "Rejected request body");
                AppError::from(ValidationError::InvalidFormat("request body")).into()
            }))
            .app_data(credentials.clone())
            .app_data(users.clone())
            .configure(routes::configure)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
