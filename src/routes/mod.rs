/// HTTP routes and the access policy that guards them.

mod admin;
mod auth;
mod health_check;
mod users;

use actix_web::web;

use crate::domain::Role;
use crate::middleware::{AccessPolicy, Requirement};

pub use admin::{list_users, update_user_role};
pub use auth::{login, refresh, register};
pub use health_check::health_check;
pub use users::{get_user, update_user};

/// Register every route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health_check", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(register))
                        .route("/login", web::post().to(login))
                        .route("/refresh-token", web::post().to(refresh)),
                )
                .service(
                    web::scope("/users")
                        .route("/{id}", web::get().to(get_user))
                        .route("/{id}", web::put().to(update_user)),
                )
                .service(
                    web::scope("/admin")
                        .route("/users", web::get().to(list_users))
                        .route("/users/{id}/role", web::put().to(update_user_role)),
                ),
        );
}

/// Requirements per route prefix. Anything not listed needs a valid token.
pub fn access_policy() -> AccessPolicy {
    AccessPolicy::new(Requirement::Authenticated)
        .rule("/health_check", Requirement::Public)
        .rule("/api/v1/auth", Requirement::Public)
        .rule("/api/v1/users", Requirement::Authenticated)
        .rule("/api/v1/admin", Requirement::Role(Role::Admin))
}
