mod credential_service;
mod user_service;

pub use credential_service::CredentialService;
pub use user_service::UserService;
