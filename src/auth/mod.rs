/// Authentication module
///
/// Access-token signing and verification, password hashing, and refresh
/// token generation. The traits are the contracts the credential workflows
/// depend on; the structs are the production implementations.

mod claims;
mod jwt;
mod password;
mod refresh_token;

pub use claims::Claims;
pub use jwt::{JwtSigner, SignedToken, TokenSigner};
pub use password::{BcryptHasher, PasswordHasher};
pub use refresh_token::{fingerprint, generate_refresh_token};
