/// JWT Token Generation and Validation
///
/// `TokenSigner` is the contract the credential workflows and the access
/// guard rely on; `JwtSigner` implements it with HS256 JWTs.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::domain::Role;
use crate::error::{AppError, AuthError};

/// A freshly minted access token and its lifetime in seconds
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub expires_in: i64,
}

pub trait TokenSigner: Send + Sync {
    /// Mint an access token for user `user_id`, named `subject`, carrying `role`.
    fn sign(&self, user_id: Uuid, subject: &str, role: Role) -> Result<SignedToken, AppError>;

    /// Check signature, issuer and expiry and return the claims.
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    expiry_seconds: i64,
}

impl JwtSigner {
    pub fn new(config: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            expiry_seconds: config.access_token_expiry,
        }
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

impl TokenSigner for JwtSigner {
    fn sign(&self, user_id: Uuid, subject: &str, role: Role) -> Result<SignedToken, AppError> {
        let claims = Claims::new(
            user_id,
            subject.to_string(),
            role,
            self.expiry_seconds,
            self.issuer.clone(),
        );

        Ok(SignedToken {
            token: self.encode_claims(&claims)?,
            expires_in: self.expiry_seconds,
        })
    }

    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "JWT validation failed");
                AuthError::TokenInvalid
            })
    }
}
