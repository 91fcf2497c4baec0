/// Password Hashing and Verification
///
/// `PasswordHasher` is the contract the credential workflows depend on;
/// `BcryptHasher` implements it with a configurable bcrypt cost.

use bcrypt::{hash, verify};

use crate::error::{AppError, ConfigError};

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, AppError>;

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, AppError>;

    /// Burn the cost of one verification without a real hash to compare to.
    /// Keeps the unknown-user path of login as slow as the wrong-password one.
    fn verify_decoy(&self, plain: &str);
}

pub struct BcryptHasher {
    cost: u32,
    decoy_hash: String,
}

impl BcryptHasher {
    pub const MIN_COST: u32 = 4;
    pub const MAX_COST: u32 = 31;

    /// # Errors
    /// Fails if `cost` is outside bcrypt's supported range.
    pub fn new(cost: u32) -> Result<Self, AppError> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(ConfigError::InvalidValue(format!(
                "bcrypt cost must be between {} and {}, got {}",
                Self::MIN_COST,
                Self::MAX_COST,
                cost
            ))
            .into());
        }

        let decoy_hash = hash("decoy-password-never-matches", cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(Self { cost, decoy_hash })
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<String, AppError> {
        hash(plain, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, AppError> {
        verify(plain, hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }

    fn verify_decoy(&self, plain: &str) {
        let _ = verify(plain, &self.decoy_hash);
    }
}
