//! Adaptive password hashing policy.
//!
//! Hashes are scrypt PHC strings: the algorithm, the work-factor parameters
//! and the salt all travel inside the stored value, so verification works no
//! matter which environment produced the hash.

use scrypt::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use scrypt::{Params, Scrypt};
use thiserror::Error;

use doorkeep_core::Environment;

/// Interactive-login work factor for production (N = 2^14).
const PRODUCTION_LOG_N: u8 = 14;
/// Minimal work factor so development and test suites stay fast.
const FAST_LOG_N: u8 = 4;

const BLOCK_SIZE: u32 = 8;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum PasswordError {
    /// The stored value is not a well-formed PHC hash.
    #[error("malformed stored password hash")]
    Malformed(#[source] scrypt::password_hash::Error),

    /// Hashing itself failed.
    #[error("password hashing failed")]
    Hashing(#[source] scrypt::password_hash::Error),

    /// The configured work-factor parameters are out of range.
    #[error("invalid scrypt parameters")]
    Params(#[source] scrypt::errors::InvalidParams),
}

/// Environment-selected hashing policy.
///
/// The work factor is fixed at construction and only affects `hash`;
/// `compare` reads every parameter out of the stored hash itself.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    log_n: u8,
}

impl PasswordPolicy {
    pub fn for_environment(environment: Environment) -> Self {
        let log_n = if environment.is_production() {
            PRODUCTION_LOG_N
        } else {
            FAST_LOG_N
        };
        Self { log_n }
    }

    pub fn log_n(&self) -> u8 {
        self.log_n
    }

    fn params(&self) -> Result<Params, PasswordError> {
        Params::new(self.log_n, BLOCK_SIZE, PARALLELISM, OUTPUT_LEN).map_err(PasswordError::Params)
    }

    /// Hashes a plaintext with a fresh random salt. Two calls with the same
    /// input produce different strings.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plaintext.as_bytes(), None, None, self.params()?, &salt)
            .map_err(PasswordError::Hashing)?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext against a stored hash. A mismatch is `Ok(false)`;
    /// only a hash we cannot parse is an error.
    pub fn compare(&self, plaintext: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(stored_hash).map_err(PasswordError::Malformed)?;
        match Scrypt.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(scrypt::password_hash::Error::Password) => Ok(false),
            Err(other) => Err(PasswordError::Malformed(other)),
        }
    }
}
