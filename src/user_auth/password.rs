//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`) so the
//! salt and work factor travel with the hash and verification needs no
//! external state.

use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};

use super::error::AuthError;
use crate::config::PasswordConfig;

/// Plaintext behind the dummy hash used for unknown identities
const DUMMY_PASSWORD: &str = "phone-sso-timing-equalizer";

pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of `DUMMY_PASSWORD` under the configured parameters
    dummy_hash: String,
}

impl PasswordHasher {
    /// Build the hasher and its dummy hash, so the first unknown-identity
    /// login costs the same as every later one.
    pub fn new(config: &PasswordConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::Internal(format!("invalid argon2 parameters: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, DUMMY_PASSWORD)?;
        Ok(Self { argon2, dummy_hash })
    }

    /// Hash with a fresh random salt.
    ///
    /// Only fails if the OS entropy source or the parameters are broken.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        hash_with(&self.argon2, plaintext)
    }

    /// Constant-time check of `plaintext` against a stored PHC hash.
    ///
    /// Unparseable hashes yield `false`.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run a full verification against a fixed hash and discard the result.
    ///
    /// Login calls this when the identity is unknown so that a lookup miss
    /// costs about as much as a password mismatch.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.dummy_hash);
    }
}

fn hash_with(argon2: &Argon2<'_>, plaintext: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))
}
