//! Password hashing and random-identifier utilities
//!
//! Credential verification goes through a salted, irreversible hash with a
//! constant-time comparison inside the hashing backend; raw equality against
//! a stored password is not available anywhere in this crate.

use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::config::PasswordConfig;
use crate::{AuthError, AuthResult};

#[cfg(feature = "argon2")]
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

#[cfg(feature = "bcrypt")]
use bcrypt::{hash, verify};

/// Password hasher seam for different hashing algorithms
pub trait PasswordHasher: Send + Sync {
    /// Hash a password
    fn hash_password(&self, password: &str) -> AuthResult<String>;

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool>;

    /// Get the hasher name
    fn hasher_name(&self) -> &str;
}

/// Argon2id password hasher
#[cfg(feature = "argon2")]
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

#[cfg(feature = "argon2")]
impl Argon2Hasher {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Low-cost parameters for tests and local development
    pub fn development() -> Self {
        Self::new(4096, 2, 2)
    }

    fn instance(&self) -> AuthResult<Argon2<'static>> {
        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
                .map_err(|e| AuthError::crypto_error(e.to_string()))?,
        ))
    }
}

#[cfg(feature = "argon2")]
impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(65536, 3, 4)
    }
}

#[cfg(feature = "argon2")]
impl PasswordHasher for Argon2Hasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut thread_rng());
        let password_hash = self
            .instance()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::crypto_error(e.to_string()))?;
        Ok(password_hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::crypto_error(e.to_string()))?;
        match self
            .instance()?
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    fn hasher_name(&self) -> &str {
        "argon2"
    }
}

/// bcrypt password hasher
#[cfg(feature = "bcrypt")]
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

#[cfg(feature = "bcrypt")]
impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Low-cost parameters for tests and local development
    pub fn development() -> Self {
        Self::new(4)
    }
}

#[cfg(feature = "bcrypt")]
impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[cfg(feature = "bcrypt")]
impl PasswordHasher for BcryptHasher {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        hash(password, self.cost).map_err(AuthError::from)
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        verify(password, hash).map_err(AuthError::from)
    }

    fn hasher_name(&self) -> &str {
        "bcrypt"
    }
}

/// Build the configured hasher.
///
/// Fails with a configuration error when the named algorithm's cargo
/// feature is not enabled.
pub fn hasher_from_config(config: &PasswordConfig) -> AuthResult<Box<dyn PasswordHasher>> {
    match config.algorithm.as_str() {
        #[cfg(feature = "argon2")]
        "argon2" => Ok(Box::new(Argon2Hasher::new(
            config.argon2_memory,
            config.argon2_iterations,
            config.argon2_parallelism,
        ))),
        #[cfg(feature = "bcrypt")]
        "bcrypt" => Ok(Box::new(BcryptHasher::new(config.bcrypt_cost))),
        other => Err(AuthError::config_error(format!(
            "Unknown password hashing algorithm: {} (or feature not enabled)",
            other
        ))),
    }
}

/// Generate a random string of specified length using alphanumeric characters
pub fn generate_random_string(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generate an unpredictable session identifier
pub fn generate_session_id() -> String {
    generate_random_string(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "argon2")]
    #[test]
    fn test_argon2_hasher_round_trip() {
        let hasher = Argon2Hasher::development();
        let password = "test_password_123";

        let hash = hasher.hash_password(password).unwrap();
        assert!(!hash.is_empty());
        assert_ne!(hash, password);

        assert!(hasher.verify_password(password, &hash).unwrap());
        assert!(!hasher.verify_password("wrong_password", &hash).unwrap());
    }

    #[cfg(feature = "argon2")]
    #[test]
    fn test_argon2_hashes_are_salted() {
        let hasher = Argon2Hasher::development();
        let first = hasher.hash_password("same_password").unwrap();
        let second = hasher.hash_password("same_password").unwrap();
        assert_ne!(first, second);
    }

    #[cfg(feature = "bcrypt")]
    #[test]
    fn test_bcrypt_hasher_round_trip() {
        let hasher = BcryptHasher::development();
        let password = "test_password_123";

        let hash = hasher.hash_password(password).unwrap();
        assert!(hasher.verify_password(password, &hash).unwrap());
        assert!(!hasher.verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_hasher_from_config() {
        let config = PasswordConfig::default();
        let hasher = hasher_from_config(&config).unwrap();
        assert_eq!(hasher.hasher_name(), "argon2");

        let mut config = PasswordConfig::default();
        config.algorithm = "scrypt".to_string();
        assert!(hasher_from_config(&config).is_err());
    }

    #[test]
    fn test_random_generation() {
        let first = generate_random_string(16);
        let second = generate_random_string(16);

        assert_eq!(first.len(), 16);
        assert_eq!(second.len(), 16);
        assert_ne!(first, second);

        let session_id = generate_session_id();
        assert_eq!(session_id.len(), 32);
        assert!(session_id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
