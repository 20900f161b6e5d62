//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...`), so the
//! parameters travel with the hash and can be raised later without
//! invalidating existing accounts.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory in KiB.
    pub memory_kib: u32,
    /// Time iterations.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MiB
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashParams {
    /// Cheap parameters for tests and local tooling.
    pub fn low_cost() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Hashes and verifies account passwords.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    params: HashParams,
}

impl PasswordHasher {
    pub fn new(params: HashParams) -> Self {
        Self { params }
    }

    fn argon2(&self) -> CryptoResult<Argon2<'static>> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            None,
        )
        .map_err(|e| CryptoError::Hashing(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> CryptoResult<String> {
        let mut salt_bytes = Zeroizing::new([0u8; 16]);
        rand::thread_rng().fill(&mut salt_bytes[..]);
        let salt = SaltString::encode_b64(&salt_bytes[..])
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;

        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CryptoError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored hash
    /// itself is unreadable.
    pub fn verify(&self, password: &str, stored_hash: &str) -> CryptoResult<bool> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|e| CryptoError::InvalidHash(e.to_string()))?;
        // Parameters come from the PHC string, not from `self.params`.
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
