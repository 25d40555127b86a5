//! Argon2id password hashing

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::config::Argon2Config;
use crate::error::{ServerError, ServerResult};

/// Hashes and verifies passwords as PHC strings
#[derive(Clone)]
pub struct Passwords {
    params: Params,
}

impl Passwords {
    pub fn new(config: &Argon2Config) -> anyhow::Result<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 parameters: {e}"))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> ServerResult<String> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| ServerError::Internal(format!("Salt encoding failed: {e}")))?;

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ServerError::Internal(format!("Password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// False for a wrong password and for an unparseable stored hash
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            tracing::warn!("stored password hash is not a PHC string");
            return false;
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run `hash` off the async runtime
    pub async fn hash_blocking(&self, password: String) -> ServerResult<String> {
        let passwords = self.clone();
        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| ServerError::Internal(format!("Hashing task failed: {e}")))?
    }

    /// Run `verify` off the async runtime
    pub async fn verify_blocking(&self, password: String, stored: String) -> ServerResult<bool> {
        let passwords = self.clone();
        tokio::task::spawn_blocking(move || passwords.verify(&password, &stored))
            .await
            .map_err(|e| ServerError::Internal(format!("Verification task failed: {e}")))
    }
}
