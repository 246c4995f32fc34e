//! Credential handling for PINs
//!
//! PINs never leave this module in plain text: they are hashed with
//! Argon2id into a PHC string and only the hash is kept in client state.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::validation;

/// Argon2id hash of a 4-digit PIN, in PHC string format
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinHash(String);

impl PinHash {
    /// Validate and hash a PIN
    pub fn create(pin: &str) -> Result<Self> {
        validation::validate_pin(pin)?;

        let salt_bytes: [u8; 16] = rand::thread_rng().gen();
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| Error::Credential(format!("Failed to encode salt: {}", e)))?;

        let hash = Argon2::default()
            .hash_password(pin.as_bytes(), &salt)
            .map_err(|e| Error::Credential(format!("Failed to hash PIN: {}", e)))?
            .to_string();

        Ok(Self(hash))
    }

    /// Check a candidate PIN against the stored hash
    pub fn verify(&self, pin: &str) -> Result<bool> {
        let parsed = PasswordHash::new(&self.0)
            .map_err(|e| Error::Credential(format!("Stored PIN hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(pin.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PinHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PinHash(<redacted>)")
    }
}
