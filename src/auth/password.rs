//! Argon2id password hashing in the standard PHC encoding:
//! `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

pub const MEMORY_KIB: u32 = 65_536;
pub const ITERATIONS: u32 = 3;
pub const PARALLELISM: u32 = 4;
pub const OUTPUT_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hash encoding is malformed")]
    InvalidFormat,
    #[error("incompatible hash variant {0}")]
    IncompatibleVariant(String),
    #[error("incompatible hash version {0}")]
    IncompatibleVersion(u32),
    #[error("hashing failed: {0}")]
    Hashing(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes with a fresh random salt. Intentionally CPU-bound (~100 ms);
/// callers on the async path push this onto a blocking thread.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Parses the stored encoding, checks variant and version explicitly,
/// then recomputes with the stored parameters and compares in constant
/// time. `Ok(false)` is a clean mismatch; errors mean the stored hash
/// itself is unusable.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(encoded).map_err(|_| PasswordError::InvalidFormat)?;

    if parsed.algorithm.as_str() != "argon2id" {
        return Err(PasswordError::IncompatibleVariant(
            parsed.algorithm.as_str().to_string(),
        ));
    }
    if let Some(version) = parsed.version {
        Version::try_from(version)
            .map_err(|_| PasswordError::IncompatibleVersion(version))?;
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let encoded = hash_password("password123").unwrap();
        assert!(encoded.starts_with("$argon2id$v=19$m=65536,t=3,p=4$"));
        assert!(verify_password("password123", &encoded).unwrap());
        assert!(!verify_password("password124", &encoded).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a).unwrap());
        assert!(verify_password("same", &b).unwrap());
    }

    #[test]
    fn malformed_encoding_is_rejected() {
        assert_eq!(
            verify_password("x", "not-a-phc-string"),
            Err(PasswordError::InvalidFormat)
        );
    }

    #[test]
    fn wrong_variant_is_rejected() {
        let encoded = hash_password("x").unwrap();
        let tampered = encoded.replacen("argon2id", "argon2i", 1);
        assert!(matches!(
            verify_password("x", &tampered),
            Err(PasswordError::IncompatibleVariant(_))
        ));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let encoded = hash_password("x").unwrap();
        let tampered = encoded.replacen("v=19", "v=77", 1);
        // Either the parse or the version check must refuse it.
        assert!(verify_password("x", &tampered).is_err());
    }
}
