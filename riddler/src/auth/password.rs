//! Password hashing and verification
//!
//! New hashes are Argon2id PHC strings. Accounts imported from the previous
//! deployment carry bare SHA-256 hex digests, which still verify.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};

use crate::types::RiddlerError;

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, RiddlerError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RiddlerError::Auth(format!("Failed to hash password: {e}")))
}

fn is_legacy_digest(hash: &str) -> bool {
    hash.len() == 64 && hash.chars().all(|c| c.is_ascii_hexdigit())
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, RiddlerError> {
    if is_legacy_digest(hash) {
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        return Ok(digest.eq_ignore_ascii_case(hash));
    }

    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| RiddlerError::Auth(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_legacy_digest() {
        let legacy = hex::encode(Sha256::digest(b"hunter2"));
        assert!(verify_password("hunter2", &legacy).unwrap());
        assert!(!verify_password("hunter3", &legacy).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(verify_password("password", "not-a-valid-hash").is_err());
    }
}
