use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;

use crate::error::{AppError, Result};

/// Salt length in bytes before base64 encoding
const SALT_LEN: usize = 16;

/// Hash a password with Argon2id and a fresh random salt
///
/// Returns a PHC string (`$argon2id$v=19$...`) carrying the salt and
/// parameters, so hashing the same input twice yields different digests.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check `password` against a stored PHC digest
///
/// A mismatch is `Ok(false)`; only an unparseable digest is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
