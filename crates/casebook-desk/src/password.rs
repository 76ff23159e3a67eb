// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id password hashing in PHC string form.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use casebook_core::CasebookError;
use ring::rand::{SecureRandom, SystemRandom};

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CasebookError> {
    let mut salt = [0u8; 16];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| CasebookError::Internal("failed to generate random salt".to_string()))?;
    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| CasebookError::Internal(format!("invalid salt: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CasebookError::Internal(format!("password hashing failed: {e}")))
}

/// Check `password` against a stored PHC string. A malformed hash never matches.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
