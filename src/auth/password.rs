//! Password hashing and verification (Argon2 with a random per-hash salt).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Returns `Ok(false)` on a wrong password; `Err` only when the stored hash
/// is unparseable or verification itself breaks.
pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Invalid stored password hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("hunter2").expect("hashing should succeed");
        assert!(verify_password(&hash, "hunter2").expect("verification should run"));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash_password("hunter2").expect("hashing should succeed");
        assert!(!verify_password(&hash, "hunter3").expect("verification should run"));
    }

    #[test]
    fn garbage_stored_hash_is_an_internal_error() {
        let result = verify_password("not-a-phc-string", "hunter2");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
