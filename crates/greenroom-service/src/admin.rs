//! Admin API key verification.
//!
//! The key is stored as an Argon2 PHC hash in configuration; requests
//! present the plain key as a bearer credential. Dev mode may instead
//! configure a plain comparison key for local work.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use greenroom_core::config::Settings;

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Hashes an admin API key using Argon2id with a random salt. Exposed for
/// provisioning tooling.
///
/// ## Errors
/// Returns an error if hashing fails.
pub fn hash_admin_key(key: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(key.as_bytes(), &salt)
        .map_err(|e| ServiceError::InvalidConfiguration(format!("Failed to hash admin key: {e}")))?;

    Ok(hash.to_string())
}

/// ## Summary
/// Verifies a presented admin key against the configured credential.
///
/// Order of precedence: the Argon2 hash when configured, then the dev-mode
/// plain key. With neither configured the admin surface is effectively
/// disabled and every key is refused as a configuration problem.
///
/// ## Errors
/// `NotAuthenticated` for a wrong key, `InvalidConfiguration` when no
/// credential is configured at all.
pub fn verify_admin_key(settings: &Settings, presented: &str) -> ServiceResult<()> {
    let presented = presented.trim();
    if presented.is_empty() {
        return Err(ServiceError::NotAuthenticated);
    }

    if let Some(hash) = settings
        .admin
        .api_key_hash
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
    {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            ServiceError::InvalidConfiguration(format!("Invalid admin key hash: {e}"))
        })?;

        return Argon2::default()
            .verify_password(presented.as_bytes(), &parsed_hash)
            .map_err(|_e| ServiceError::NotAuthenticated);
    }

    if settings.schedule.dev_mode {
        if let Some(dev_key) = settings
            .admin
            .dev_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            if dev_key == presented {
                return Ok(());
            }
            return Err(ServiceError::NotAuthenticated);
        }
    }

    Err(ServiceError::InvalidConfiguration(
        "Admin API key not configured".to_string(),
    ))
}
