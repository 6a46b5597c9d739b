//! Passkey gate for mutating operations.
//!
//! The passkey is stored as a SHA-256 hex digest under [`PASSKEY_KEY`]. An
//! absent or empty digest means the project is unprotected and every caller
//! is let through.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::settings::{ConfigError, Result};
use crate::store::KeyValueStore;

/// Store key holding the passkey digest.
pub const PASSKEY_KEY: &str = "passkey_hash";

/// Hex SHA-256 digest of a passkey.
pub fn hash_passkey(passkey: &str) -> String {
    let mut h = Sha256::new();
    h.update(passkey.as_bytes());
    format!("{:x}", h.finalize())
}

fn stored_digest<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<String>> {
    let bytes = store.get(PASSKEY_KEY)?.unwrap_or_default();
    let digest = String::from_utf8_lossy(&bytes).trim().to_string();
    Ok(Some(digest).filter(|d| !d.is_empty()))
}

/// Whether a passkey has been set.
pub fn is_protected<S: KeyValueStore + ?Sized>(store: &S) -> Result<bool> {
    Ok(stored_digest(store)?.is_some())
}

/// Sets (or replaces) the passkey.
///
/// # Errors
///
/// [`ConfigError::InvalidValue`] for an empty passkey; use [`clear_passkey`]
/// to remove protection.
pub fn set_passkey<S: KeyValueStore + ?Sized>(store: &S, passkey: &str) -> Result<()> {
    if passkey.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: PASSKEY_KEY.to_string(),
            reason: "passkey must not be empty".to_string(),
        });
    }
    store.set(PASSKEY_KEY, hash_passkey(passkey).as_bytes())?;
    debug!("passkey updated");
    Ok(())
}

/// Removes passkey protection.
pub fn clear_passkey<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    store.set(PASSKEY_KEY, b"")?;
    debug!("passkey cleared");
    Ok(())
}

/// Checks `candidate` against the stored passkey.
///
/// Always `true` for an unprotected store; `false` for a protected store
/// when no candidate is given.
pub fn verify<S: KeyValueStore + ?Sized>(store: &S, candidate: Option<&str>) -> Result<bool> {
    match stored_digest(store)? {
        None => Ok(true),
        Some(digest) => Ok(candidate.is_some_and(|c| hash_passkey(c) == digest)),
    }
}

/// Like [`verify`], but a failed check is [`ConfigError::AccessDenied`].
pub fn require_access<S: KeyValueStore + ?Sized>(store: &S, candidate: Option<&str>) -> Result<()> {
    if verify(store, candidate)? {
        Ok(())
    } else {
        Err(ConfigError::AccessDenied)
    }
}
