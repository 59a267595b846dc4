//! The single-account credential store.

use std::sync::OnceLock;

use super::AuthError;

/// bcrypt operates on at most 72 bytes of input; longer passwords are
/// truncated to this prefix at both hash and verify time.
const BCRYPT_MAX_BYTES: usize = 72;

/// An authenticated caller. Exists only for the duration of a request.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Username the caller authenticated as.
    pub username: String,
}

/// Holds the one account the gateway accepts.
///
/// The bcrypt hash of the configured password is computed lazily on first
/// use and memoized for the life of the process. Racing first requests may
/// compute it redundantly; only one result is kept.
pub struct CredentialStore {
    username: String,
    password: String,
    hash: OnceLock<String>,
}

impl CredentialStore {
    /// Create a store for the configured account.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            hash: OnceLock::new(),
        }
    }

    /// Resolve a username to an identity. Unknown usernames are absence,
    /// not an error.
    #[must_use]
    pub fn lookup(&self, username: &str) -> Option<Identity> {
        (username == self.username).then(|| Identity {
            username: username.to_string(),
        })
    }

    /// Verify a login attempt.
    ///
    /// Returns `Ok(None)` for an unknown username or a wrong password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if hashing fails.
    pub fn verify(&self, username: &str, password: &str) -> Result<Option<Identity>, AuthError> {
        let Some(identity) = self.lookup(username) else {
            return Ok(None);
        };

        let hash = self.stored_hash()?;
        let matches = bcrypt::verify(truncate_password(password), hash)
            .map_err(|e| AuthError::Internal(format!("Password verification failed: {e}")))?;

        Ok(matches.then_some(identity))
    }

    fn stored_hash(&self) -> Result<&str, AuthError> {
        if let Some(hash) = self.hash.get() {
            return Ok(hash);
        }
        let computed = hash_password(&self.password)?;
        Ok(self.hash.get_or_init(|| computed))
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Hash a password with bcrypt, applying the 72-byte truncation rule.
fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(truncate_password(password), bcrypt::DEFAULT_COST)
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {e}")))
}

/// Truncate a password to the first 72 UTF-8 bytes.
///
/// Applied identically when hashing and when verifying, so long passwords
/// still verify against their own hash.
fn truncate_password(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(BCRYPT_MAX_BYTES)]
}
