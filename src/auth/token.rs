//! Bearer token issuance and validation.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::AuthError;
use super::credentials::Identity;

/// Validity window applied when the caller supplies no TTL.
const FALLBACK_TTL_MINUTES: i64 = 15;

/// Token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the authenticated username).
    pub sub: String,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Issues and validates signed bearer tokens.
///
/// Tokens are self-contained: there is no session table, no refresh
/// tokens, and no revocation before expiry.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenService {
    /// Create a token service from a symmetric secret.
    #[must_use]
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
        }
    }

    /// Issue a token for a verified identity.
    ///
    /// `ttl` of `None` falls back to 15 minutes; the login path passes the
    /// configured window.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if signing fails.
    pub fn issue(&self, identity: &Identity, ttl: Option<Duration>) -> Result<String, AuthError> {
        let ttl = ttl.unwrap_or_else(|| Duration::minutes(FALLBACK_TTL_MINUTES));
        let claims = Claims {
            sub: identity.username.clone(),
            exp: (Utc::now() + ttl).timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token encoding failed: {e}")))
    }

    /// Validate and decode a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a bad signature, an
    /// undecodable payload, a missing subject, or an expired token. The
    /// variant is the same in every case so callers cannot tell which
    /// check failed.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        // No grace period: a token is invalid the moment `exp` passes.
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Extract the token from an Authorization header value.
    ///
    /// Expects format: "Bearer <token>"
    #[must_use]
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
