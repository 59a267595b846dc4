//! Request authentication extractor for axum.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use super::AuthError;
use super::credentials::{CredentialStore, Identity};
use super::token::TokenService;

/// Shared authentication state.
#[derive(Debug)]
pub struct AuthState {
    /// The single configured account.
    pub credentials: CredentialStore,
    /// Token issuance and validation.
    pub tokens: TokenService,
}

impl AuthState {
    /// Create a new auth state.
    #[must_use]
    pub fn new(credentials: CredentialStore, tokens: TokenService) -> Self {
        Self {
            credentials,
            tokens,
        }
    }
}

/// Extractor for authenticated requests.
///
/// Use this in handler parameters to require a valid bearer token. The
/// token's subject is re-resolved against the credential store, so a
/// token outlives a configuration change only until its next use.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Identity);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
    Arc<AuthState>: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = Arc::<AuthState>::from_ref(state);

        // Any failure below renders identically: 401, WWW-Authenticate.
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AuthError::InvalidCredentials.into_response())?;

        let token = TokenService::extract_from_header(header)
            .ok_or_else(|| AuthError::InvalidCredentials.into_response())?;

        let claims = auth
            .tokens
            .verify(token)
            .map_err(IntoResponse::into_response)?;

        let identity = auth
            .credentials
            .lookup(&claims.sub)
            .ok_or_else(|| AuthError::InvalidCredentials.into_response())?;

        Ok(Self(identity))
    }
}
