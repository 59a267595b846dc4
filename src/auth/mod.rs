//! Authentication for the gateway.
//!
//! This module provides:
//! - The single-account credential store with bcrypt verification
//! - Bearer token issuance and validation
//! - The `RequireAuth` extractor for protected routes

mod credentials;
mod extract;
mod token;

pub use credentials::{CredentialStore, Identity};
pub use extract::{AuthState, RequireAuth};
pub use token::{Claims, TokenService};

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Authentication errors.
///
/// Every rejection of a login or a presented token is the same
/// `InvalidCredentials` value: callers must not be able to tell which
/// check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad login, or a missing/expired/tampered token.
    #[error("Could not validate credentials")]
    InvalidCredentials,

    /// Hashing or signing failed.
    #[error("Internal auth error: {0}")]
    Internal(String),
}

/// Error response body for auth failures.
#[derive(Debug, Serialize)]
struct AuthErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = AuthErrorBody {
            error: self.to_string(),
            code,
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
