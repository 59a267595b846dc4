//! Client for the IBM MQ REST administration API.
//!
//! Every backend outcome is classified into a small, stable error
//! taxonomy; transport status codes are assigned only at the API
//! boundary via `IntoResponse`.

mod client;

pub use client::{MqClient, MqResponse};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Errors from calls against the MQ REST backend.
///
/// Each variant corresponds to one outward HTTP status; none are retried
/// or suppressed.
#[derive(Debug, Error)]
pub enum MqError {
    /// Backend reported the object missing (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Backend rejected the gateway's own credentials (401). Distinct
    /// from a caller auth failure.
    #[error("MQ authentication failed. Check MQ credentials.")]
    UpstreamAuth,

    /// Backend denied access for the gateway's user (403).
    #[error("Access forbidden. Check MQ user permissions.")]
    UpstreamForbidden,

    /// Any other non-200 status from the REST path.
    #[error("MQ REST API error: {status} - {body}")]
    Upstream {
        /// Backend HTTP status.
        status: u16,
        /// Backend response body text.
        body: String,
    },

    /// Any non-200 status from the MQSC path. Unlike the REST path,
    /// 404/401/403 are not distinguished here.
    #[error("MQSC request error: {status} - {body}")]
    Mqsc {
        /// Backend HTTP status.
        status: u16,
        /// Backend response body text.
        body: String,
    },

    /// Connection refused or unreachable.
    #[error("Cannot connect to MQ REST API. Check if MQWEB is running.")]
    Unavailable,

    /// The 10-second call budget was exceeded.
    #[error("MQ REST API request timed out.")]
    Timeout,

    /// Anything else.
    #[error("Unexpected error: {0}")]
    Internal(String),
}

/// Error response body for backend failures.
#[derive(Debug, Serialize)]
struct MqErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for MqError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "resource_not_found"),
            Self::UpstreamAuth => (StatusCode::UNAUTHORIZED, "upstream_auth_failure"),
            Self::UpstreamForbidden => (StatusCode::FORBIDDEN, "upstream_forbidden"),
            Self::Upstream { .. } | Self::Mqsc { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "upstream_error")
            }
            Self::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable"),
            Self::Timeout => (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = MqErrorBody {
            error: self.to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}
