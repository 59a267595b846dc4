//! # mqgate
//!
//! A thin authenticated HTTP gateway in front of the IBM MQ REST
//! administration API. Callers log in with a single configured account,
//! receive a signed bearer token, and use it to query queue-manager,
//! queue, and channel state; the gateway forwards each query to MQWEB
//! over basic auth and relays the JSON response.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Authentication: credential store, token service, request extractor.
pub mod auth;
/// Environment-sourced settings.
pub mod config;
/// MQ REST backend client and its error taxonomy.
pub mod mq;
mod server;

pub use config::Settings;
pub use server::{AppState, router, serve};

/// Top-level startup errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
