//! Environment-sourced settings, read once at startup.

use std::env;

/// Gateway settings.
///
/// Every field is sourced from the process environment; defaults match a
/// local MQWEB listener with its stock developer configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the MQ REST admin API.
    pub mq_rest_base_url: String,
    /// Base URL of the MQ REST MQSC action API.
    pub mq_rest_base_mqsc_url: String,
    /// Basic-auth username for the MQ backend.
    pub mq_username: String,
    /// Basic-auth password for the MQ backend.
    pub mq_password: String,
    /// Symmetric token-signing secret.
    pub secret_key: String,
    /// Token-signing algorithm identifier (e.g. "HS256").
    pub algorithm: String,
    /// Token validity window in minutes.
    pub access_token_expire_minutes: u64,
    /// The single gateway account's username.
    pub api_username: String,
    /// The single gateway account's password.
    pub api_password: String,
    /// Address to listen on.
    pub bind_address: String,
    /// Port to listen on.
    pub port: u16,
    /// Verify the MQ backend's TLS certificate.
    ///
    /// Off by default: MQWEB typically runs with a self-signed
    /// certificate. Set `MQ_TLS_VERIFY=true` in production.
    pub mq_tls_verify: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mq_rest_base_url: "http://localhost:9443/ibmmq/rest/v1/admin".to_string(),
            mq_rest_base_mqsc_url: "http://localhost:9443/ibmmq/rest/v1/admin/action".to_string(),
            mq_username: String::new(),
            mq_password: String::new(),
            secret_key: String::new(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            api_username: "admin".to_string(),
            api_password: "admin123".to_string(),
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            mq_tls_verify: false,
        }
    }
}

impl Settings {
    /// Load settings from environment variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            mq_rest_base_url: env_or("MQ_REST_BASE_URL", defaults.mq_rest_base_url),
            mq_rest_base_mqsc_url: env_or("MQ_REST_BASE_MQSC_URL", defaults.mq_rest_base_mqsc_url),
            mq_username: env_or("MQ_USERNAME", defaults.mq_username),
            mq_password: env_or("MQ_PASSWORD", defaults.mq_password),
            secret_key: env_or("SECRET_KEY", defaults.secret_key),
            algorithm: env_or("ALGORITHM", defaults.algorithm),
            access_token_expire_minutes: env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.access_token_expire_minutes),
            api_username: env_or("API_USERNAME", defaults.api_username),
            api_password: env_or("API_PASSWORD", defaults.api_password),
            bind_address: env_or("GATEWAY_BIND", defaults.bind_address),
            port: env::var("GATEWAY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            mq_tls_verify: env::var("MQ_TLS_VERIFY")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.mq_tls_verify),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}
