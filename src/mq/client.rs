//! HTTP client for MQWEB's REST and MQSC endpoints.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use urlencoding::encode;

use super::MqError;
use crate::config::Settings;

/// Fixed per-call budget; every backend call is attempted exactly once.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Required by the MQ REST API on every request, even when empty.
const CSRF_HEADER: &str = "ibm-mq-rest-csrf-token";

/// Successful backend result relayed to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct MqResponse {
    /// Always true; failures surface as [`MqError`] instead.
    pub success: bool,
    /// Backend JSON body, passed through untouched.
    pub data: Value,
    /// Backend HTTP status.
    pub status_code: u16,
}

/// Client for the MQ REST administration API.
///
/// Constructed once at startup and injected into handlers. Holds the
/// backend base URLs and basic-auth credentials; every call is bounded
/// by the 10-second budget.
#[derive(Debug)]
pub struct MqClient {
    http: reqwest::Client,
    rest_base: String,
    mqsc_base: String,
    username: String,
    password: String,
}

impl MqClient {
    /// Create a client from settings with the standard call budget.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn new(settings: &Settings) -> Result<Self, MqError> {
        Self::with_timeout(settings, REQUEST_TIMEOUT)
    }

    /// Create a client with an explicit call budget.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn with_timeout(settings: &Settings, timeout: Duration) -> Result<Self, MqError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            // MQWEB commonly runs on a self-signed certificate; see
            // the MQ_TLS_VERIFY setting.
            .danger_accept_invalid_certs(!settings.mq_tls_verify)
            .build()
            .map_err(|e| MqError::Internal(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            rest_base: settings.mq_rest_base_url.trim_end_matches('/').to_string(),
            mqsc_base: settings
                .mq_rest_base_mqsc_url
                .trim_end_matches('/')
                .to_string(),
            username: settings.mq_username.clone(),
            password: settings.mq_password.clone(),
        })
    }

    /// Get queue manager status.
    ///
    /// # Errors
    ///
    /// Returns a classified [`MqError`] on any backend failure.
    pub async fn qmgr_status(&self, qmgr: &str) -> Result<MqResponse, MqError> {
        self.get_json(&format!("qmgr/{}?status=*", encode(qmgr)))
            .await
    }

    /// List all queues for a queue manager.
    ///
    /// # Errors
    ///
    /// Returns a classified [`MqError`] on any backend failure.
    pub async fn list_queues(&self, qmgr: &str) -> Result<MqResponse, MqError> {
        self.get_json(&format!("qmgr/{}/queue", encode(qmgr))).await
    }

    /// Get a specific queue.
    ///
    /// # Errors
    ///
    /// Returns a classified [`MqError`] on any backend failure.
    pub async fn get_queue(&self, qmgr: &str, queue: &str) -> Result<MqResponse, MqError> {
        self.get_json(&format!("qmgr/{}/queue/{}", encode(qmgr), encode(queue)))
            .await
    }

    /// List all channels for a queue manager.
    ///
    /// # Errors
    ///
    /// Returns a classified [`MqError`] on any backend failure.
    pub async fn list_channels(&self, qmgr: &str) -> Result<MqResponse, MqError> {
        self.get_json(&format!("qmgr/{}/channel", encode(qmgr)))
            .await
    }

    /// Get a specific channel.
    ///
    /// # Errors
    ///
    /// Returns a classified [`MqError`] on any backend failure.
    pub async fn get_channel(&self, qmgr: &str, channel: &str) -> Result<MqResponse, MqError> {
        self.get_json(&format!(
            "qmgr/{}/channel/{}",
            encode(qmgr),
            encode(channel)
        ))
        .await
    }

    /// Get queue attributes via the MQSC command endpoint.
    ///
    /// # Errors
    ///
    /// Returns a classified [`MqError`] on any backend failure. Note the
    /// MQSC path maps every non-200 status to [`MqError::Mqsc`].
    pub async fn queue_attributes(&self, qmgr: &str, queue: &str) -> Result<MqResponse, MqError> {
        let payload = serde_json::json!({
            "type": "runCommandJSON",
            "name": queue,
            "command": "DISPLAY",
            "qualifier": "queue",
            "responseParameters": ["ALL"],
        });

        self.post_mqsc(&format!("{}/mqsc", encode(qmgr)), &payload)
            .await
    }

    /// GET against the REST admin base URL with full status classification.
    async fn get_json(&self, endpoint: &str) -> Result<MqResponse, MqError> {
        let url = format!("{}/{endpoint}", self.rest_base);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .header(CSRF_HEADER, "")
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        match status {
            200 => {
                let data: Value = response
                    .json()
                    .await
                    .map_err(|e| MqError::Internal(format!("Invalid JSON from backend: {e}")))?;
                Ok(MqResponse {
                    success: true,
                    data,
                    status_code: status,
                })
            }
            404 => Err(MqError::NotFound(endpoint.to_string())),
            401 => Err(MqError::UpstreamAuth),
            403 => Err(MqError::UpstreamForbidden),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(MqError::Upstream { status, body })
            }
        }
    }

    /// POST against the MQSC action base URL. 200 or bust.
    async fn post_mqsc(&self, endpoint: &str, payload: &Value) -> Result<MqResponse, MqError> {
        let url = format!("{}/{endpoint}", self.mqsc_base);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .header(CSRF_HEADER, "")
            .json(payload)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        if status == 200 {
            let data: Value = response
                .json()
                .await
                .map_err(|e| MqError::Internal(format!("Invalid JSON from backend: {e}")))?;
            Ok(MqResponse {
                success: true,
                data,
                status_code: status,
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(MqError::Mqsc { status, body })
        }
    }
}

/// Classify a transport-level failure from reqwest.
fn classify_transport(error: reqwest::Error) -> MqError {
    if error.is_timeout() {
        MqError::Timeout
    } else if error.is_connect() {
        MqError::Unavailable
    } else {
        MqError::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_envelope_shape() {
        let response = MqResponse {
            success: true,
            data: serde_json::json!({"qmgr": [{"name": "QM1"}]}),
            status_code: 200,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["status_code"], 200);
        assert_eq!(value["data"]["qmgr"][0]["name"], "QM1");
    }

    #[test]
    fn test_identifiers_are_path_encoded() {
        // Slashes and spaces in names must not change the path shape.
        assert_eq!(encode("QM 1"), "QM%201");
        assert_eq!(encode("DEV/QUEUE"), "DEV%2FQUEUE");
    }
}
