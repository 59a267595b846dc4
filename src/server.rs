//! HTTP surface: router, handlers, shared state.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{FromRef, Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::GatewayError;
use crate::auth::{AuthError, AuthState, CredentialStore, RequireAuth, TokenService};
use crate::config::Settings;
use crate::mq::{MqClient, MqError, MqResponse};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Gateway settings.
    pub settings: Arc<Settings>,
    /// Authentication state.
    pub auth: Arc<AuthState>,
    /// MQ backend client.
    pub mq: Arc<MqClient>,
}

impl AppState {
    /// Build the full application state from settings.
    ///
    /// # Errors
    ///
    /// Returns error if the signing algorithm is unknown or the backend
    /// client cannot be constructed.
    pub fn from_settings(settings: Settings) -> Result<Self, GatewayError> {
        let algorithm = settings
            .algorithm
            .parse()
            .map_err(|e| GatewayError::Config(format!("Unknown signing algorithm: {e}")))?;

        let tokens = TokenService::new(settings.secret_key.as_bytes(), algorithm);
        let credentials =
            CredentialStore::new(settings.api_username.clone(), settings.api_password.clone());
        let mq = MqClient::new(&settings)
            .map_err(|e| GatewayError::Config(format!("MQ client init failed: {e}")))?;

        Ok(Self {
            settings: Arc::new(settings),
            auth: Arc::new(AuthState::new(credentials, tokens)),
            mq: Arc::new(mq),
        })
    }
}

impl FromRef<AppState> for Arc<AuthState> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Build the gateway router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/token", post(login))
        .route("/protected", get(protected))
        .route("/qmgr/{qmgr}/status", get(qmgr_status))
        .route("/qmgr/{qmgr}/queues", get(list_queues))
        .route("/qmgr/{qmgr}/queues/{queue}", get(get_queue))
        .route("/qmgr/{qmgr}/queues/{queue}/attributes", get(queue_attributes))
        .route("/qmgr/{qmgr}/channels", get(list_channels))
        .route("/qmgr/{qmgr}/channels/{channel}", get(get_channel))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until shutdown.
///
/// # Errors
///
/// Returns error if the bind address is invalid or the server fails.
pub async fn serve(settings: Settings) -> Result<(), GatewayError> {
    let addr: SocketAddr = format!("{}:{}", settings.bind_address, settings.port)
        .parse()
        .map_err(|e| GatewayError::Config(format!("Invalid address: {e}")))?;

    let state = AppState::from_settings(settings)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MQ gateway listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
}

/// `POST /token` — exchange the configured credentials for a bearer token.
async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AuthError> {
    let identity = state
        .auth
        .credentials
        .verify(&form.username, &form.password)?
        .ok_or_else(|| {
            tracing::warn!(username = %form.username, "login rejected");
            AuthError::InvalidCredentials
        })?;

    let ttl = chrono::Duration::minutes(
        i64::try_from(state.settings.access_token_expire_minutes)
            .map_err(|_| AuthError::Internal("Token TTL out of range".to_string()))?,
    );
    let access_token = state.auth.tokens.issue(&identity, Some(ttl))?;
    tracing::info!(username = %identity.username, "issued access token");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// `GET /` — unauthenticated health check.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "IBM MQ Monitoring API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /protected` — trivial echo for verifying the auth flow.
async fn protected(RequireAuth(identity): RequireAuth) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": format!("Hello {}! You are authenticated.", identity.username),
    }))
}

async fn qmgr_status(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(qmgr): Path<String>,
) -> Result<Json<MqResponse>, MqError> {
    Ok(Json(state.mq.qmgr_status(&qmgr).await?))
}

async fn list_queues(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(qmgr): Path<String>,
) -> Result<Json<MqResponse>, MqError> {
    Ok(Json(state.mq.list_queues(&qmgr).await?))
}

async fn get_queue(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path((qmgr, queue)): Path<(String, String)>,
) -> Result<Json<MqResponse>, MqError> {
    Ok(Json(state.mq.get_queue(&qmgr, &queue).await?))
}

async fn queue_attributes(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path((qmgr, queue)): Path<(String, String)>,
) -> Result<Json<MqResponse>, MqError> {
    Ok(Json(state.mq.queue_attributes(&qmgr, &queue).await?))
}

async fn list_channels(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(qmgr): Path<String>,
) -> Result<Json<MqResponse>, MqError> {
    Ok(Json(state.mq.list_channels(&qmgr).await?))
}

async fn get_channel(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path((qmgr, channel)): Path<(String, String)>,
) -> Result<Json<MqResponse>, MqError> {
    Ok(Json(state.mq.get_channel(&qmgr, &channel).await?))
}
