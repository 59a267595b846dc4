//! End-to-end tests: auth flow over a live in-process server, and backend
//! error classification against a mocked MQ REST API.

use std::time::Duration;

use mqgate::mq::{MqClient, MqError};
use mqgate::{AppState, Settings, router};
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "integration-test-secret";

fn test_settings(backend: &str) -> Settings {
    Settings {
        mq_rest_base_url: backend.to_string(),
        mq_rest_base_mqsc_url: backend.to_string(),
        mq_username: "mqadmin".to_string(),
        mq_password: "mqpass".to_string(),
        secret_key: SECRET.to_string(),
        algorithm: "HS256".to_string(),
        access_token_expire_minutes: 30,
        api_username: "admin".to_string(),
        api_password: "admin123".to_string(),
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        mq_tls_verify: false,
    }
}

/// Serve the gateway on an ephemeral port and return its base URL.
async fn spawn_app(settings: Settings) -> String {
    let state = AppState::from_settings(settings).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    format!("http://{addr}")
}

async fn obtain_token(client: &reqwest::Client, base: &str) -> String {
    let response = client
        .post(format!("{base}/token"))
        .form(&[("username", "admin"), ("password", "admin123")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Auth flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_then_protected_echoes_username() {
    let base = spawn_app(test_settings("http://127.0.0.1:1")).await;
    let client = reqwest::Client::new();

    let token = obtain_token(&client, &base).await;

    let response = client
        .get(format!("{base}/protected"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Hello admin! You are authenticated.");
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let base = spawn_app(test_settings("http://127.0.0.1:1")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/token"))
        .form(&[("username", "admin"), ("password", "wrong")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(
        response.headers().get("www-authenticate").unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn login_with_unknown_username_is_401() {
    let base = spawn_app(test_settings("http://127.0.0.1:1")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/token"))
        .form(&[("username", "root"), ("password", "admin123")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn protected_without_token_is_401() {
    let base = spawn_app(test_settings("http://127.0.0.1:1")).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/protected"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(
        response.headers().get("www-authenticate").unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn tampered_token_is_401() {
    let base = spawn_app(test_settings("http://127.0.0.1:1")).await;
    let client = reqwest::Client::new();

    let mut token = obtain_token(&client, &base).await;
    token.push('x');

    let response = client
        .get(format!("{base}/protected"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn expired_token_is_401() {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    let base = spawn_app(test_settings("http://127.0.0.1:1")).await;
    let client = reqwest::Client::new();

    #[derive(serde::Serialize)]
    struct Claims {
        sub: String,
        exp: i64,
    }

    // Correctly signed but already expired.
    let token = encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub: "admin".to_string(),
            exp: chrono::Utc::now().timestamp() - 60,
        },
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let response = client
        .get(format!("{base}/protected"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn health_needs_no_token() {
    let base = spawn_app(test_settings("http://127.0.0.1:1")).await;

    let response = reqwest::get(&base).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

// ---------------------------------------------------------------------------
// Backend status classification (through the full HTTP stack)
// ---------------------------------------------------------------------------

async fn protected_get(route: &str, backend: &MockServer) -> reqwest::Response {
    let base = spawn_app(test_settings(&backend.uri())).await;
    let client = reqwest::Client::new();
    let token = obtain_token(&client, &base).await;

    client
        .get(format!("{base}{route}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn backend_200_passes_body_through() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/qmgr/QM1/queue"))
        .and(basic_auth("mqadmin", "mqpass"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"queue": [{"name": "DEV.Q"}]})),
        )
        .mount(&backend)
        .await;

    let response = protected_get("/qmgr/QM1/queues", &backend).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["status_code"], 200);
    assert_eq!(body["data"]["queue"][0]["name"], "DEV.Q");
}

#[tokio::test]
async fn qmgr_status_queries_with_status_star() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/qmgr/QM1"))
        .and(query_param("status", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"qmgr": [{"state": "running"}]})))
        .mount(&backend)
        .await;

    let response = protected_get("/qmgr/QM1/status", &backend).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn backend_404_maps_to_resource_not_found() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/qmgr/QM1/queue/MISSING.Q"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&backend)
        .await;

    let response = protected_get("/qmgr/QM1/queues/MISSING.Q", &backend).await;
    assert_eq!(response.status(), 404);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "resource_not_found");
}

#[tokio::test]
async fn backend_401_maps_to_upstream_auth_failure() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/qmgr/QM1/channel"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&backend)
        .await;

    let response = protected_get("/qmgr/QM1/channels", &backend).await;
    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "upstream_auth_failure");
}

#[tokio::test]
async fn backend_403_maps_to_upstream_forbidden() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/qmgr/QM1/channel/TO.PARIS"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&backend)
        .await;

    let response = protected_get("/qmgr/QM1/channels/TO.PARIS", &backend).await;
    assert_eq!(response.status(), 403);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "upstream_forbidden");
}

#[tokio::test]
async fn backend_500_maps_to_upstream_error_with_body() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/qmgr/QM1/queue"))
        .respond_with(ResponseTemplate::new(500).set_body_string("MQWEB exploded"))
        .mount(&backend)
        .await;

    let response = protected_get("/qmgr/QM1/queues", &backend).await;
    assert_eq!(response.status(), 500);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "upstream_error");
    let detail = body["error"].as_str().unwrap();
    assert!(detail.contains("500"));
    assert!(detail.contains("MQWEB exploded"));
}

// ---------------------------------------------------------------------------
// MQSC path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn queue_attributes_posts_mqsc_command() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/QM1/mqsc"))
        .and(body_json(json!({
            "type": "runCommandJSON",
            "name": "DEV.Q",
            "command": "DISPLAY",
            "qualifier": "queue",
            "responseParameters": ["ALL"],
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"commandResponse": [{"parameters": {"curdepth": 0}}]})),
        )
        .mount(&backend)
        .await;

    let response = protected_get("/qmgr/QM1/queues/DEV.Q/attributes", &backend).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn mqsc_collapses_all_failures_to_upstream_error() {
    // Unlike the REST path, the MQSC path does not map 404/401/403 to
    // their own outcomes; anything but 200 is a generic upstream error.
    for status in [404_u16, 401, 403, 500] {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/QM1/mqsc"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&backend)
            .await;

        let response = protected_get("/qmgr/QM1/queues/DEV.Q/attributes", &backend).await;
        assert_eq!(response.status(), 500, "backend status {status}");

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["code"], "upstream_error");
    }
}

// ---------------------------------------------------------------------------
// Transport failures (client-level, injected short budget)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hung_backend_maps_to_timeout() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/qmgr/QM1/queue"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&backend)
        .await;

    let client =
        MqClient::with_timeout(&test_settings(&backend.uri()), Duration::from_millis(200))
            .unwrap();

    assert!(matches!(
        client.list_queues("QM1").await,
        Err(MqError::Timeout)
    ));
}

#[tokio::test]
async fn unreachable_backend_maps_to_unavailable() {
    // Nothing listens on port 1.
    let client = MqClient::new(&test_settings("http://127.0.0.1:1")).unwrap();

    assert!(matches!(
        client.qmgr_status("QM1").await,
        Err(MqError::Unavailable)
    ));
}

#[tokio::test]
async fn unreachable_backend_surfaces_as_503() {
    let base = spawn_app(test_settings("http://127.0.0.1:1")).await;
    let client = reqwest::Client::new();
    let token = obtain_token(&client, &base).await;

    let response = client
        .get(format!("{base}/qmgr/QM1/queues"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "upstream_unavailable");
}
