//! Gateway entry point.

use mqgate::{GatewayError, Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), GatewayError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();
    tracing::info!(
        backend = %settings.mq_rest_base_url,
        tls_verify = settings.mq_tls_verify,
        "starting MQ gateway"
    );

    mqgate::serve(settings).await
}
