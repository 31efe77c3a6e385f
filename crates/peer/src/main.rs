//! Passport Peer
//!
//! Serves proposal evaluation, endorsement, ordering and commit status over HTTP

use anyhow::{Context, Result};
use passport_peer::{create_router, AppState, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "passport_peer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting passport peer");
    info!("Peer: {} ({})", config.peer_address, config.msp_id);
    info!("Channel: {}, chaincode: {}", config.channel, config.chaincode);
    info!(
        "Batch size: {}, queue depth: {}",
        config.max_batch_size, config.queue_depth
    );

    let signing_key = config
        .signing_key()
        .context("Failed to load endorsement key")?;

    let addr = config.listen_address();
    let state = AppState::new(config, signing_key);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("Passport peer running on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
