use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use token_holders_service::{create_router, AppState, Config, HolderAggregator, TokenAccountsClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::load()?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!("token_holders_service={0},tower_http={0}", config.service.log_level)
                        .into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Configuration loaded successfully");

    let api_key = config.api_key()?;
    let client = TokenAccountsClient::from_config(&config.upstream, api_key)?;
    info!(
        "Upstream RPC {} (page size {}, timeout {:?})",
        config.upstream.rpc_url,
        client.page_size(),
        config.request_timeout()
    );
    let aggregator = HolderAggregator::from_config(&config, client);

    let shutdown = CancellationToken::new();
    let state = AppState::new(aggregator, config.distribution_config(), shutdown.child_token());
    let router = create_router(state, &config.cors);

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received Ctrl+C, initiating graceful shutdown...");
                signal_token.cancel();
            }
            Err(err) => {
                error!("Failed to listen for Ctrl+C: {}", err);
            }
        }
    });

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Token holders service listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped");
    Ok(())
}
