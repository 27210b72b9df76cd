// Demonstration server entry point.
use std::sync::Arc;

use anyhow::{Context, Result};
use hub_publisher::server::{self, AppState};
use hub_publisher::transport::{Credential, InMemoryHub};
use hub_publisher::{PublishManager, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().context("load server configuration")?;

    // No broker SDK binding ships with the crate; the in-memory hub stands in for it.
    let manager = Arc::new(PublishManager::new(
        InMemoryHub::new(),
        Credential::from_env(),
        config.publisher,
    ));
    tracing::info!(
        destination = %config.destination,
        max_messages = manager.max_messages(),
        "publish manager ready"
    );

    let state = Arc::new(AppState::new(Arc::clone(&manager), config.clone()));
    if config.auto_publish_on_start {
        state.start_auto_publish().await;
    }

    server::serve(Arc::clone(&state), config.bind, shutdown_signal())
        .await
        .context("serve http")?;

    tracing::info!("received shutdown signal, cleaning up");
    if let Some(stats) = state.stop_auto_publish().await {
        tracing::info!(published = stats.published, failed = stats.failed, "auto publisher stopped");
    }
    manager.close().await.context("close event hub client")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
