use std::sync::Arc;

use anyhow::Context;
use qrledger_config::Config;
use qrledger_core::PostgresQrCodeRepository;
use tracing::{info, warn};

use super::app_state::{AppState, StorageKind};

/// Wire the registry to PostgreSQL when a database URL is configured,
/// otherwise to the in-memory repository.
pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    match config.database.url.clone() {
        Some(url) => {
            let repo = PostgresQrCodeRepository::connect(
                &url,
                config.database.max_connections,
            )
            .await
            .context("failed to initialise PostgreSQL repository")?;
            info!(
                max_connections = config.database.max_connections,
                "registry backed by PostgreSQL"
            );
            Ok(AppState::new(Arc::new(repo), config, StorageKind::Postgres))
        }
        None => {
            warn!("registry running in memory; records are lost on restart");
            Ok(AppState::in_memory(config))
        }
    }
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
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

    info!("shutdown signal received");
}
