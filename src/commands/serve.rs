use std::sync::Arc;

use anyhow::{Context, Result};

use zenclass::config::Config;
use zenclass::server::{ReportServer, ServerConfig};
use zenclass::storage::{create_memory_store, MongoRecordStore, SharedRecordStore};

/// Connect the record store and serve the API until a shutdown signal
pub async fn serve(
    config: Config,
    host: Option<String>,
    port: Option<u16>,
    memory: bool,
) -> Result<()> {
    let mut builder = ServerConfig::builder()
        .bind_address(config.server.bind_address)
        .enable_cors(config.server.enable_cors)
        .enable_request_logging(config.server.enable_request_logging);
    if let Some(host) = host.as_deref() {
        builder = builder.host_str(host)?;
    }
    if let Some(port) = port {
        builder = builder.port(port);
    }
    let server_config = builder.build()?;

    let mut mongo_client = None;
    let store: SharedRecordStore = if memory {
        tracing::warn!("Serving from an empty in-memory store");
        create_memory_store()
    } else {
        let store = match MongoRecordStore::connect(&config.database).await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, uri = %config.database.uri, "MongoDB connection error");
                return Err(e).context("Failed to connect to MongoDB");
            }
        };

        if config.database.ensure_indexes {
            store
                .ensure_indexes()
                .await
                .context("Failed to ensure collection indexes")?;
        }

        mongo_client = Some(store.client());
        Arc::new(store)
    };

    let server = ReportServer::new(server_config, store)?;
    println!("{}", server.info().display());

    server.start_with_shutdown(shutdown_signal()).await?;

    if let Some(client) = mongo_client {
        client.shutdown().await;
        tracing::info!("MongoDB connection closed");
    }

    Ok(())
}

/// Print the effective configuration
pub fn show_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    println!("{rendered}");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received");
}
