use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use word_lookup_service::config::Config;
use word_lookup_service::server::{self, AppState};
use word_lookup_service::store::{DocumentStore, MemoryStore, PgDocumentStore};
use word_lookup_service::translation::GoogleTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("word_lookup_service=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting word lookup service");

    let config = Config::from_env()?;
    info!("Environment: {}", config.environment);

    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => Arc::new(PgDocumentStore::connect(url, config.database_max_connections).await?),
        None => {
            warn!("DATABASE_URL not set, using in-memory store (documents will not persist)");
            Arc::new(MemoryStore::new())
        }
    };

    let translator = Arc::new(GoogleTranslator::new(reqwest::Client::new(), &config));
    let app = server::router(AppState::new(store, translator));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", config.host, config.port))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
