use anyhow::{Context, Result};
use polyglot_cms::config::Config;
use polyglot_cms::content::ensure_default_pages;
use polyglot_cms::retry::RetryConfig;
use polyglot_cms::server::{self, AdminCredentials, AppState};
use polyglot_cms::storage::DiskStorage;
use polyglot_cms::store::{ContentStore, MemoryStore, PgStore};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("polyglot_cms=info".parse()?),
        )
        .init();

    info!("Starting polyglot CMS");

    let config = Config::from_env()?;

    let (store, backend): (Arc<dyn ContentStore>, &'static str) = match &config.database_url {
        Some(url) => {
            let retry = RetryConfig::db_connect(config.db_connect_attempts);
            (Arc::new(PgStore::connect(url, &retry).await?), "postgres")
        }
        None => {
            warn!("DATABASE_URL not set, content is kept in memory and lost on restart");
            (Arc::new(MemoryStore::new()), "memory")
        }
    };

    // A failed seed leaves the menu short but the server usable
    match ensure_default_pages(store.as_ref()).await {
        Ok(0) => {}
        Ok(seeded) => info!(seeded, "Seeded default pages"),
        Err(e) => warn!(error = %e, "Failed to seed default pages"),
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", config.upload_dir.display()))?;
    let storage = DiskStorage::new(&config.upload_dir, config.max_upload_bytes);

    let state = AppState {
        store,
        storage: Arc::new(storage),
        admin: Arc::new(AdminCredentials {
            user: config.admin_user.clone(),
            password: config.admin_password.clone(),
        }),
        max_upload_bytes: config.max_upload_bytes,
        backend,
    };

    let app = server::router(state).nest_service("/uploads", ServeDir::new(&config.upload_dir));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, backend, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shut down cleanly");
    Ok(())
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
