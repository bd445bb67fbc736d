//! Regidesk Server — school document-request and enrollment portal core.
//!
//! Main entry point that wires the crates together: the persisted session
//! store, the session lifecycle runner, the access gate, and the request
//! workflow services.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use regidesk_auth::session::{GuardRunner, LocalRevalidator, SessionGuard, SessionStore};
use regidesk_auth::{AccessGate, TokenClock};
use regidesk_core::config::AppConfig;
use regidesk_core::error::AppError;
use regidesk_service::{EnrollmentLookup, RequestService};
use regidesk_storage::{FileSessionBackend, RequestRecordStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("REGIDESK_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Regidesk v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Data directory ──────────────────────────────────
    tokio::fs::create_dir_all(&config.storage.data_root)
        .await
        .map_err(|e| {
            AppError::internal(format!(
                "Failed to create data dir '{}': {e}",
                config.storage.data_root
            ))
        })?;

    // ── Step 2: Session store ───────────────────────────────────
    let backend = Arc::new(FileSessionBackend::new(config.storage.session_path()));
    let session_store = SessionStore::new(backend);

    // ── Step 3: Session lifecycle ───────────────────────────────
    let clock = TokenClock::new(&config.session);
    let mut guard = SessionGuard::new(session_store.clone(), clock, &config.session);

    // A persisted session only comes back under guard: resume classifies
    // the stored credential and discards it when expired.
    match session_store.load().await? {
        Some(session) => {
            if guard.resume(Utc::now()).await? {
                tracing::info!(
                    username = %session.user.username,
                    "Restored persisted session"
                );
            } else {
                tracing::info!("Persisted session had expired; discarded");
            }
        }
        None => tracing::info!("No persisted session found"),
    }

    let revalidator = Arc::new(LocalRevalidator::new(clock));
    let (runner, guard_handle) = GuardRunner::new(guard, revalidator, &config.session);

    // ── Step 4: Records and services ────────────────────────────
    let records = Arc::new(RequestRecordStore::new());
    let gate = AccessGate::new(session_store.view());
    let _request_service = RequestService::new(gate, Arc::clone(&records));
    let _enrollment_lookup = EnrollmentLookup::new(Arc::clone(&records));
    tracing::info!("Services initialized");

    // ── Step 5: Run until shutdown ──────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner_handle = tokio::spawn(runner.run(shutdown_rx));

    let mut events = guard_handle.subscribe();
    let event_logger = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(?event, "Session event");
        }
    });

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    let _ = tokio::time::timeout(std::time::Duration::from_secs(10), runner_handle).await;
    event_logger.abort();

    tracing::info!("Regidesk server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
