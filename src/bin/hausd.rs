//! hausd, the Hausaufgaben daemon.
//!
//! Serves the cached homework document over HTTP. Exits with status 1
//! before binding any socket when backend credentials are missing.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use hausaufgaben::backend::{self, Credentials};
use hausaufgaben::cache::DocumentCache;
use hausaufgaben::server::{AppState, Config, router};

/// Hausaufgaben daemon: cached homework document API.
#[derive(Parser)]
#[command(name = "hausd")]
#[command(version = hausaufgaben::PKG_VERSION)]
#[command(about = "Hausaufgaben document API daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise tracing (default: info; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "hausd stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Everything that can be misconfigured is checked before the socket
    // is bound.
    let config =
        Config::load(args.config.as_deref())?.with_env_overrides(|key| std::env::var(key).ok())?;
    let credentials = Credentials::from_env(config.backend.kind, config.backend.key_style)?;
    let document = config.backend.document_ref()?;
    let addr = config.listen_addr()?;

    let backend = backend::connect(&credentials, config.backend.timeout())?;
    let cache = DocumentCache::new(backend, document, config.cache_config());
    let state = Arc::new(AppState::new(cache, config.backend.kind.display_name()));

    // Prime the cache in the background; failures are logged by the cache.
    let warmup = Arc::clone(&state);
    tokio::spawn(async move {
        let _ = warmup.cache.refresh().await;
    });

    let listener = TcpListener::bind(addr).await?;
    info!(
        version = hausaufgaben::version_string(),
        %addr,
        backend = state.cache.backend_name(),
        policy = ?config.cache.policy,
        "hausd listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hausd shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
}
