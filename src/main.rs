//! Alias resolver service.
//!
//! # Architecture Overview
//!
//! ```text
//!   dynamics/config.yaml
//!          │  (first resolver call)
//!          ▼
//!   ┌──────────────┐     ┌────────────┐
//!   │ ConfigCache  │────▶│  Resolver  │◀──── Registry (app::registry)
//!   └──────────────┘     └─────┬──────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//!        ┌────────────┐                ┌────────────┐
//!        │ TaskRunner │                │ HttpServer │
//!        │ startup /  │                │   GET /    │
//!        │ shutdown   │                └────────────┘
//!        └────────────┘
//! ```
//!
//! Startup tasks run before the listener is bound; shutdown tasks run after
//! the server has drained.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use alias_resolver::lifecycle::signals::shutdown_signal;
use alias_resolver::observability::logging;
use alias_resolver::{app, ConfigCache, HttpServer, Resolver, Shutdown, TaskRunner};

#[derive(Parser)]
#[command(name = "alias-resolver")]
#[command(about = "Serve alias lookups and run configured lifecycle tasks", long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    bind: String,

    /// Directory to start the project root search from
    /// (defaults to the executable's directory).
    #[arg(long)]
    search_from: Option<PathBuf>,

    /// Log level for this crate when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    tracing::info!("alias-resolver v{} starting", env!("CARGO_PKG_VERSION"));

    let cache = match cli.search_from {
        Some(dir) => ConfigCache::new(dir),
        None => ConfigCache::from_executable(),
    };
    tracing::debug!(start = %cache.start_dir().display(), "Project root search start");

    let resolver = Arc::new(Resolver::new(Arc::new(cache), Arc::new(app::registry())));
    let runner = Arc::new(TaskRunner::new(resolver.clone()));

    // Config load and startup tasks may block; keep them off the async workers.
    let startup = runner.clone();
    tokio::task::spawn_blocking(move || {
        startup.preflight()?;
        startup.run_startup_tasks()
    })
    .await??;

    let listener = TcpListener::bind(&cli.bind).await?;
    let shutdown = Shutdown::new();
    let server = HttpServer::new(resolver.clone());
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let stopped_early = tokio::select! {
        _ = shutdown_signal() => None,
        res = &mut server_task => Some(res),
    };
    match stopped_early {
        None => {
            shutdown.trigger();
            server_task.await??;
        }
        Some(res) => res??,
    }

    let report = tokio::task::spawn_blocking(move || runner.run_shutdown_tasks()).await??;
    if !report.is_clean() {
        tracing::warn!(
            failed = report.failed.len(),
            abandoned = ?report.abandoned,
            "Shutdown finished with problems"
        );
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
