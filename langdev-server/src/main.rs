//! LangDev web service
//!
//! Serves a seeded forum over HTTP, negotiating HTML, JSON or property
//! lists per request, plus the third-party SSO endpoint.
//!
//! Usage:
//!   langdev-server --data seed.json --port 8080

use anyhow::{Context, Result};
use clap::Parser;
use langdev_server::{AppState, MemoryStore, build_router};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "langdev-server")]
#[command(about = "LangDev forum and SSO web service")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Seed document with users, posts, comments and applications
    #[arg(short, long)]
    data: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("LangDev server starting...");
    let store = MemoryStore::load(&args.data)
        .with_context(|| format!("Failed to load seed {}", args.data.display()))?;
    info!(
        users = store.users_count(),
        posts = store.posts_count(),
        "Seed loaded"
    );

    let app = build_router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .context("Failed to bind HTTP port")?;
    info!("HTTP listening on port {}", args.port);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
