//! marquee-resolver - title resolution service
//!
//! `serve` (the default) runs the HTTP API. `resolve` and `search` run a single
//! lookup and print JSON to stdout.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use marquee_common::config::{resolve_config, ConfigOverrides, TomlConfig};
use marquee_common::events::progress_channel;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_resolver::api::titles::TitleResponse;
use marquee_resolver::{AppState, TitleId};

/// Command-line arguments for marquee-resolver
#[derive(Parser, Debug)]
#[command(name = "marquee-resolver")]
#[command(about = "Movie and series title resolver")]
#[command(version)]
struct Args {
    /// Configuration file (default: <config_dir>/marquee/marquee.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Resolve one title (id or any text containing one) and print it
    Resolve { text: String },
    /// Search titles by free text and print the hits
    Search { query: String },
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            host: self.host.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args.overrides()).context("Failed to load configuration")?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "marquee_resolver={level},marquee_common={level},tower_http={level}",
                    level = level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let state = AppState::from_config(&config).context("Failed to initialize resolver")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, state).await,
        Command::Resolve { text } => resolve_once(&state, &text).await,
        Command::Search { query } => search_once(&state, &query).await,
    }
}

async fn serve(config: &TomlConfig, state: AppState) -> Result<()> {
    info!("Starting marquee-resolver v{}", env!("CARGO_PKG_VERSION"));

    let app = marquee_resolver::build_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", config.host, config.port))?;
    let addr: SocketAddr = listener.local_addr().context("Failed to read bound address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn resolve_once(state: &AppState, text: &str) -> Result<()> {
    let id = TitleId::find(text).ok_or_else(|| anyhow!("No title id in {:?}", text))?;

    let (tx, mut rx) = progress_channel();
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            info!(stage = %event.stage, "{}", event.status);
        }
    });

    let outcome = state.resolver.resolve(&id, Some(&tx)).await;
    drop(tx);
    let _ = progress.await;

    let record = outcome.with_context(|| format!("Failed to resolve {}", id))?;
    let response = TitleResponse::new(record, &state.decorations);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn search_once(state: &AppState, query: &str) -> Result<()> {
    let hits = state
        .search
        .search(query)
        .await
        .with_context(|| format!("Search failed for {:?}", query))?;
    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
