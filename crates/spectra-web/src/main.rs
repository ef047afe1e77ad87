//! Study filter server.
//!
//! Serves the six cognitive filters and the time-locked study session
//! behind a JSON API, plus optional prebuilt frontend assets.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p spectra-web
//! GEMINI_API_KEY=... cargo run -p spectra-web -- --port 8080
//! GEMINI_API_KEY=... cargo run -p spectra-web -- --model gemini-2.5-pro
//! cargo run -p spectra-web -- --static-dir frontend/dist
//! ```
//!
//! Without `GEMINI_API_KEY` the server still starts; endpoints that need
//! generation answer 503 until a key is provided.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use spectra_core::time::Clock;
use spectra_core::{FilterSet, GeminiClient, GeminiConfig, SessionLockManager};
use spectra_web::{AppState, build_router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Study filter server.
#[derive(Parser)]
#[command(about = "Cognitive study filters behind a JSON API")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to serve on.
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Directory of frontend assets to serve at `/`.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Gemini model override.
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let filter = EnvFilter::try_from_env("SPECTRA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut gemini = GeminiConfig::from_env();
    if let Some(model) = args.model {
        gemini = gemini.map(|config| config.with_model(model));
    }
    let client = GeminiClient::new(gemini).map_err(|e| e.to_string())?;
    match client.model() {
        Some(model) => info!("generation enabled: model={model}"),
        None => warn!("GEMINI_API_KEY not set; endpoints that need generation will answer 503"),
    }

    let client = Arc::new(client);
    let state = AppState {
        filters: Arc::new(FilterSet::with_default_filters(client.clone())),
        sessions: Arc::new(SessionLockManager::new(client, Clock::Default)),
    };

    let router = build_router(state, args.static_dir);
    let bind_addr = SocketAddr::from((args.bind, args.port));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("failed to bind {bind_addr}: {e}"))?;
    let addr = listener.local_addr().map_err(|e| e.to_string())?;
    info!("serving on http://{addr}");
    axum::serve(listener, router).await.map_err(|e| e.to_string())
}
