//! Browser-facing HTTP surface for the spectra study filters.
//!
//! `spectra-web` wraps [`spectra_core`] in an axum server: one JSON endpoint
//! applies any of the six filters, a pair of endpoints drives the time-locked
//! study session, and a multipart endpoint extracts text from uploaded PDFs.
//! Callers are identified by a `spectra_sid` cookie so a session lock
//! survives page reloads.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use spectra_core::time::Clock;
//! use spectra_core::{FilterSet, GeminiClient, SessionLockManager};
//! use spectra_web::{AppState, WebConfig, spawn_web};
//!
//! let client = Arc::new(GeminiClient::from_env()?);
//! let state = AppState {
//!     filters: Arc::new(FilterSet::with_default_filters(client.clone())),
//!     sessions: Arc::new(SessionLockManager::new(client, Clock::Default)),
//! };
//!
//! let addr = spawn_web(state, WebConfig::default()).await;
//! println!("Study filters: http://{addr}");
//! ```
//!
//! # Endpoints
//!
//! | Route                  | Method | Purpose                        |
//! |------------------------|--------|--------------------------------|
//! | `/apply_filter`        | POST   | Run one filter over text       |
//! | `/start_study_session` | POST   | Lock in a study session        |
//! | `/check_unlock`        | POST   | Score an unlock attempt        |
//! | `/get_hint`            | POST   | First-letter hint for a blank  |
//! | `/extract_pdf`         | POST   | Text from an uploaded PDF      |
//! | `/healthz`             | GET    | Liveness probe                 |

mod api;
pub mod identity;
pub mod pdf;
mod server;

pub use api::AppState;
pub use server::{build_router, start_server};

use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:5000`.
    pub bind_addr: SocketAddr,
    /// Directory of prebuilt frontend assets served at `/`.
    ///
    /// If `None`, only the JSON endpoints are served — the frontend runs
    /// separately during development.
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            static_dir: None,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// Binding port 0 picks an ephemeral port, which is how the integration
/// tests run against a live server. The server runs until the Tokio
/// runtime shuts down.
pub async fn spawn_web(state: AppState, config: WebConfig) -> SocketAddr {
    let router = server::build_router(state, config.static_dir);
    server::start_server(router, config.bind_addr).await
}
