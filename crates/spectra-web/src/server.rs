//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::api::{self, AppState};

/// Uploads above this size are rejected before extraction.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Build the full axum router.
///
/// The router serves the JSON endpoints plus, when `static_dir` is given,
/// the frontend assets as a fallback.
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    // CORS layer for development (frontend dev server on a different port).
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/apply_filter", post(api::apply_filter))
        .route("/start_study_session", post(api::start_study_session))
        .route("/check_unlock", post(api::check_unlock))
        .route("/get_hint", post(api::get_hint))
        .route("/extract_pdf", post(api::extract_pdf))
        .route("/healthz", get(api::healthz))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    let mut router = Router::new().merge(api_routes).layer(cors);

    // Serve prebuilt frontend assets in production mode.
    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
}

/// Start the axum server and return the bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind(bind_addr).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}
