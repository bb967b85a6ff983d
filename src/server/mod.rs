//! # HTTP API
//!
//! axum router exposing the steganography codec to the web frontend.
//!
//! | Route            | Method | Body (multipart)                                   | Response                         |
//! |------------------|--------|----------------------------------------------------|----------------------------------|
//! | `/api/health`    | GET    | -                                                  | JSON status                      |
//! | `/api/encode`    | POST   | `file`, `pin`, `message` or `secret_file`, `mode`, `decoy_message`, `decoy_pin` | PNG carrier |
//! | `/api/decode`    | POST   | `file`, `pin`                                      | JSON payload, or glitched PNG    |
//! | `/api/analyze`   | POST   | `file`, `channel`                                  | PNG LSB bit-plane                |

pub mod api;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use log::info;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::common::config::MirageConfig;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub config: MirageConfig,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/api/health", get(api::health_check))
        .route("/api/encode", post(api::encode_handler))
        .route("/api/decode", post(api::decode_handler))
        .route("/api/analyze", post(api::analyze_handler));

    if let Some(dir) = &state.config.server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve until the process stops.
pub async fn run(config: MirageConfig) -> Result<()> {
    let addr = config.server.address.clone();
    let state = Arc::new(AppState { config });
    let app = router(state);

    info!("🌐 Web server running on http://{}", addr);
    info!("📡 API endpoints: /api/encode, /api/decode, /api/analyze");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
