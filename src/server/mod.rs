//! # HTTP Server for Certificate Management
//!
//! Exposes the admin surface (recipients, import, bulk generation, schema
//! export/import, rendering) and the public certificate query endpoint.
//!
//! ## Usage
//!
//! ```bash
//! certatelier serve --listen 0.0.0.0:8080 --font fonts/NotoSansSC-Regular.ttf
//! ```

mod handlers;
mod state;

pub use state::ServerConfig;

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::error::CertError;
use crate::render::{Compositor, font::LoadedFont};
use state::{AppState, BACKGROUND_EXPIRATION_SECS};

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use certatelier::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), certatelier::error::CertError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     font_path: "fonts/NotoSansSC-Regular.ttf".into(),
///     bold_font_path: None,
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), CertError> {
    let font = LoadedFont::from_files(&config.font_path, config.bold_font_path.as_deref())?;
    let app_state = Arc::new(AppState::new(config.clone(), Compositor::new(font))?);

    // Spawn background cache cleanup task
    tokio::spawn(cleanup_backgrounds(app_state.clone()));

    let app = Router::new()
        // Public query
        .route("/api/query", post(handlers::query::query))
        // Recipient administration
        .route("/api/recipients", get(handlers::recipients::list))
        .route(
            "/api/recipients/:id/enabled",
            put(handlers::recipients::set_enabled),
        )
        .route(
            "/api/recipients/:id/overrides/:key",
            put(handlers::recipients::set_override)
                .delete(handlers::recipients::clear_override),
        )
        // Import pipeline
        .route("/api/import/validate", post(handlers::recipients::validate_import))
        .route("/api/import/confirm", post(handlers::recipients::confirm_import))
        .route("/api/import/close", post(handlers::recipients::close_import))
        // Bulk generation
        .route("/api/bulk/generate", post(handlers::bulk::generate))
        .route("/api/bulk/progress", get(handlers::bulk::progress))
        // Templates and schemas
        .route("/api/templates", get(handlers::schema::templates))
        .route(
            "/api/templates/:code/schema",
            get(handlers::schema::export).put(handlers::schema::import),
        )
        // Rendering
        .route("/api/render/:id", post(handlers::render::render))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    println!("Certatelier HTTP server starting...");
    println!("Listening on: {}", config.listen_addr);
    println!("Font: {}", config.font_path.display());
    println!();

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task to drop stale cached background images.
async fn cleanup_backgrounds(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    let expiration = Duration::from_secs(BACKGROUND_EXPIRATION_SECS);

    loop {
        interval.tick().await;
        state.backgrounds.evict_expired(expiration).await;
    }
}
