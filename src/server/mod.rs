mod handlers;
mod state;
mod static_files;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::catalog::Catalog;
pub use state::AppState;

pub fn build_router(catalog: Catalog, access_key: Option<String>) -> Router {
    let state = Arc::new(AppState { catalog, access_key });

    let api = Router::new()
        .route("/api/search", get(handlers::search))
        .route("/api/export", get(handlers::export))
        .route("/api/settlements", get(handlers::settlements))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_access_key,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/style.css", get(handlers::style))
        .route("/app.js", get(handlers::script))
        .merge(api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, catalog: Catalog, access_key: Option<String>) {
    let gated = access_key.is_some();
    let app = build_router(catalog, access_key);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Perimetre server listening on http://{}", addr);
    if gated {
        eprintln!("  API access is gated: pass the key via 'x-access-key' header or '?key='.");
    }
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        });
}
