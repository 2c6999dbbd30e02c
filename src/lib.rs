pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod store;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: store::EventStore,
}

impl AppState {
    pub fn new(db: &database::Database) -> Arc<Self> {
        Arc::new(Self {
            store: store::EventStore::new(db.pool.clone()),
        })
    }
}

/// Builds the full HTTP application around `state`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(controllers::routes())
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "The requested URL was not found on the server." })),
            )
        })
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
