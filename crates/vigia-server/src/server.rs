//! `VigiaServer` — Axum HTTP server over the fleet store.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vigia_store::FleetStore;

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::routes;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The fleet store, shared across handlers.
    pub store: Arc<FleetStore>,
    /// When the server started.
    pub start_time: Instant,
}

/// The main Vigia server.
pub struct VigiaServer {
    config: ServerConfig,
    store: Arc<FleetStore>,
    start_time: Instant,
}

impl VigiaServer {
    /// Create a new server over a store.
    pub fn new(config: ServerConfig, store: Arc<FleetStore>) -> Self {
        Self {
            config,
            store,
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            store: self.store.clone(),
            start_time: self.start_time,
        };

        // The upstream API is consumed from browsers on other origins, so
        // CORS stays wide open.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(health_handler))
            .nest("/api", routes::api_router())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the store.
    pub fn store(&self) -> &Arc<FleetStore> {
        &self.store
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
