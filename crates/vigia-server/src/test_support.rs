//! Shared helpers for route tests: an app over a fresh in-memory store and
//! request/body builders.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use vigia_store::{new_in_memory, run_migrations, ConnectionConfig, FleetStore};

use crate::config::ServerConfig;
use crate::server::VigiaServer;

/// Build a router over a migrated in-memory store.
pub fn test_app() -> (Router, Arc<FleetStore>) {
    let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
    {
        let conn = pool.get().unwrap();
        run_migrations(&conn).unwrap();
    }
    let store = Arc::new(FleetStore::new(pool));
    let server = VigiaServer::new(ServerConfig::default(), store.clone());
    (server.router(), store)
}

/// A GET request.
pub fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// A DELETE request.
pub fn delete_req(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// A request with a JSON body.
pub fn json_req(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect and parse a JSON response body.
pub async fn body_json(resp: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
