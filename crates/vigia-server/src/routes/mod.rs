//! Per-entity route modules, nested under `/api`.

use axum::Router;

use crate::server::AppState;

pub mod cameras;
pub mod cargos;
pub mod logs;
pub mod motos;
pub mod reconhecimentos;
pub mod registros;
pub mod usuarios;

/// Build the `/api` router with every entity mounted.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/cargos", cargos::router())
        .nest("/usuarios", usuarios::router())
        .nest("/motos", motos::router())
        .nest("/cameras", cameras::router())
        .nest("/reconhecimentos", reconhecimentos::router())
        .nest("/registros", registros::router())
        .nest("/logs", logs::router())
}
