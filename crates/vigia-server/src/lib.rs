//! # vigia-server
//!
//! Thin axum HTTP layer over [`vigia_store::FleetStore`].
//!
//! Each entity gets a REST collection under `/api`: `GET /` (filters +
//! skip/take), `GET /{id}`, `POST /` (201 + Location), `PUT /{id}` (204),
//! `DELETE /{id}` (204) — plus the convenience lookups
//! (`/api/motos/placa/{placa}`, `/api/motos/presentes`,
//! `/api/cargos/nivel/{nivel}`, `/api/cargos/search/{termo}`). Store errors
//! map onto 400/404/409/500 in [`errors`].

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod health;
pub mod routes;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ServerConfig;
pub use errors::ApiError;
pub use server::{AppState, VigiaServer};
