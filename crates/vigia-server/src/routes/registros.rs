//! `/api/registros` routes.
//!
//! Responses use the detail projection (placa, usuario name, and camera
//! localizacao of the associated reconhecimento joined in).

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use vigia_store::sqlite::repositories::registro::ListRegistrosOptions;
use vigia_store::store::fleet_store::{NewRegistro, RegistroPatch};

use crate::errors::ApiError;
use crate::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
}

/// Query parameters accepted by `GET /api/registros`.
#[derive(Debug, Default, Deserialize)]
struct RegistroListParams {
    id_moto: Option<i64>,
    id_usuario: Option<i64>,
    tipo: Option<String>,
    modo_registro: Option<String>,
    skip: Option<i64>,
    take: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<RegistroListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store.list_registros(&ListRegistrosOptions {
        id_moto: params.id_moto,
        id_usuario: params.id_usuario,
        tipo: params.tipo.as_deref(),
        modo_registro: params.modo_registro.as_deref(),
        skip: params.skip,
        take: params.take,
    })?;
    Ok(Json(rows))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let registro = state.store.get_registro(id)?;
    Ok(Json(registro))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewRegistro>,
) -> Result<impl IntoResponse, ApiError> {
    let registro = state.store.create_registro(&input)?;
    let location = format!("/api/registros/{}", registro.id_registro);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(registro),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<RegistroPatch>,
) -> Result<StatusCode, ApiError> {
    let _ = state.store.update_registro(id, &patch)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_registro(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
