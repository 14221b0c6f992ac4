//! `/api/cargos` routes.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use vigia_store::sqlite::repositories::cargo::ListCargosOptions;
use vigia_store::store::fleet_store::{CargoPatch, NewCargo};

use crate::errors::ApiError;
use crate::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
        .route("/nivel/{nivel}", get(by_nivel))
        .route("/search/{termo}", get(search))
}

/// Query parameters accepted by `GET /api/cargos`.
#[derive(Debug, Default, Deserialize)]
struct CargoListParams {
    nome: Option<String>,
    nivel_permissao: Option<i64>,
    skip: Option<i64>,
    take: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<CargoListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store.list_cargos(&ListCargosOptions {
        nivel: params.nivel_permissao,
        nome_contains: params.nome.as_deref(),
        skip: params.skip,
        take: params.take,
    })?;
    Ok(Json(rows))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let cargo = state.store.get_cargo(id)?;
    Ok(Json(cargo))
}

async fn by_nivel(
    State(state): State<AppState>,
    Path(nivel): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store.list_cargos(&ListCargosOptions {
        nivel: Some(nivel),
        ..Default::default()
    })?;
    Ok(Json(rows))
}

async fn search(
    State(state): State<AppState>,
    Path(termo): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if termo.trim().is_empty() {
        return Err(ApiError::bad_request("Termo de busca não pode ser vazio."));
    }
    let rows = state.store.list_cargos(&ListCargosOptions {
        nome_contains: Some(&termo),
        ..Default::default()
    })?;
    Ok(Json(rows))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewCargo>,
) -> Result<impl IntoResponse, ApiError> {
    let cargo = state.store.create_cargo(&input)?;
    let location = format!("/api/cargos/{}", cargo.id_cargo);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(cargo),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<CargoPatch>,
) -> Result<StatusCode, ApiError> {
    let _ = state.store.update_cargo(id, &patch)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_cargo(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
