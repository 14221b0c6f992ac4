//! `/api/reconhecimentos` routes.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use vigia_store::sqlite::repositories::reconhecimento::ListReconhecimentosOptions;
use vigia_store::store::fleet_store::{NewReconhecimento, ReconhecimentoPatch};

use crate::errors::ApiError;
use crate::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
}

/// Query parameters accepted by `GET /api/reconhecimentos`.
#[derive(Debug, Default, Deserialize)]
struct ReconhecimentoListParams {
    id_moto: Option<i64>,
    id_camera: Option<i64>,
    precisao_minima: Option<f64>,
    skip: Option<i64>,
    take: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<ReconhecimentoListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .store
        .list_reconhecimentos(&ListReconhecimentosOptions {
            id_moto: params.id_moto,
            id_camera: params.id_camera,
            precisao_min: params.precisao_minima,
            skip: params.skip,
            take: params.take,
        })?;
    Ok(Json(rows))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let reconhecimento = state.store.get_reconhecimento(id)?;
    Ok(Json(reconhecimento))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewReconhecimento>,
) -> Result<impl IntoResponse, ApiError> {
    let reconhecimento = state.store.create_reconhecimento(&input)?;
    let location = format!("/api/reconhecimentos/{}", reconhecimento.id_reconhecimento);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(reconhecimento),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ReconhecimentoPatch>,
) -> Result<StatusCode, ApiError> {
    let _ = state.store.update_reconhecimento(id, &patch)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_reconhecimento(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
