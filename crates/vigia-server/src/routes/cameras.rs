//! `/api/cameras` routes.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use vigia_store::sqlite::repositories::camera::ListCamerasOptions;
use vigia_store::store::fleet_store::{CameraPatch, NewCamera};

use crate::errors::ApiError;
use crate::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
}

/// Query parameters accepted by `GET /api/cameras`.
#[derive(Debug, Default, Deserialize)]
struct CameraListParams {
    status: Option<String>,
    skip: Option<i64>,
    take: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<CameraListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store.list_cameras(&ListCamerasOptions {
        status: params.status.as_deref(),
        skip: params.skip,
        take: params.take,
    })?;
    Ok(Json(rows))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let camera = state.store.get_camera(id)?;
    Ok(Json(camera))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewCamera>,
) -> Result<impl IntoResponse, ApiError> {
    let camera = state.store.create_camera(&input)?;
    let location = format!("/api/cameras/{}", camera.id_camera);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(camera),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<CameraPatch>,
) -> Result<StatusCode, ApiError> {
    let _ = state.store.update_camera(id, &patch)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_camera(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::test_support::{body_json, get_req, json_req, test_app};

    #[tokio::test]
    async fn create_defaults_status() {
        let (app, _store) = test_app();
        let resp = app
            .clone()
            .oneshot(json_req(
                "POST",
                "/api/cameras",
                serde_json::json!({"localizacao": "Portão de Entrada"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body_json(resp).await;
        assert_eq!(created["status"], "ativo");
        assert!(created["ultima_verificacao"].is_string());
    }

    #[tokio::test]
    async fn short_localizacao_is_400() {
        let (app, _store) = test_app();
        let resp = app
            .oneshot(json_req(
                "POST",
                "/api/cameras",
                serde_json::json!({"localizacao": "ab"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (app, _store) = test_app();
        for (loc, status) in [("Portão de Entrada", "ativo"), ("Garagem Sul", "inativo")] {
            let resp = app
                .clone()
                .oneshot(json_req(
                    "POST",
                    "/api/cameras",
                    serde_json::json!({"localizacao": loc, "status": status}),
                ))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let resp = app
            .oneshot(get_req("/api/cameras?status=ATIVO"))
            .await
            .unwrap();
        let found = body_json(resp).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["localizacao"], "Portão de Entrada");
    }

    #[tokio::test]
    async fn noop_update_keeps_ultima_verificacao() {
        let (app, store) = test_app();
        let resp = app
            .clone()
            .oneshot(json_req(
                "POST",
                "/api/cameras",
                serde_json::json!({"localizacao": "Garagem Norte", "status": "ativo"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let before = store.get_camera(1).unwrap().ultima_verificacao;

        let resp = app
            .oneshot(json_req(
                "PUT",
                "/api/cameras/1",
                serde_json::json!({"status": "ativo"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(store.get_camera(1).unwrap().ultima_verificacao, before);
    }
}
