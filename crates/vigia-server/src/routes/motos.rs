//! `/api/motos` routes, including the plate lookup and presence listing.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use vigia_store::sqlite::repositories::moto::ListMotosOptions;
use vigia_store::store::fleet_store::{MotoPatch, NewMoto};

use crate::errors::ApiError;
use crate::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(remove))
        .route("/placa/{placa}", get(by_placa))
        .route("/presentes", get(presentes))
}

/// Query parameters accepted by `GET /api/motos`.
#[derive(Debug, Default, Deserialize)]
struct MotoListParams {
    marca: Option<String>,
    modelo: Option<String>,
    cor: Option<String>,
    presente: Option<String>,
    skip: Option<i64>,
    take: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<MotoListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store.list_motos(&ListMotosOptions {
        marca_contains: params.marca.as_deref(),
        modelo_contains: params.modelo.as_deref(),
        cor: params.cor.as_deref(),
        presente: params.presente.as_deref(),
        skip: params.skip,
        take: params.take,
    })?;
    Ok(Json(rows))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let moto = state.store.get_moto(id)?;
    Ok(Json(moto))
}

async fn by_placa(
    State(state): State<AppState>,
    Path(placa): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if placa.trim().is_empty() {
        return Err(ApiError::bad_request("Placa não pode ser vazia."));
    }
    match state.store.get_moto_by_placa(&placa)? {
        Some(moto) => Ok(Json(moto)),
        None => Err(ApiError::not_found(format!(
            "Moto com placa {placa} não encontrada."
        ))),
    }
}

async fn presentes(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store.list_motos(&ListMotosOptions {
        presente: Some("Sim"),
        ..Default::default()
    })?;
    Ok(Json(rows))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewMoto>,
) -> Result<impl IntoResponse, ApiError> {
    let moto = state.store.create_moto(&input)?;
    let location = format!("/api/motos/{}", moto.id_moto);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(moto),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<MotoPatch>,
) -> Result<StatusCode, ApiError> {
    let _ = state.store.update_moto(id, &patch)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_moto(id)?;
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

    async fn create_moto(app: &axum::Router, placa: &str, presente: &str) {
        let resp = app
            .clone()
            .oneshot(json_req(
                "POST",
                "/api/motos",
                serde_json::json!({
                    "placa": placa,
                    "marca": "Honda",
                    "modelo": "CB 500",
                    "cor": "Preta",
                    "presente": presente
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn create_uppercases_placa() {
        let (app, _store) = test_app();
        create_moto(&app, "abc1234", "Sim").await;

        let resp = app.oneshot(get_req("/api/motos/1")).await.unwrap();
        let moto = body_json(resp).await;
        assert_eq!(moto["placa"], "ABC1234");
    }

    #[tokio::test]
    async fn lookup_by_placa_is_case_insensitive() {
        let (app, _store) = test_app();
        create_moto(&app, "ABC1234", "Sim").await;

        let resp = app
            .clone()
            .oneshot(get_req("/api/motos/placa/abc1234"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let moto = body_json(resp).await;
        assert_eq!(moto["id_moto"], 1);

        let resp = app
            .oneshot(get_req("/api/motos/placa/ZZZ9999"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let err = body_json(resp).await;
        assert_eq!(err["message"], "Moto com placa ZZZ9999 não encontrada.");
    }

    #[tokio::test]
    async fn presentes_lists_only_present() {
        let (app, _store) = test_app();
        create_moto(&app, "ABC1234", "Sim").await;
        create_moto(&app, "DEF5678", "Não").await;

        let resp = app.oneshot(get_req("/api/motos/presentes")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let found = body_json(resp).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["placa"], "ABC1234");
    }

    #[tokio::test]
    async fn wrong_length_placa_is_400() {
        let (app, _store) = test_app();
        let resp = app
            .oneshot(json_req(
                "POST",
                "/api/motos",
                serde_json::json!({
                    "placa": "ABC123",
                    "marca": "Honda",
                    "modelo": "CB 500",
                    "cor": "Preta"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_placa_conflicts() {
        let (app, _store) = test_app();
        create_moto(&app, "ABC1234", "Sim").await;
        let resp = app
            .oneshot(json_req(
                "POST",
                "/api/motos",
                serde_json::json!({
                    "placa": "abc1234",
                    "marca": "Yamaha",
                    "modelo": "MT-03",
                    "cor": "Azul"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let err = body_json(resp).await;
        assert_eq!(err["message"], "Moto com placa 'ABC1234' já existe.");
    }

    #[tokio::test]
    async fn list_filters_by_marca_substring() {
        let (app, _store) = test_app();
        create_moto(&app, "ABC1234", "Sim").await;
        let resp = app
            .clone()
            .oneshot(get_req("/api/motos?marca=hon"))
            .await
            .unwrap();
        let found = body_json(resp).await;
        assert_eq!(found.as_array().unwrap().len(), 1);

        let resp = app
            .oneshot(get_req("/api/motos?marca=yamaha"))
            .await
            .unwrap();
        let found = body_json(resp).await;
        assert!(found.as_array().unwrap().is_empty());
    }
}
