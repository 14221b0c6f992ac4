//! `/api/logs` routes. The change trail is append-only: list, get, create.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use vigia_store::sqlite::repositories::log_alteracao::ListLogsOptions;
use vigia_store::store::fleet_store::NewLogAlteracao;

use crate::errors::ApiError;
use crate::server::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id))
}

/// Query parameters accepted by `GET /api/logs`.
#[derive(Debug, Default, Deserialize)]
struct LogListParams {
    id_usuario: Option<i64>,
    id_moto: Option<i64>,
    tipo_acao: Option<String>,
    skip: Option<i64>,
    take: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<LogListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.store.list_logs(&ListLogsOptions {
        id_usuario: params.id_usuario,
        id_moto: params.id_moto,
        tipo_acao: params.tipo_acao.as_deref(),
        skip: params.skip,
        take: params.take,
    })?;
    Ok(Json(rows))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let log = state.store.get_log(id)?;
    Ok(Json(log))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewLogAlteracao>,
) -> Result<impl IntoResponse, ApiError> {
    let log = state.store.create_log(&input)?;
    let location = format!("/api/logs/{}", log.id_log);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(log),
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::test_support::{body_json, delete_req, get_req, json_req, test_app};

    async fn seed_refs(app: &axum::Router) {
        let requests = [
            (
                "/api/cargos",
                serde_json::json!({"nome": "Operador", "nivel_permissao": 2, "permissoes": "[]"}),
            ),
            (
                "/api/usuarios",
                serde_json::json!({
                    "nome": "Maria",
                    "email": "maria@ex.com",
                    "senha": "hash",
                    "id_cargo": 1
                }),
            ),
            (
                "/api/motos",
                serde_json::json!({
                    "placa": "ABC1234",
                    "marca": "Honda",
                    "modelo": "CB 500",
                    "cor": "Preta"
                }),
            ),
        ];
        for (uri, body) in requests {
            let resp = app.clone().oneshot(json_req("POST", uri, body)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::CREATED, "seeding {uri}");
        }
    }

    #[tokio::test]
    async fn create_and_filter() {
        let (app, _store) = test_app();
        seed_refs(&app).await;

        for tipo_acao in ["insercao", "edicao"] {
            let resp = app
                .clone()
                .oneshot(json_req(
                    "POST",
                    "/api/logs",
                    serde_json::json!({
                        "id_usuario": 1,
                        "id_moto": 1,
                        "tipo_acao": tipo_acao,
                        "campo_alterado": "presente",
                        "valor_antigo": "Não",
                        "valor_novo": "Sim"
                    }),
                ))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let resp = app
            .clone()
            .oneshot(get_req("/api/logs?tipo_acao=EDICAO"))
            .await
            .unwrap();
        let found = body_json(resp).await;
        assert_eq!(found.as_array().unwrap().len(), 1);

        let resp = app.oneshot(get_req("/api/logs/1")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let log = body_json(resp).await;
        assert_eq!(log["campo_alterado"], "presente");
    }

    #[tokio::test]
    async fn trail_is_append_only() {
        let (app, _store) = test_app();
        seed_refs(&app).await;
        let resp = app
            .clone()
            .oneshot(json_req(
                "POST",
                "/api/logs",
                serde_json::json!({
                    "id_usuario": 1,
                    "id_moto": 1,
                    "tipo_acao": "insercao",
                    "campo_alterado": "placa"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app.clone().oneshot(delete_req("/api/logs/1")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let resp = app
            .oneshot(json_req("PUT", "/api/logs/1", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unknown_moto_is_400() {
        let (app, _store) = test_app();
        seed_refs(&app).await;
        let resp = app
            .oneshot(json_req(
                "POST",
                "/api/logs",
                serde_json::json!({
                    "id_usuario": 1,
                    "id_moto": 5,
                    "tipo_acao": "insercao",
                    "campo_alterado": "placa"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
