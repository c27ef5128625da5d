// src/handlers/producao.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, handlers::estoque::PaginacaoQuery};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IniciarProducaoPayload {
    #[validate(required(message = "O campo 'itemId' é obrigatório."))]
    pub item_id: Option<Uuid>,

    #[validate(required(message = "O campo 'dataInicio' é obrigatório."))]
    pub data_inicio: Option<NaiveDate>,
}

pub async fn iniciar(
    State(app_state): State<AppState>,
    Json(payload): Json<IniciarProducaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let sessao = app_state
        .producao_service
        .iniciar(payload.item_id.unwrap(), payload.data_inicio.unwrap())
        .await?;

    Ok((StatusCode::CREATED, Json(sessao)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FinalizarProducaoPayload {
    #[validate(required(message = "O campo 'dataFim' é obrigatório."))]
    pub data_fim: Option<NaiveDate>,

    // Ausente significa "não contabilizado", não zero.
    #[validate(range(min = 0, message = "A contagem de etiquetas não pode ser negativa."))]
    pub etiquetas_geradas: Option<i64>,
}

pub async fn finalizar(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FinalizarProducaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let sessao = app_state
        .producao_service
        .finalizar(id, payload.data_fim.unwrap(), payload.etiquetas_geradas)
        .await?;

    Ok((StatusCode::OK, Json(sessao)))
}

pub async fn listar(
    State(app_state): State<AppState>,
    Query(paginacao): Query<PaginacaoQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, per_page) = paginacao.normalizada();
    let sessoes = app_state.producao_service.listar(page, per_page).await?;
    Ok((StatusCode::OK, Json(sessoes)))
}
