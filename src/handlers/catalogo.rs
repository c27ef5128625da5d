// src/handlers/catalogo.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::catalogo::TipoUnidade};

// ---
// Fornecedores
// ---

#[derive(Debug, Deserialize, Validate)]
pub struct FornecedorPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,
}

pub async fn listar_fornecedores(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let fornecedores = app_state.catalogo_service.listar_fornecedores().await?;
    Ok((StatusCode::OK, Json(fornecedores)))
}

pub async fn criar_fornecedor(
    State(app_state): State<AppState>,
    Json(payload): Json<FornecedorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let fornecedor = app_state
        .catalogo_service
        .criar_fornecedor(&payload.nome)
        .await?;
    Ok((StatusCode::CREATED, Json(fornecedor)))
}

pub async fn renomear_fornecedor(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FornecedorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let fornecedor = app_state
        .catalogo_service
        .renomear_fornecedor(id, &payload.nome)
        .await?;
    Ok((StatusCode::OK, Json(fornecedor)))
}

pub async fn excluir_fornecedor(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalogo_service.excluir_fornecedor(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Categorias
// ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoriaPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,
    pub tipo_unidade: TipoUnidade,
}

pub async fn listar_categorias(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categorias = app_state.catalogo_service.listar_categorias().await?;
    Ok((StatusCode::OK, Json(categorias)))
}

pub async fn criar_categoria(
    State(app_state): State<AppState>,
    Json(payload): Json<CategoriaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let categoria = app_state
        .catalogo_service
        .criar_categoria(&payload.nome, payload.tipo_unidade)
        .await?;
    Ok((StatusCode::CREATED, Json(categoria)))
}

pub async fn atualizar_categoria(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoriaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let categoria = app_state
        .catalogo_service
        .atualizar_categoria(id, &payload.nome, payload.tipo_unidade)
        .await?;
    Ok((StatusCode::OK, Json(categoria)))
}

pub async fn excluir_categoria(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalogo_service.excluir_categoria(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
