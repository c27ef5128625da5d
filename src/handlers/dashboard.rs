// src/handlers/dashboard.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{common::error::AppError, config::AppState};

pub async fn resumo(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let resumo = app_state.dashboard_service.resumo().await?;
    Ok((StatusCode::OK, Json(resumo)))
}

pub async fn itens_criticos(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let itens = app_state.dashboard_service.itens_criticos().await?;
    Ok((StatusCode::OK, Json(itens)))
}
