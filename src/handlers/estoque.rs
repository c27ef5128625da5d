// src/handlers/estoque.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{common::error::AppError, config::AppState};

// ---
// Validação customizada para campos monetários
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// Paginação padrão das listagens.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginacaoQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PaginacaoQuery {
    pub fn normalizada(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(50).clamp(1, 200);
        (page, per_page)
    }
}

// ---
// Payload: entrada de estoque
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EntradaEstoquePayload {
    #[validate(length(min = 1, message = "O produto é obrigatório."))]
    pub produto: String,

    pub fornecedor_id: Option<Uuid>,

    #[validate(required(message = "O campo 'categoriaId' é obrigatório."))]
    pub categoria_id: Option<Uuid>,

    // Os tetos mantêm a conversão para total de unidades longe do
    // estouro de i64 (1 milhão de cartelas = 5 bilhões de etiquetas).
    #[validate(range(
        min = 0,
        max = 1_000_000,
        message = "Pacotes fora do intervalo permitido."
    ))]
    #[serde(default)]
    pub pacotes: i64,

    #[validate(range(
        min = 0,
        max = 1_000_000_000,
        message = "Unidades avulsas fora do intervalo permitido."
    ))]
    #[serde(default)]
    pub unidades_avulsas: i64,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub custo_por_pacote: Decimal,

    #[validate(range(
        min = 0,
        max = 1_000_000_000,
        message = "O estoque mínimo está fora do intervalo permitido."
    ))]
    #[serde(default)]
    pub estoque_minimo: i64,

    #[validate(required(message = "O campo 'ultimaEntrada' é obrigatório."))]
    pub ultima_entrada: Option<NaiveDate>,
}

pub async fn registrar_entrada(
    State(app_state): State<AppState>,
    Json(payload): Json<EntradaEstoquePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .estoque_service
        .registrar_entrada(
            &payload.produto,
            payload.fornecedor_id,
            payload.categoria_id.unwrap(),
            payload.pacotes,
            payload.unidades_avulsas,
            payload.custo_por_pacote,
            payload.estoque_minimo,
            payload.ultima_entrada.unwrap(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn listar_estoque(
    State(app_state): State<AppState>,
    Query(paginacao): Query<PaginacaoQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, per_page) = paginacao.normalizada();
    let itens = app_state.estoque_service.listar_estoque(page, per_page).await?;
    Ok((StatusCode::OK, Json(itens)))
}

pub async fn excluir_item(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.estoque_service.excluir_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Payload: saída de estoque
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaidaPayload {
    #[validate(required(message = "O campo 'itemId' é obrigatório."))]
    pub item_id: Option<Uuid>,

    #[validate(required(message = "O campo 'data' é obrigatório."))]
    pub data: Option<NaiveDate>,

    #[validate(range(
        min = 1,
        max = 1_000_000_000,
        message = "A quantidade deve ficar entre 1 e 1 bilhão."
    ))]
    pub total_unidades: i64,

    pub destino: Option<String>,
}

pub async fn registrar_saida(
    State(app_state): State<AppState>,
    Json(payload): Json<SaidaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let saida = app_state
        .estoque_service
        .registrar_saida(
            payload.item_id.unwrap(),
            payload.data.unwrap(),
            payload.total_unidades,
            payload.destino.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(saida)))
}

pub async fn listar_saidas(
    State(app_state): State<AppState>,
    Query(paginacao): Query<PaginacaoQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, per_page) = paginacao.normalizada();
    let saidas = app_state.estoque_service.listar_saidas(page, per_page).await?;
    Ok((StatusCode::OK, Json(saidas)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrada_base() -> EntradaEstoquePayload {
        EntradaEstoquePayload {
            produto: "Etiqueta X".to_string(),
            fornecedor_id: None,
            categoria_id: Some(Uuid::new_v4()),
            pacotes: 1,
            unidades_avulsas: 0,
            custo_por_pacote: Decimal::from(100),
            estoque_minimo: 500,
            ultima_entrada: Some("2025-06-02".parse().unwrap()),
        }
    }

    #[test]
    fn entrada_dentro_dos_limites_passa() {
        assert!(entrada_base().validate().is_ok());
    }

    #[test]
    fn entrada_com_pacotes_gigantes_eh_rejeitada() {
        // Acima do teto a multiplicação por 5000 estouraria o i64.
        let mut payload = entrada_base();
        payload.pacotes = 2_000_000_000_000_000;
        assert!(payload.validate().is_err());

        payload = entrada_base();
        payload.unidades_avulsas = i64::MAX;
        assert!(payload.validate().is_err());
    }

    #[test]
    fn entrada_sem_categoria_eh_rejeitada() {
        let mut payload = entrada_base();
        payload.categoria_id = None;
        assert!(payload.validate().is_err());
    }

    #[test]
    fn saida_sem_data_eh_rejeitada() {
        let payload = SaidaPayload {
            item_id: Some(Uuid::new_v4()),
            data: None,
            total_unidades: 100,
            destino: None,
        };
        assert!(payload.validate().is_err());
    }
}
