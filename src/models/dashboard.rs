// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

// Números agregados do painel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumoEstoque {
    pub total_itens: i64,
    pub total_unidades: i64,
    pub valor_total: Decimal,
    pub itens_criticos: i64,
}

// Item abaixo do estoque mínimo. É isto que a camada de alertas consome.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItemCritico {
    pub id: Uuid,
    pub produto: String,
    pub total_unidades: i64,
    pub estoque_minimo: i64,
}
