// src/models/producao.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "status_producao", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusProducao {
    Aberto,
    Finalizado,
}

// Uma sessão de uso em produção: exatamente 1 unidade do item fica em uso
// entre data_inicio e data_fim. A baixa da unidade acontece na abertura e
// nunca é devolvida ao estoque.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UsoProducao {
    pub id: Uuid,
    pub item_id: Uuid,
    pub produto_nome: String,
    pub data_inicio: NaiveDate,
    pub data_fim: Option<NaiveDate>,
    pub etiquetas_geradas: Option<i64>,
    pub status: StatusProducao,
    pub created_at: DateTime<Utc>,
}

// Sessão com o custo do pacote do item, necessário para as estatísticas.
#[derive(Debug, Clone, FromRow)]
pub struct UsoProducaoDetalhado {
    #[sqlx(flatten)]
    pub sessao: UsoProducao,
    pub custo_por_pacote: Decimal,
}

// Resposta de listagem: sessão + estatísticas derivadas (calculadas na
// leitura, nunca gravadas).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducaoComEstatisticas {
    #[serde(flatten)]
    pub sessao: UsoProducao,
    pub dias_producao: Option<i64>,
    pub custo_por_dia: Option<Decimal>,
    pub producao_por_dia: Option<Decimal>,
}
