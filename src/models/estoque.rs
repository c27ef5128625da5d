// src/models/estoque.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::catalogo::TipoUnidade;

// Uma linha da tabela 'estoque': um item por combinação (produto, fornecedor).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItemEstoque {
    pub id: Uuid,
    pub produto: String,
    pub fornecedor_id: Option<Uuid>,
    pub categoria_id: Option<Uuid>,
    pub pacotes: i64,
    pub unidades_avulsas: i64,
    pub total_unidades: i64,
    pub custo_por_pacote: Decimal,
    pub estoque_minimo: i64,
    pub ultima_entrada: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Item de estoque com os nomes de fornecedor/categoria já resolvidos (LEFT JOIN).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItemEstoqueDetalhado {
    pub id: Uuid,
    pub produto: String,
    pub fornecedor_id: Option<Uuid>,
    pub fornecedor_nome: Option<String>,
    pub categoria_id: Option<Uuid>,
    pub categoria_nome: Option<String>,
    pub tipo_unidade: Option<TipoUnidade>,
    pub pacotes: i64,
    pub unidades_avulsas: i64,
    pub total_unidades: i64,
    pub custo_por_pacote: Decimal,
    pub estoque_minimo: i64,
    pub ultima_entrada: Option<NaiveDate>,
}

// Resposta de listagem: o item detalhado mais o valor monetário do saldo atual.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEstoqueComValor {
    #[serde(flatten)]
    pub item: ItemEstoqueDetalhado,
    pub valor_estoque: Decimal,
}

// Item de estoque junto com o tipo de unidade da categoria, usado nos
// caminhos de escrita (a linha de 'estoque' vem travada com FOR UPDATE).
#[derive(Debug, Clone, FromRow)]
pub struct ItemComTipo {
    #[sqlx(flatten)]
    pub item: ItemEstoque,
    pub tipo_unidade: Option<TipoUnidade>,
}

// Registro imutável de uma saída de estoque.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Saida {
    pub id: Uuid,
    pub data: NaiveDate,
    pub item_id: Uuid,
    pub produto_nome: String,
    pub total_unidades: i64,
    pub custo_total: Decimal,
    pub destino: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Envelope padrão das listagens paginadas.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginado<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
