// src/models/catalogo.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::unidades::Conversao;

// Tipo de unidade da categoria, como gravado no banco.
// "ROLO" e "EMBALAGEM" contam de forma idêntica (1 pacote = 1 unidade);
// apenas "CARTELA" carrega resto de unidades avulsas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "tipo_unidade", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoUnidade {
    Cartela,
    Rolo,
    Embalagem,
}

impl TipoUnidade {
    pub fn conversao(self) -> Conversao {
        match self {
            TipoUnidade::Cartela => Conversao::Cartela,
            TipoUnidade::Rolo | TipoUnidade::Embalagem => Conversao::UnidadeInteira,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Fornecedor {
    pub id: Uuid,
    pub nome: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Categoria {
    pub id: Uuid,
    pub nome: String,
    pub tipo_unidade: TipoUnidade,
    pub created_at: DateTime<Utc>,
}
