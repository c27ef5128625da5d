// src/db/producao_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::producao::{UsoProducao, UsoProducaoDetalhado},
};

// Repositório das sessões de uso em produção.
#[derive(Clone)]
pub struct ProducaoRepository {
    pool: PgPool,
}

impl ProducaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn inserir_sessao<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        produto_nome: &str,
        data_inicio: NaiveDate,
    ) -> Result<UsoProducao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sessao = sqlx::query_as::<_, UsoProducao>(
            r#"
            INSERT INTO uso_producao (item_id, produto_nome, data_inicio, status)
            VALUES ($1, $2, $3, 'ABERTO')
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(produto_nome)
        .bind(data_inicio)
        .fetch_one(executor)
        .await?;
        Ok(sessao)
    }

    /// Trava a linha da sessão para a transição Aberto -> Finalizado.
    pub async fn buscar_sessao_para_atualizacao<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<UsoProducao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sessao = sqlx::query_as::<_, UsoProducao>(
            "SELECT * FROM uso_producao WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(sessao)
    }

    pub async fn finalizar_sessao<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data_fim: NaiveDate,
        etiquetas_geradas: Option<i64>,
    ) -> Result<UsoProducao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sessao = sqlx::query_as::<_, UsoProducao>(
            r#"
            UPDATE uso_producao
            SET status = 'FINALIZADO', data_fim = $2, etiquetas_geradas = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data_fim)
        .bind(etiquetas_geradas)
        .fetch_one(executor)
        .await?;
        Ok(sessao)
    }

    pub async fn listar_sessoes(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UsoProducaoDetalhado>, AppError> {
        let sessoes = sqlx::query_as::<_, UsoProducaoDetalhado>(
            r#"
            SELECT u.*, e.custo_por_pacote
            FROM uso_producao u
            JOIN estoque e ON e.id = u.item_id
            ORDER BY u.data_inicio DESC, u.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessoes)
    }

    pub async fn contar_sessoes(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM uso_producao")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
