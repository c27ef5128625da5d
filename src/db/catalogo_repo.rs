// src/db/catalogo_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalogo::{Categoria, Fornecedor, TipoUnidade},
};

// Repositório de fornecedores e categorias.
#[derive(Clone)]
pub struct CatalogoRepository {
    pool: PgPool,
}

impl CatalogoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Fornecedores
    // ---

    pub async fn listar_fornecedores(&self) -> Result<Vec<Fornecedor>, AppError> {
        let fornecedores =
            sqlx::query_as::<_, Fornecedor>("SELECT * FROM fornecedores ORDER BY nome ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(fornecedores)
    }

    pub async fn criar_fornecedor(&self, nome: &str) -> Result<Fornecedor, AppError> {
        sqlx::query_as::<_, Fornecedor>(
            "INSERT INTO fornecedores (nome) VALUES ($1) RETURNING *",
        )
        .bind(nome)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_para_conflito(e, nome))
    }

    pub async fn renomear_fornecedor(&self, id: Uuid, nome: &str) -> Result<Fornecedor, AppError> {
        sqlx::query_as::<_, Fornecedor>(
            "UPDATE fornecedores SET nome = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(nome)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_para_conflito(e, nome))?
        .ok_or(AppError::SupplierNotFound)
    }

    /// Os itens de estoque que apontam para o fornecedor caem para "sem
    /// fornecedor" (ON DELETE SET NULL), nunca são removidos em cascata.
    pub async fn excluir_fornecedor(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM fornecedores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::SupplierNotFound);
        }
        Ok(())
    }

    // ---
    // Categorias
    // ---

    pub async fn listar_categorias(&self) -> Result<Vec<Categoria>, AppError> {
        let categorias =
            sqlx::query_as::<_, Categoria>("SELECT * FROM categorias ORDER BY nome ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(categorias)
    }

    pub async fn buscar_categoria<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Categoria>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categoria = sqlx::query_as::<_, Categoria>("SELECT * FROM categorias WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(categoria)
    }

    /// Trava a linha da categoria para a guarda de exclusão. Inserções em
    /// 'estoque' que referenciam a categoria seguram KEY SHARE nela, então o
    /// FOR UPDATE só avança sem nenhuma entrada em voo e bloqueia novas
    /// referências até o commit.
    pub async fn buscar_categoria_para_atualizacao<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Categoria>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categoria =
            sqlx::query_as::<_, Categoria>("SELECT * FROM categorias WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(categoria)
    }

    pub async fn criar_categoria(
        &self,
        nome: &str,
        tipo_unidade: TipoUnidade,
    ) -> Result<Categoria, AppError> {
        sqlx::query_as::<_, Categoria>(
            "INSERT INTO categorias (nome, tipo_unidade) VALUES ($1, $2) RETURNING *",
        )
        .bind(nome)
        .bind(tipo_unidade)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_para_conflito(e, nome))
    }

    pub async fn atualizar_categoria(
        &self,
        id: Uuid,
        nome: &str,
        tipo_unidade: TipoUnidade,
    ) -> Result<Categoria, AppError> {
        sqlx::query_as::<_, Categoria>(
            "UPDATE categorias SET nome = $2, tipo_unidade = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(nome)
        .bind(tipo_unidade)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_para_conflito(e, nome))?
        .ok_or(AppError::CategoryNotFound)
    }

    /// Quantos itens de estoque ainda referenciam a categoria. Usado como
    /// guarda de exclusão, dentro da mesma transação do DELETE.
    pub async fn contar_itens_da_categoria<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM estoque WHERE categoria_id = $1")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(count)
    }

    pub async fn excluir_categoria<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categorias WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::CategoryNotFound);
        }
        Ok(())
    }
}

fn unique_para_conflito(e: sqlx::Error, nome: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::NameAlreadyExists(nome.to_string());
        }
    }
    e.into()
}
