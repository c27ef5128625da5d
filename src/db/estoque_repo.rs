// src/db/estoque_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        dashboard::ItemCritico,
        estoque::{ItemComTipo, ItemEstoque, ItemEstoqueDetalhado, Saida},
    },
};

// Repositório do livro de estoque: tabela 'estoque' e suas 'saidas'.
#[derive(Clone)]
pub struct EstoqueRepository {
    pool: PgPool,
}

impl EstoqueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leituras
    // ---

    pub async fn listar(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ItemEstoqueDetalhado>, AppError> {
        let itens = sqlx::query_as::<_, ItemEstoqueDetalhado>(
            r#"
            SELECT e.id, e.produto,
                   e.fornecedor_id, f.nome AS fornecedor_nome,
                   e.categoria_id, c.nome AS categoria_nome, c.tipo_unidade,
                   e.pacotes, e.unidades_avulsas, e.total_unidades,
                   e.custo_por_pacote, e.estoque_minimo, e.ultima_entrada
            FROM estoque e
            LEFT JOIN fornecedores f ON f.id = e.fornecedor_id
            LEFT JOIN categorias c ON c.id = e.categoria_id
            ORDER BY e.produto ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(itens)
    }

    /// Listagem completa, sem paginação, para o relatório CSV.
    pub async fn listar_todos_detalhados(&self) -> Result<Vec<ItemEstoqueDetalhado>, AppError> {
        let itens = sqlx::query_as::<_, ItemEstoqueDetalhado>(
            r#"
            SELECT e.id, e.produto,
                   e.fornecedor_id, f.nome AS fornecedor_nome,
                   e.categoria_id, c.nome AS categoria_nome, c.tipo_unidade,
                   e.pacotes, e.unidades_avulsas, e.total_unidades,
                   e.custo_por_pacote, e.estoque_minimo, e.ultima_entrada
            FROM estoque e
            LEFT JOIN fornecedores f ON f.id = e.fornecedor_id
            LEFT JOIN categorias c ON c.id = e.categoria_id
            ORDER BY e.produto ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(itens)
    }

    pub async fn contar(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM estoque")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Todos os itens com o tipo de unidade resolvido, para os agregados do
    /// painel (o valor monetário é calculado em Rust, pela conversão).
    pub async fn listar_com_tipo(&self) -> Result<Vec<ItemComTipo>, AppError> {
        let itens = sqlx::query_as::<_, ItemComTipo>(
            r#"
            SELECT e.*, c.tipo_unidade
            FROM estoque e
            LEFT JOIN categorias c ON c.id = e.categoria_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(itens)
    }

    pub async fn listar_criticos(&self) -> Result<Vec<ItemCritico>, AppError> {
        let itens = sqlx::query_as::<_, ItemCritico>(
            r#"
            SELECT id, produto, total_unidades, estoque_minimo
            FROM estoque
            WHERE estoque_minimo > 0 AND total_unidades <= estoque_minimo
            ORDER BY produto ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(itens)
    }

    // ---
    // Escritas (sempre dentro de uma transação do serviço)
    // ---

    /// Trava a linha do item (FOR UPDATE) e traz junto o tipo de unidade da
    /// categoria. Duas baixas concorrentes no mesmo item serializam aqui.
    pub async fn buscar_para_atualizacao<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<ItemComTipo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ItemComTipo>(
            r#"
            SELECT e.*, c.tipo_unidade
            FROM estoque e
            LEFT JOIN categorias c ON c.id = e.categoria_id
            WHERE e.id = $1
            FOR UPDATE OF e
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// Busca pela chave lógica (produto, fornecedor), também com trava.
    /// `IS NOT DISTINCT FROM` faz o fornecedor nulo casar consigo mesmo.
    pub async fn buscar_por_produto_fornecedor_para_atualizacao<'e, E>(
        &self,
        executor: E,
        produto: &str,
        fornecedor_id: Option<Uuid>,
    ) -> Result<Option<ItemEstoque>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ItemEstoque>(
            r#"
            SELECT * FROM estoque
            WHERE produto = $1 AND fornecedor_id IS NOT DISTINCT FROM $2
            FOR UPDATE
            "#,
        )
        .bind(produto)
        .bind(fornecedor_id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn inserir_item<'e, E>(
        &self,
        executor: E,
        produto: &str,
        fornecedor_id: Option<Uuid>,
        categoria_id: Uuid,
        pacotes: i64,
        unidades_avulsas: i64,
        total_unidades: i64,
        custo_por_pacote: Decimal,
        estoque_minimo: i64,
        ultima_entrada: NaiveDate,
    ) -> Result<ItemEstoque, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ItemEstoque>(
            r#"
            INSERT INTO estoque (produto, fornecedor_id, categoria_id, pacotes,
                                 unidades_avulsas, total_unidades, custo_por_pacote,
                                 estoque_minimo, ultima_entrada)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(produto)
        .bind(fornecedor_id)
        .bind(categoria_id)
        .bind(pacotes)
        .bind(unidades_avulsas)
        .bind(total_unidades)
        .bind(custo_por_pacote)
        .bind(estoque_minimo)
        .bind(ultima_entrada)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// Entrada sobre item existente: quantidades já mescladas pelo serviço;
    /// custo, mínimo, categoria e data são sobrescritos (o último valor vence).
    #[allow(clippy::too_many_arguments)]
    pub async fn atualizar_apos_entrada<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        categoria_id: Uuid,
        pacotes: i64,
        unidades_avulsas: i64,
        total_unidades: i64,
        custo_por_pacote: Decimal,
        estoque_minimo: i64,
        ultima_entrada: NaiveDate,
    ) -> Result<ItemEstoque, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ItemEstoque>(
            r#"
            UPDATE estoque
            SET categoria_id = $2, pacotes = $3, unidades_avulsas = $4,
                total_unidades = $5, custo_por_pacote = $6, estoque_minimo = $7,
                ultima_entrada = $8, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(categoria_id)
        .bind(pacotes)
        .bind(unidades_avulsas)
        .bind(total_unidades)
        .bind(custo_por_pacote)
        .bind(estoque_minimo)
        .bind(ultima_entrada)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// Atualiza apenas o saldo (baixas de saída/produção).
    pub async fn atualizar_saldo<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        pacotes: i64,
        unidades_avulsas: i64,
        total_unidades: i64,
    ) -> Result<ItemEstoque, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ItemEstoque>(
            r#"
            UPDATE estoque
            SET pacotes = $2, unidades_avulsas = $3, total_unidades = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(pacotes)
        .bind(unidades_avulsas)
        .bind(total_unidades)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// As saídas do item vão junto (ON DELETE CASCADE).
    pub async fn excluir(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM estoque WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ItemNotFound);
        }
        Ok(())
    }

    // ---
    // Saídas
    // ---

    pub async fn inserir_saida<'e, E>(
        &self,
        executor: E,
        data: NaiveDate,
        item_id: Uuid,
        produto_nome: &str,
        total_unidades: i64,
        custo_total: Decimal,
        destino: Option<&str>,
    ) -> Result<Saida, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saida = sqlx::query_as::<_, Saida>(
            r#"
            INSERT INTO saidas (data, item_id, produto_nome, total_unidades,
                                custo_total, destino)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data)
        .bind(item_id)
        .bind(produto_nome)
        .bind(total_unidades)
        .bind(custo_total)
        .bind(destino)
        .fetch_one(executor)
        .await?;
        Ok(saida)
    }

    pub async fn listar_saidas(&self, limit: i64, offset: i64) -> Result<Vec<Saida>, AppError> {
        let saidas = sqlx::query_as::<_, Saida>(
            r#"
            SELECT * FROM saidas
            ORDER BY data DESC, created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(saidas)
    }

    pub async fn contar_saidas(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saidas")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
