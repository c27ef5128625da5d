// src/services/catalogo_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogoRepository,
    models::catalogo::{Categoria, Fornecedor, TipoUnidade},
};

#[derive(Clone)]
pub struct CatalogoService {
    catalogo_repo: CatalogoRepository,
    pool: PgPool,
}

impl CatalogoService {
    pub fn new(catalogo_repo: CatalogoRepository, pool: PgPool) -> Self {
        Self {
            catalogo_repo,
            pool,
        }
    }

    pub async fn listar_fornecedores(&self) -> Result<Vec<Fornecedor>, AppError> {
        self.catalogo_repo.listar_fornecedores().await
    }

    pub async fn criar_fornecedor(&self, nome: &str) -> Result<Fornecedor, AppError> {
        self.catalogo_repo.criar_fornecedor(nome).await
    }

    pub async fn renomear_fornecedor(
        &self,
        id: Uuid,
        nome: &str,
    ) -> Result<Fornecedor, AppError> {
        // Saídas antigas mantêm o nome congelado na época do registro.
        self.catalogo_repo.renomear_fornecedor(id, nome).await
    }

    pub async fn excluir_fornecedor(&self, id: Uuid) -> Result<(), AppError> {
        self.catalogo_repo.excluir_fornecedor(id).await
    }

    pub async fn listar_categorias(&self) -> Result<Vec<Categoria>, AppError> {
        self.catalogo_repo.listar_categorias().await
    }

    pub async fn criar_categoria(
        &self,
        nome: &str,
        tipo_unidade: TipoUnidade,
    ) -> Result<Categoria, AppError> {
        self.catalogo_repo.criar_categoria(nome, tipo_unidade).await
    }

    pub async fn atualizar_categoria(
        &self,
        id: Uuid,
        nome: &str,
        tipo_unidade: TipoUnidade,
    ) -> Result<Categoria, AppError> {
        self.catalogo_repo
            .atualizar_categoria(id, nome, tipo_unidade)
            .await
    }

    /// Exclusão com guarda: a linha da categoria é travada antes da contagem,
    /// segurando entradas concorrentes que a referenciam até o commit. A
    /// contagem e o DELETE enxergam assim o mesmo conjunto de itens.
    pub async fn excluir_categoria(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.catalogo_repo
            .buscar_categoria_para_atualizacao(&mut *tx, id)
            .await?
            .ok_or(AppError::CategoryNotFound)?;

        let em_uso = self
            .catalogo_repo
            .contar_itens_da_categoria(&mut *tx, id)
            .await?;
        if em_uso > 0 {
            return Err(AppError::CategoryInUse);
        }

        self.catalogo_repo.excluir_categoria(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod integracao {
    use super::*;
    use crate::{
        db::EstoqueRepository,
        models::catalogo::TipoUnidade,
        services::estoque_service::EstoqueService,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[sqlx::test]
    async fn categoria_em_uso_nao_pode_ser_excluida(pool: PgPool) {
        let catalogo = CatalogoService::new(CatalogoRepository::new(pool.clone()), pool.clone());
        let estoque = EstoqueService::new(
            EstoqueRepository::new(pool.clone()),
            CatalogoRepository::new(pool.clone()),
            pool.clone(),
        );

        let categoria = catalogo
            .criar_categoria("Etiquetas", TipoUnidade::Cartela)
            .await
            .unwrap();
        let item = estoque
            .registrar_entrada(
                "Etiqueta X",
                None,
                categoria.id,
                1,
                0,
                Decimal::from(100),
                0,
                NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            )
            .await
            .unwrap();

        assert!(matches!(
            catalogo.excluir_categoria(categoria.id).await.unwrap_err(),
            AppError::CategoryInUse
        ));

        // Sem itens na categoria, a exclusão passa; repetir dá não-encontrado.
        estoque.excluir_item(item.id).await.unwrap();
        catalogo.excluir_categoria(categoria.id).await.unwrap();
        assert!(matches!(
            catalogo.excluir_categoria(categoria.id).await.unwrap_err(),
            AppError::CategoryNotFound
        ));
    }

    #[sqlx::test]
    async fn nome_de_fornecedor_duplicado_da_conflito(pool: PgPool) {
        let catalogo = CatalogoService::new(CatalogoRepository::new(pool.clone()), pool.clone());
        catalogo.criar_fornecedor("Acme").await.unwrap();
        assert!(matches!(
            catalogo.criar_fornecedor("Acme").await.unwrap_err(),
            AppError::NameAlreadyExists(_)
        ));
    }
}
