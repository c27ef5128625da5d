// src/services/estoque_service.rs
//
// O "livro" de estoque: entradas que mesclam no item existente, saídas que
// baixam saldo e geram o registro imutável, tudo sob trava de linha.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogoRepository, EstoqueRepository},
    models::estoque::{ItemEstoque, ItemEstoqueComValor, Paginado, Saida},
    services::unidades::{self, Conversao},
};

// Saldo recalculado de uma baixa, mais o custo da quantidade baixada.
#[derive(Debug, PartialEq)]
pub(crate) struct SaldoAposBaixa {
    pub pacotes: i64,
    pub unidades_avulsas: i64,
    pub total_unidades: i64,
    pub custo: Decimal,
}

/// Mescla uma entrada no saldo atual: o total soma e (pacotes, avulsas) são
/// sempre re-derivados do novo total, nunca copiados da requisição.
pub(crate) fn mesclar_entrada(
    conversao: Conversao,
    total_atual: i64,
    pacotes: i64,
    unidades_avulsas: i64,
) -> (i64, i64, i64) {
    let novo_total = total_atual + unidades::para_total(conversao, pacotes, unidades_avulsas);
    let (novos_pacotes, novas_avulsas) = unidades::do_total(conversao, novo_total);
    (novo_total, novos_pacotes, novas_avulsas)
}

/// Aplica uma baixa sobre o saldo atual. Rejeita a operação inteira se a
/// quantidade pedida exceder o disponível; o saldo nunca fica negativo.
pub(crate) fn aplicar_baixa(
    conversao: Conversao,
    total_atual: i64,
    quantidade: i64,
    custo_por_pacote: Decimal,
) -> Result<SaldoAposBaixa, AppError> {
    if quantidade > total_atual {
        return Err(AppError::InsufficientStock {
            disponivel: total_atual,
            solicitado: quantidade,
        });
    }
    let novo_total = total_atual - quantidade;
    let (pacotes, unidades_avulsas) = unidades::do_total(conversao, novo_total);
    Ok(SaldoAposBaixa {
        pacotes,
        unidades_avulsas,
        total_unidades: novo_total,
        custo: unidades::custo_das_unidades(conversao, quantidade, custo_por_pacote),
    })
}

// Sem categoria (apagada depois da entrada), o item converte como cartela.
pub(crate) fn conversao_do_item(
    tipo: Option<crate::models::catalogo::TipoUnidade>,
) -> Conversao {
    tipo.map(|t| t.conversao()).unwrap_or(Conversao::Cartela)
}

// A perdedora de duas primeiras entradas concorrentes para o mesmo
// (produto, fornecedor) esbarra na chave única do estoque.
fn conflito_de_item_novo(err: &AppError) -> bool {
    if let AppError::DatabaseError(sqlx::Error::Database(db)) = err {
        return db.is_unique_violation()
            && db.constraint() == Some("estoque_produto_fornecedor_key");
    }
    false
}

#[derive(Clone)]
pub struct EstoqueService {
    estoque_repo: EstoqueRepository,
    catalogo_repo: CatalogoRepository,
    pool: PgPool,
}

impl EstoqueService {
    pub fn new(
        estoque_repo: EstoqueRepository,
        catalogo_repo: CatalogoRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            estoque_repo,
            catalogo_repo,
            pool,
        }
    }

    // --- ENTRADA ---
    /// Registra uma entrada. Se já existe item para (produto, fornecedor), as
    /// quantidades mesclam; custo, mínimo, categoria e data de entrada são
    /// sobrescritos pelos valores recebidos. Se não existe, o item é criado
    /// com (pacotes, avulsas) normalizados a partir do total.
    #[allow(clippy::too_many_arguments)]
    pub async fn registrar_entrada(
        &self,
        produto: &str,
        fornecedor_id: Option<Uuid>,
        categoria_id: Uuid,
        pacotes: i64,
        unidades_avulsas: i64,
        custo_por_pacote: Decimal,
        estoque_minimo: i64,
        ultima_entrada: NaiveDate,
    ) -> Result<ItemEstoque, AppError> {
        let primeira = self
            .entrada_em_transacao(
                produto,
                fornecedor_id,
                categoria_id,
                pacotes,
                unidades_avulsas,
                custo_por_pacote,
                estoque_minimo,
                ultima_entrada,
            )
            .await;

        // Duas primeiras entradas podem correr até o INSERT sem nenhuma das
        // duas achar linha para travar; a perdedora reexecuta e cai no
        // caminho de mesclagem sobre o item recém-criado.
        match primeira {
            Err(ref e) if conflito_de_item_novo(e) => {
                self.entrada_em_transacao(
                    produto,
                    fornecedor_id,
                    categoria_id,
                    pacotes,
                    unidades_avulsas,
                    custo_por_pacote,
                    estoque_minimo,
                    ultima_entrada,
                )
                .await
            }
            outro => outro,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn entrada_em_transacao(
        &self,
        produto: &str,
        fornecedor_id: Option<Uuid>,
        categoria_id: Uuid,
        pacotes: i64,
        unidades_avulsas: i64,
        custo_por_pacote: Decimal,
        estoque_minimo: i64,
        ultima_entrada: NaiveDate,
    ) -> Result<ItemEstoque, AppError> {
        let mut tx = self.pool.begin().await?;

        let categoria = self
            .catalogo_repo
            .buscar_categoria(&mut *tx, categoria_id)
            .await?
            .ok_or(AppError::CategoryNotFound)?;
        let conversao = categoria.tipo_unidade.conversao();

        // Trava a linha existente (se houver) antes de ler o total.
        let existente = self
            .estoque_repo
            .buscar_por_produto_fornecedor_para_atualizacao(&mut *tx, produto, fornecedor_id)
            .await?;

        let item = match existente {
            Some(atual) => {
                let (novo_total, novos_pacotes, novas_avulsas) = mesclar_entrada(
                    conversao,
                    atual.total_unidades,
                    pacotes,
                    unidades_avulsas,
                );
                self.estoque_repo
                    .atualizar_apos_entrada(
                        &mut *tx,
                        atual.id,
                        categoria_id,
                        novos_pacotes,
                        novas_avulsas,
                        novo_total,
                        custo_por_pacote,
                        estoque_minimo,
                        ultima_entrada,
                    )
                    .await?
            }
            None => {
                let total = unidades::para_total(conversao, pacotes, unidades_avulsas);
                let (novos_pacotes, novas_avulsas) = unidades::do_total(conversao, total);
                self.estoque_repo
                    .inserir_item(
                        &mut *tx,
                        produto,
                        fornecedor_id,
                        categoria_id,
                        novos_pacotes,
                        novas_avulsas,
                        total,
                        custo_por_pacote,
                        estoque_minimo,
                        ultima_entrada,
                    )
                    .await?
            }
        };

        tx.commit().await?;
        tracing::info!(
            "Entrada registrada: '{}' agora com {} unidades.",
            item.produto,
            item.total_unidades
        );
        Ok(item)
    }

    // --- SAÍDA ---
    /// Baixa `quantidade` unidades do item e grava a saída correspondente,
    /// na mesma transação: ou as duas coisas acontecem, ou nenhuma.
    pub async fn registrar_saida(
        &self,
        item_id: Uuid,
        data: NaiveDate,
        quantidade: i64,
        destino: Option<&str>,
    ) -> Result<Saida, AppError> {
        let mut tx = self.pool.begin().await?;

        let item = self
            .estoque_repo
            .buscar_para_atualizacao(&mut *tx, item_id)
            .await?
            .ok_or(AppError::ItemNotFound)?;

        let conversao = conversao_do_item(item.tipo_unidade);
        let saldo = aplicar_baixa(
            conversao,
            item.item.total_unidades,
            quantidade,
            item.item.custo_por_pacote,
        )?;

        self.estoque_repo
            .atualizar_saldo(
                &mut *tx,
                item_id,
                saldo.pacotes,
                saldo.unidades_avulsas,
                saldo.total_unidades,
            )
            .await?;

        // Nome do produto congelado no registro, por construção.
        let saida = self
            .estoque_repo
            .inserir_saida(
                &mut *tx,
                data,
                item_id,
                &item.item.produto,
                quantidade,
                saldo.custo,
                destino,
            )
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Saída registrada: {} unidades de '{}' (restam {}).",
            quantidade,
            saida.produto_nome,
            saldo.total_unidades
        );
        Ok(saida)
    }

    pub async fn excluir_item(&self, id: Uuid) -> Result<(), AppError> {
        self.estoque_repo.excluir(id).await
    }

    // --- LEITURAS ---

    pub async fn listar_estoque(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<Paginado<ItemEstoqueComValor>, AppError> {
        let offset = (page - 1) * per_page;
        let itens = self.estoque_repo.listar(per_page, offset).await?;
        let total = self.estoque_repo.contar().await?;

        let data = itens
            .into_iter()
            .map(|item| {
                let conversao = conversao_do_item(item.tipo_unidade);
                let valor_estoque = unidades::custo_das_unidades(
                    conversao,
                    item.total_unidades,
                    item.custo_por_pacote,
                );
                ItemEstoqueComValor {
                    item,
                    valor_estoque,
                }
            })
            .collect();

        Ok(Paginado {
            data,
            total,
            page,
            per_page,
        })
    }

    /// Listagem completa com valor por item, consumida pelo relatório CSV.
    pub async fn exportar_estoque(&self) -> Result<Vec<ItemEstoqueComValor>, AppError> {
        let itens = self.estoque_repo.listar_todos_detalhados().await?;
        Ok(itens
            .into_iter()
            .map(|item| {
                let conversao = conversao_do_item(item.tipo_unidade);
                let valor_estoque = unidades::custo_das_unidades(
                    conversao,
                    item.total_unidades,
                    item.custo_por_pacote,
                );
                ItemEstoqueComValor {
                    item,
                    valor_estoque,
                }
            })
            .collect())
    }

    pub async fn listar_saidas(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<Paginado<Saida>, AppError> {
        let offset = (page - 1) * per_page;
        let data = self.estoque_repo.listar_saidas(per_page, offset).await?;
        let total = self.estoque_repo.contar_saidas().await?;
        Ok(Paginado {
            data,
            total,
            page,
            per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entrada_mescla_e_normaliza_cartelas() {
        // Item com 3000 etiquetas recebe 2 cartelas + 100 avulsas.
        let (total, pacotes, avulsas) = mesclar_entrada(Conversao::Cartela, 3000, 2, 100);
        assert_eq!(total, 13100);
        assert_eq!(pacotes, 2);
        assert_eq!(avulsas, 3100);
    }

    #[test]
    fn entrada_de_rolos_ignora_avulsas() {
        let (total, pacotes, avulsas) = mesclar_entrada(Conversao::UnidadeInteira, 5, 3, 99);
        assert_eq!((total, pacotes, avulsas), (8, 8, 0));
    }

    #[test]
    fn baixa_recalcula_saldo_e_custo() {
        let saldo = aplicar_baixa(Conversao::Cartela, 5000, 4600, Decimal::from(100)).unwrap();
        assert_eq!(saldo.total_unidades, 400);
        assert_eq!(saldo.pacotes, 0);
        assert_eq!(saldo.unidades_avulsas, 400);
        assert_eq!(saldo.custo, Decimal::from(92));
    }

    #[test]
    fn baixa_maior_que_saldo_eh_rejeitada() {
        let err = aplicar_baixa(Conversao::Cartela, 2000, 3000, Decimal::from(10)).unwrap_err();
        match err {
            AppError::InsufficientStock {
                disponivel,
                solicitado,
            } => {
                assert_eq!(disponivel, 2000);
                assert_eq!(solicitado, 3000);
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn baixa_do_saldo_exato_zera_o_item() {
        let saldo = aplicar_baixa(Conversao::UnidadeInteira, 4, 4, Decimal::from(30)).unwrap();
        assert_eq!(saldo.total_unidades, 0);
        assert_eq!(saldo.pacotes, 0);
        assert_eq!(saldo.custo, Decimal::from(120));
    }

    #[test]
    fn item_sem_categoria_converte_como_cartela() {
        assert_eq!(conversao_do_item(None), Conversao::Cartela);
    }
}

// Testes de integração contra um PostgreSQL de verdade (`#[sqlx::test]`
// cria um banco por teste e roda as migrações de ./migrations).
#[cfg(test)]
mod integracao {
    use super::*;
    use crate::models::catalogo::TipoUnidade;

    fn dia(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn servico(pool: &PgPool) -> EstoqueService {
        EstoqueService::new(
            EstoqueRepository::new(pool.clone()),
            CatalogoRepository::new(pool.clone()),
            pool.clone(),
        )
    }

    async fn nova_categoria(pool: &PgPool, nome: &str, tipo: TipoUnidade) -> Uuid {
        CatalogoRepository::new(pool.clone())
            .criar_categoria(nome, tipo)
            .await
            .unwrap()
            .id
    }

    async fn item_do_banco(pool: &PgPool, id: Uuid) -> ItemEstoque {
        sqlx::query_as::<_, ItemEstoque>("SELECT * FROM estoque WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn baixas_concorrentes_no_mesmo_item_serializam(pool: PgPool) {
        let servico = servico(&pool);
        let categoria = nova_categoria(&pool, "Etiquetas", TipoUnidade::Cartela).await;
        let item = servico
            .registrar_entrada(
                "Etiqueta X",
                None,
                categoria,
                1,
                0,
                Decimal::from(100),
                0,
                dia("2025-06-02"),
            )
            .await
            .unwrap();

        // Duas baixas de 3000 sobre 5000: exatamente uma cabe no saldo.
        let (a, b) = tokio::join!(
            servico.registrar_saida(item.id, dia("2025-06-03"), 3000, Some("Pedido A")),
            servico.registrar_saida(item.id, dia("2025-06-03"), 3000, Some("Pedido B")),
        );

        let sucessos = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(sucessos, 1);

        let falha = if a.is_err() {
            a.unwrap_err()
        } else {
            b.unwrap_err()
        };
        assert!(matches!(
            falha,
            AppError::InsufficientStock {
                disponivel: 2000,
                solicitado: 3000
            }
        ));

        // Nunca negativo, nunca aplicado duas vezes.
        let depois = item_do_banco(&pool, item.id).await;
        assert_eq!(depois.total_unidades, 2000);
        assert_eq!(depois.pacotes, 0);
        assert_eq!(depois.unidades_avulsas, 2000);
    }

    #[sqlx::test]
    async fn primeiras_entradas_concorrentes_mesclam_no_mesmo_item(pool: PgPool) {
        let servico = servico(&pool);
        let categoria = nova_categoria(&pool, "Etiquetas", TipoUnidade::Cartela).await;

        let (a, b) = tokio::join!(
            servico.registrar_entrada(
                "Etiqueta Y",
                None,
                categoria,
                1,
                0,
                Decimal::from(100),
                0,
                dia("2025-06-02"),
            ),
            servico.registrar_entrada(
                "Etiqueta Y",
                None,
                categoria,
                1,
                0,
                Decimal::from(100),
                0,
                dia("2025-06-02"),
            ),
        );
        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(a.id, b.id);

        let linhas: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM estoque WHERE produto = 'Etiqueta Y'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(linhas, 1);
        assert_eq!(item_do_banco(&pool, a.id).await.total_unidades, 10000);
    }

    #[sqlx::test]
    async fn cenario_entrada_baixa_e_alerta(pool: PgPool) {
        let servico = servico(&pool);
        let categoria = nova_categoria(&pool, "Etiquetas", TipoUnidade::Cartela).await;
        let fornecedor = CatalogoRepository::new(pool.clone())
            .criar_fornecedor("Acme")
            .await
            .unwrap();

        let item = servico
            .registrar_entrada(
                "Etiqueta X",
                Some(fornecedor.id),
                categoria,
                1,
                0,
                Decimal::from(100),
                500,
                dia("2025-06-02"),
            )
            .await
            .unwrap();
        assert_eq!(item.total_unidades, 5000);
        assert_eq!(item.pacotes, 1);
        assert_eq!(item.unidades_avulsas, 0);

        let saida = servico
            .registrar_saida(item.id, dia("2025-06-03"), 4600, Some("Produção"))
            .await
            .unwrap();
        assert_eq!(saida.custo_total, Decimal::from(92));
        assert_eq!(saida.produto_nome, "Etiqueta X");

        let depois = item_do_banco(&pool, item.id).await;
        assert_eq!(depois.total_unidades, 400);
        assert_eq!(depois.pacotes, 0);
        assert_eq!(depois.unidades_avulsas, 400);

        // 400 <= mínimo de 500: o item entra no feed de alertas.
        let criticos = EstoqueRepository::new(pool.clone())
            .listar_criticos()
            .await
            .unwrap();
        assert!(criticos.iter().any(|c| c.id == item.id));
    }

    #[sqlx::test]
    async fn excluir_duas_vezes_preserva_os_demais_itens(pool: PgPool) {
        let servico = servico(&pool);
        let categoria = nova_categoria(&pool, "Etiquetas", TipoUnidade::Cartela).await;
        let alvo = servico
            .registrar_entrada(
                "Etiqueta A",
                None,
                categoria,
                1,
                0,
                Decimal::from(100),
                0,
                dia("2025-06-02"),
            )
            .await
            .unwrap();
        let outro = servico
            .registrar_entrada(
                "Etiqueta B",
                None,
                categoria,
                1,
                0,
                Decimal::from(100),
                0,
                dia("2025-06-02"),
            )
            .await
            .unwrap();
        servico
            .registrar_saida(alvo.id, dia("2025-06-03"), 100, None)
            .await
            .unwrap();

        servico.excluir_item(alvo.id).await.unwrap();
        assert!(matches!(
            servico.excluir_item(alvo.id).await.unwrap_err(),
            AppError::ItemNotFound
        ));

        // As saídas do item foram em cascata; o outro item ficou intacto.
        let saidas_restantes: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM saidas WHERE item_id = $1")
                .bind(alvo.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(saidas_restantes, 0);
        assert_eq!(item_do_banco(&pool, outro.id).await.total_unidades, 5000);
    }

    #[sqlx::test]
    async fn entrada_com_categoria_inexistente_falha_sem_criar_item(pool: PgPool) {
        let servico = servico(&pool);
        let err = servico
            .registrar_entrada(
                "Etiqueta Z",
                None,
                Uuid::new_v4(),
                1,
                0,
                Decimal::from(100),
                0,
                dia("2025-06-02"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CategoryNotFound));

        let linhas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM estoque")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(linhas, 0);
    }
}
