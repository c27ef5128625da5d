// src/services/producao_service.rs
//
// Sessões de uso em produção: abrir baixa exatamente 1 unidade do item;
// finalizar só mexe no registro da sessão (a unidade nunca volta ao estoque).

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EstoqueRepository, ProducaoRepository},
    models::{
        estoque::Paginado,
        producao::{ProducaoComEstatisticas, StatusProducao, UsoProducao, UsoProducaoDetalhado},
    },
    services::estoque_service::{aplicar_baixa, conversao_do_item},
};

/// Dias corridos de `inicio` a `fim` (inclusive), descontando apenas os
/// domingos — sábado conta como dia trabalhado. Piso de 1 dia.
pub(crate) fn dias_sem_domingo(inicio: NaiveDate, fim: NaiveDate) -> i64 {
    let total = (fim - inicio).num_days() + 1;
    if total <= 0 {
        return 1;
    }
    // Distância do início até o primeiro domingo do intervalo.
    let ate_domingo = (7 - inicio.weekday().num_days_from_sunday() as i64) % 7;
    let domingos = if total > ate_domingo {
        (total - ate_domingo + 6) / 7
    } else {
        0
    };
    (total - domingos).max(1)
}

/// Estatísticas derivadas, calculadas na leitura. Sessões abertas não têm
/// estatísticas; sessões sem contagem de etiquetas não têm produção por dia.
pub(crate) fn estatisticas(detalhe: UsoProducaoDetalhado) -> ProducaoComEstatisticas {
    let UsoProducaoDetalhado {
        sessao,
        custo_por_pacote,
    } = detalhe;

    let (dias, custo_por_dia, producao_por_dia) = match (sessao.status, sessao.data_fim) {
        (StatusProducao::Finalizado, Some(fim)) => {
            let dias = dias_sem_domingo(sessao.data_inicio, fim);
            let custo_dia = custo_por_pacote / Decimal::from(dias);
            let producao_dia = sessao
                .etiquetas_geradas
                .map(|e| Decimal::from(e) / Decimal::from(dias));
            (Some(dias), Some(custo_dia), producao_dia)
        }
        _ => (None, None, None),
    };

    ProducaoComEstatisticas {
        sessao,
        dias_producao: dias,
        custo_por_dia,
        producao_por_dia,
    }
}

#[derive(Clone)]
pub struct ProducaoService {
    producao_repo: ProducaoRepository,
    estoque_repo: EstoqueRepository,
    pool: PgPool,
}

impl ProducaoService {
    pub fn new(
        producao_repo: ProducaoRepository,
        estoque_repo: EstoqueRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            producao_repo,
            estoque_repo,
            pool,
        }
    }

    /// Abre uma sessão: baixa 1 unidade do item (mesma trava e atomicidade
    /// de uma saída) e cria o registro em ABERTO com o nome congelado.
    pub async fn iniciar(
        &self,
        item_id: Uuid,
        data_inicio: NaiveDate,
    ) -> Result<UsoProducao, AppError> {
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
            1,
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

        let sessao = self
            .producao_repo
            .inserir_sessao(&mut *tx, item_id, &item.item.produto, data_inicio)
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Produção iniciada para '{}' (restam {} unidades).",
            sessao.produto_nome,
            saldo.total_unidades
        );
        Ok(sessao)
    }

    /// Fecha a sessão. Finalizar de novo uma sessão já FINALIZADO é
    /// rejeitado como conflito, em vez de sobrescrever datas.
    pub async fn finalizar(
        &self,
        sessao_id: Uuid,
        data_fim: NaiveDate,
        etiquetas_geradas: Option<i64>,
    ) -> Result<UsoProducao, AppError> {
        let mut tx = self.pool.begin().await?;

        let sessao = self
            .producao_repo
            .buscar_sessao_para_atualizacao(&mut *tx, sessao_id)
            .await?
            .ok_or(AppError::SessionNotFound)?;

        if sessao.status == StatusProducao::Finalizado {
            return Err(AppError::SessionAlreadyClosed);
        }

        let sessao = self
            .producao_repo
            .finalizar_sessao(&mut *tx, sessao_id, data_fim, etiquetas_geradas)
            .await?;

        tx.commit().await?;
        tracing::info!("Produção finalizada para '{}'.", sessao.produto_nome);
        Ok(sessao)
    }

    pub async fn listar(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<Paginado<ProducaoComEstatisticas>, AppError> {
        let offset = (page - 1) * per_page;
        let sessoes = self.producao_repo.listar_sessoes(per_page, offset).await?;
        let total = self.producao_repo.contar_sessoes().await?;

        Ok(Paginado {
            data: sessoes.into_iter().map(estatisticas).collect(),
            total,
            page,
            per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn dia(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn semana_inteira_desconta_um_domingo() {
        // Segunda 02/06/2025 até domingo 08/06/2025: 7 dias corridos, 1 domingo.
        assert_eq!(dias_sem_domingo(dia("2025-06-02"), dia("2025-06-08")), 6);
    }

    #[test]
    fn mesmo_dia_conta_um() {
        assert_eq!(dias_sem_domingo(dia("2025-06-03"), dia("2025-06-03")), 1);
    }

    #[test]
    fn domingo_isolado_tem_piso_de_um_dia() {
        // 08/06/2025 é domingo: 1 - 1 = 0 dias, mas o piso segura em 1.
        assert_eq!(dias_sem_domingo(dia("2025-06-08"), dia("2025-06-08")), 1);
    }

    #[test]
    fn fim_antes_do_inicio_tem_piso_de_um_dia() {
        assert_eq!(dias_sem_domingo(dia("2025-06-10"), dia("2025-06-01")), 1);
    }

    #[test]
    fn duas_semanas_descontam_dois_domingos() {
        // Segunda 02/06 até domingo 15/06: 14 dias corridos, 2 domingos.
        assert_eq!(dias_sem_domingo(dia("2025-06-02"), dia("2025-06-15")), 12);
    }

    fn sessao_finalizada(
        inicio: &str,
        fim: &str,
        etiquetas: Option<i64>,
        custo: Decimal,
    ) -> UsoProducaoDetalhado {
        let agora = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        UsoProducaoDetalhado {
            sessao: UsoProducao {
                id: Uuid::new_v4(),
                item_id: Uuid::new_v4(),
                produto_nome: "Etiqueta X".to_string(),
                data_inicio: dia(inicio),
                data_fim: Some(dia(fim)),
                etiquetas_geradas: etiquetas,
                status: StatusProducao::Finalizado,
                created_at: agora,
            },
            custo_por_pacote: custo,
        }
    }

    #[test]
    fn estatisticas_de_sessao_finalizada() {
        let detalhe =
            sessao_finalizada("2025-06-02", "2025-06-08", Some(600), Decimal::from(100));
        let stats = estatisticas(detalhe);
        assert_eq!(stats.dias_producao, Some(6));
        assert_eq!(stats.producao_por_dia, Some(Decimal::from(100)));
        assert_eq!(
            stats.custo_por_dia.map(|c| c.round_dp(2)),
            Some(Decimal::new(1667, 2))
        );
    }

    #[test]
    fn sessao_sem_contagem_nao_tem_producao_por_dia() {
        let detalhe = sessao_finalizada("2025-06-02", "2025-06-04", None, Decimal::from(90));
        let stats = estatisticas(detalhe);
        assert_eq!(stats.dias_producao, Some(3));
        assert_eq!(stats.custo_por_dia, Some(Decimal::from(30)));
        assert_eq!(stats.producao_por_dia, None);
    }

    #[test]
    fn sessao_aberta_nao_tem_estatisticas() {
        let agora = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let detalhe = UsoProducaoDetalhado {
            sessao: UsoProducao {
                id: Uuid::new_v4(),
                item_id: Uuid::new_v4(),
                produto_nome: "Etiqueta X".to_string(),
                data_inicio: dia("2025-06-02"),
                data_fim: None,
                etiquetas_geradas: None,
                status: StatusProducao::Aberto,
                created_at: agora,
            },
            custo_por_pacote: Decimal::from(100),
        };
        let stats = estatisticas(detalhe);
        assert_eq!(stats.dias_producao, None);
        assert_eq!(stats.custo_por_dia, None);
        assert_eq!(stats.producao_por_dia, None);
    }
}

#[cfg(test)]
mod integracao {
    use super::*;
    use crate::{
        db::CatalogoRepository,
        models::catalogo::TipoUnidade,
        services::estoque_service::EstoqueService,
    };

    fn dia(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn servicos(pool: &PgPool) -> (EstoqueService, ProducaoService) {
        let estoque = EstoqueService::new(
            EstoqueRepository::new(pool.clone()),
            CatalogoRepository::new(pool.clone()),
            pool.clone(),
        );
        let producao = ProducaoService::new(
            ProducaoRepository::new(pool.clone()),
            EstoqueRepository::new(pool.clone()),
            pool.clone(),
        );
        (estoque, producao)
    }

    async fn item_com_saldo(estoque: &EstoqueService, pool: &PgPool, avulsas: i64) -> Uuid {
        let categoria = CatalogoRepository::new(pool.clone())
            .criar_categoria("Etiquetas", TipoUnidade::Cartela)
            .await
            .unwrap();
        estoque
            .registrar_entrada(
                "Etiqueta X",
                None,
                categoria.id,
                0,
                avulsas,
                Decimal::from(100),
                0,
                dia("2025-06-01"),
            )
            .await
            .unwrap()
            .id
    }

    #[sqlx::test]
    async fn ciclo_de_sessao_baixa_uma_unidade_e_fecha_uma_vez(pool: PgPool) {
        let (estoque, producao) = servicos(&pool);
        let item_id = item_com_saldo(&estoque, &pool, 400).await;

        let sessao = producao.iniciar(item_id, dia("2025-06-02")).await.unwrap();
        assert_eq!(sessao.status, StatusProducao::Aberto);

        let total: i64 = sqlx::query_scalar("SELECT total_unidades FROM estoque WHERE id = $1")
            .bind(item_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 399);

        let fechada = producao
            .finalizar(sessao.id, dia("2025-06-08"), Some(600))
            .await
            .unwrap();
        assert_eq!(fechada.status, StatusProducao::Finalizado);

        // Segunda 02/06 até domingo 08/06: 6 dias úteis, 100 etiquetas/dia.
        let listagem = producao.listar(1, 10).await.unwrap();
        assert_eq!(listagem.total, 1);
        let stats = &listagem.data[0];
        assert_eq!(stats.dias_producao, Some(6));
        assert_eq!(stats.producao_por_dia, Some(Decimal::from(100)));

        assert!(matches!(
            producao
                .finalizar(sessao.id, dia("2025-06-09"), Some(999))
                .await
                .unwrap_err(),
            AppError::SessionAlreadyClosed
        ));
    }

    #[sqlx::test]
    async fn iniciar_sem_saldo_nao_cria_sessao(pool: PgPool) {
        let (estoque, producao) = servicos(&pool);
        let item_id = item_com_saldo(&estoque, &pool, 1).await;

        producao.iniciar(item_id, dia("2025-06-02")).await.unwrap();
        assert!(matches!(
            producao.iniciar(item_id, dia("2025-06-03")).await.unwrap_err(),
            AppError::InsufficientStock {
                disponivel: 0,
                solicitado: 1
            }
        ));

        let sessoes: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM uso_producao WHERE item_id = $1")
                .bind(item_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(sessoes, 1);
    }
}
