// src/services/dashboard_service.rs

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::EstoqueRepository,
    models::{
        dashboard::{ItemCritico, ResumoEstoque},
        estoque::ItemComTipo,
    },
    services::{estoque_service::conversao_do_item, unidades},
};

pub(crate) fn eh_critico(total_unidades: i64, estoque_minimo: i64) -> bool {
    estoque_minimo > 0 && total_unidades <= estoque_minimo
}

pub(crate) fn resumir(itens: &[ItemComTipo]) -> ResumoEstoque {
    let mut total_unidades = 0i64;
    let mut valor_total = Decimal::ZERO;
    let mut itens_criticos = 0i64;

    for detalhe in itens {
        let item = &detalhe.item;
        total_unidades += item.total_unidades;
        valor_total += unidades::custo_das_unidades(
            conversao_do_item(detalhe.tipo_unidade),
            item.total_unidades,
            item.custo_por_pacote,
        );
        if eh_critico(item.total_unidades, item.estoque_minimo) {
            itens_criticos += 1;
        }
    }

    ResumoEstoque {
        total_itens: itens.len() as i64,
        total_unidades,
        valor_total,
        itens_criticos,
    }
}

#[derive(Clone)]
pub struct DashboardService {
    estoque_repo: EstoqueRepository,
}

impl DashboardService {
    pub fn new(estoque_repo: EstoqueRepository) -> Self {
        Self { estoque_repo }
    }

    pub async fn resumo(&self) -> Result<ResumoEstoque, AppError> {
        let itens = self.estoque_repo.listar_com_tipo().await?;
        Ok(resumir(&itens))
    }

    /// Itens no vermelho (total <= mínimo, com mínimo configurado). É esta
    /// leitura que a camada externa de alertas por e-mail consome.
    pub async fn itens_criticos(&self) -> Result<Vec<ItemCritico>, AppError> {
        self.estoque_repo.listar_criticos().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{catalogo::TipoUnidade, estoque::ItemEstoque};
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn item(total: i64, custo: Decimal, minimo: i64, tipo: Option<TipoUnidade>) -> ItemComTipo {
        let agora = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        ItemComTipo {
            item: ItemEstoque {
                id: Uuid::new_v4(),
                produto: "Etiqueta X".to_string(),
                fornecedor_id: None,
                categoria_id: None,
                pacotes: 0,
                unidades_avulsas: 0,
                total_unidades: total,
                custo_por_pacote: custo,
                estoque_minimo: minimo,
                ultima_entrada: None,
                created_at: agora,
                updated_at: agora,
            },
            tipo_unidade: tipo,
        }
    }

    #[test]
    fn item_no_limite_do_minimo_eh_critico() {
        assert!(eh_critico(400, 500));
        assert!(eh_critico(500, 500));
        assert!(!eh_critico(501, 500));
    }

    #[test]
    fn minimo_zerado_nunca_alerta() {
        assert!(!eh_critico(0, 0));
    }

    #[test]
    fn resumo_soma_valor_pela_conversao_de_cada_item() {
        let itens = vec![
            // 2500 etiquetas a 100 por cartela = meia cartela = 50.
            item(2500, Decimal::from(100), 0, Some(TipoUnidade::Cartela)),
            // 3 rolos a 20 = 60.
            item(3, Decimal::from(20), 5, Some(TipoUnidade::Rolo)),
        ];
        let resumo = resumir(&itens);
        assert_eq!(resumo.total_itens, 2);
        assert_eq!(resumo.total_unidades, 2503);
        assert_eq!(resumo.valor_total, Decimal::from(110));
        assert_eq!(resumo.itens_criticos, 1);
    }
}
