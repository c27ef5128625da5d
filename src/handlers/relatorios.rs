// src/handlers/relatorios.rs

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::{common::error::AppError, config::AppState, models::estoque::ItemEstoqueComValor};

fn campo_csv(valor: &str) -> String {
    if valor.contains(',') || valor.contains('"') || valor.contains('\n') {
        format!("\"{}\"", valor.replace('"', "\"\""))
    } else {
        valor.to_string()
    }
}

fn montar_csv(itens: &[ItemEstoqueComValor]) -> String {
    let mut csv = String::from(
        "produto,fornecedor,categoria,pacotes,unidadesAvulsas,totalUnidades,custoPorPacote,estoqueMinimo,ultimaEntrada,valorEstoque\n",
    );
    for linha in itens {
        let item = &linha.item;
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            campo_csv(&item.produto),
            campo_csv(item.fornecedor_nome.as_deref().unwrap_or("")),
            campo_csv(item.categoria_nome.as_deref().unwrap_or("")),
            item.pacotes,
            item.unidades_avulsas,
            item.total_unidades,
            item.custo_por_pacote,
            item.estoque_minimo,
            item.ultima_entrada.map(|d| d.to_string()).unwrap_or_default(),
            linha.valor_estoque,
        ));
    }
    csv
}

/// Exporta o estoque completo como CSV para download.
pub async fn exportar_estoque_csv(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let itens = app_state.estoque_service.exportar_estoque().await?;
    let csv = montar_csv(&itens);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"estoque.csv\"",
            ),
        ],
        csv,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::estoque::ItemEstoqueDetalhado;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    #[test]
    fn campo_com_virgula_eh_aspado() {
        assert_eq!(campo_csv("Etiqueta 10x15, branca"), "\"Etiqueta 10x15, branca\"");
        assert_eq!(campo_csv("simples"), "simples");
    }

    #[test]
    fn csv_tem_cabecalho_e_uma_linha_por_item() {
        let itens = vec![ItemEstoqueComValor {
            item: ItemEstoqueDetalhado {
                id: Uuid::new_v4(),
                produto: "Etiqueta X".to_string(),
                fornecedor_id: None,
                fornecedor_nome: Some("Acme".to_string()),
                categoria_id: None,
                categoria_nome: Some("Etiquetas".to_string()),
                tipo_unidade: None,
                pacotes: 1,
                unidades_avulsas: 0,
                total_unidades: 5000,
                custo_por_pacote: Decimal::from(100),
                estoque_minimo: 500,
                ultima_entrada: None,
            },
            valor_estoque: Decimal::from(100),
        }];
        let csv = montar_csv(&itens);
        let linhas: Vec<&str> = csv.lines().collect();
        assert_eq!(linhas.len(), 2);
        assert!(linhas[0].starts_with("produto,fornecedor"));
        assert!(linhas[1].starts_with("Etiqueta X,Acme,Etiquetas,1,0,5000,100,500,,100"));
    }
}
