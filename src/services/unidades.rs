// src/services/unidades.rs
//
// Conversão entre (pacotes, unidades avulsas) e total de unidades.
// Uma cartela tem sempre 5000 etiquetas; rolos e embalagens contam 1 a 1.

use rust_decimal::Decimal;

pub const UNIDADES_POR_CARTELA: i64 = 5000;

// Enum fechado de conversão: categorias do tipo ROLO e EMBALAGEM se
// comportam de forma idêntica, então colapsam em `UnidadeInteira`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversao {
    Cartela,
    UnidadeInteira,
}

/// Converte (pacotes, avulsas) para o total de unidades.
/// Para unidades inteiras, avulsas não existem: qualquer valor informado é
/// zerado silenciosamente, casando com a normalização feita nas entradas.
pub fn para_total(conversao: Conversao, pacotes: i64, unidades_avulsas: i64) -> i64 {
    match conversao {
        Conversao::Cartela => pacotes * UNIDADES_POR_CARTELA + unidades_avulsas,
        Conversao::UnidadeInteira => pacotes,
    }
}

/// Decompõe um total de unidades em (pacotes, avulsas).
pub fn do_total(conversao: Conversao, total_unidades: i64) -> (i64, i64) {
    match conversao {
        Conversao::Cartela => (
            total_unidades / UNIDADES_POR_CARTELA,
            total_unidades % UNIDADES_POR_CARTELA,
        ),
        Conversao::UnidadeInteira => (total_unidades, 0),
    }
}

/// Custo monetário de uma quantidade de unidades.
/// Cartelas são precificadas fracionadamente (4600 etiquetas = 0,92 cartela);
/// unidades inteiras valem um pacote cada.
pub fn custo_das_unidades(
    conversao: Conversao,
    quantidade_unidades: i64,
    custo_por_pacote: Decimal,
) -> Decimal {
    match conversao {
        Conversao::Cartela => {
            Decimal::from(quantidade_unidades) / Decimal::from(UNIDADES_POR_CARTELA)
                * custo_por_pacote
        }
        Conversao::UnidadeInteira => Decimal::from(quantidade_unidades) * custo_por_pacote,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartela_converte_ida_e_volta() {
        let total = para_total(Conversao::Cartela, 2, 100);
        assert_eq!(total, 10100);
        assert_eq!(do_total(Conversao::Cartela, total), (2, 100));
    }

    #[test]
    fn unidade_inteira_zera_avulsas() {
        // Avulsas informadas para rolo/embalagem são descartadas, não é erro.
        let total = para_total(Conversao::UnidadeInteira, 7, 3);
        assert_eq!(total, 7);
        assert_eq!(do_total(Conversao::UnidadeInteira, total), (7, 0));
    }

    #[test]
    fn do_total_normaliza_avulsas_acima_de_uma_cartela() {
        assert_eq!(do_total(Conversao::Cartela, 13100), (2, 3100));
    }

    #[test]
    fn custo_fracionado_de_cartela() {
        let custo = custo_das_unidades(Conversao::Cartela, 4600, Decimal::from(100));
        assert_eq!(custo, Decimal::new(9200, 2)); // 92.00
    }

    #[test]
    fn custo_de_unidade_inteira_vale_um_pacote() {
        let custo = custo_das_unidades(Conversao::UnidadeInteira, 3, Decimal::new(2550, 2));
        assert_eq!(custo, Decimal::new(7650, 2)); // 3 * 25.50
    }

    #[test]
    fn custo_de_quantidade_zero() {
        assert_eq!(
            custo_das_unidades(Conversao::Cartela, 0, Decimal::from(100)),
            Decimal::ZERO
        );
    }
}
