//! Propriedades do parser de campos fiscais e do veredito de validação.
//!
//! O contrato central do parser é totalidade: qualquer entrada, por pior que
//! seja, produz um número — nunca pânico, nunca erro. O proptest martela
//! exatamente isso.

use proptest::prelude::*;
use rust_decimal::Decimal;

use auditoria_nfe::common::parsing::{
    digits_only, format_cfop, format_chave_acesso, format_cnpj, format_ncm, parse_amount,
};
use auditoria_nfe::models::fiscal::{DocumentStatus, TaxRegime};
use auditoria_nfe::models::validation::ValidationOutcome;

proptest! {
    /// parse_amount é total: nenhuma string derruba o parser
    #[test]
    fn parse_amount_never_panics(entrada in ".*") {
        let _ = parse_amount(Some(&entrada));
    }

    /// Lixo ao redor do número não muda o valor parseado
    #[test]
    fn currency_symbols_are_ignored(inteiro in 0u32..1_000_000, centavos in 0u32..100) {
        let cru = format!("{inteiro},{centavos:02}");
        let decorado = format!("R$ {cru}  ");
        prop_assert_eq!(parse_amount(Some(&cru)), parse_amount(Some(&decorado)));
    }

    /// Vírgula única é separador decimal: o valor reconstruído bate
    #[test]
    fn comma_is_decimal_separator(inteiro in 0i64..1_000_000, centavos in 0i64..100) {
        let texto = format!("{inteiro},{centavos:02}");
        let esperado = Decimal::new(inteiro * 100 + centavos, 2);
        prop_assert_eq!(parse_amount(Some(&texto)), esperado);
    }

    /// digits_only só devolve dígitos, e é idempotente
    #[test]
    fn digits_only_returns_digits(entrada in ".*") {
        let digitos = digits_only(&entrada);
        prop_assert!(digitos.chars().all(|c| c.is_ascii_digit()));
        prop_assert_eq!(digits_only(&digitos), digitos.clone());
    }

    /// Precondição violada => o formatador devolve a entrada intacta
    #[test]
    fn formatters_never_mangle_bad_input(entrada in ".*") {
        let digitos = digits_only(&entrada).len();
        if digitos != 14 {
            prop_assert_eq!(format_cnpj(&entrada), entrada.clone());
        }
        if digitos != 44 {
            prop_assert_eq!(format_chave_acesso(&entrada), entrada.clone());
        }
        if digitos != 8 {
            prop_assert_eq!(format_ncm(&entrada), entrada.clone());
        }
        if digitos != 4 {
            prop_assert_eq!(format_cfop(&entrada), entrada.clone());
        }
    }

    /// Formatar não perde nem inventa dígitos
    #[test]
    fn format_cnpj_round_trips(digitos in "[0-9]{14}") {
        prop_assert_eq!(digits_only(&format_cnpj(&digitos)), digitos.clone());
    }

    #[test]
    fn format_chave_acesso_round_trips(digitos in "[0-9]{44}") {
        prop_assert_eq!(digits_only(&format_chave_acesso(&digitos)), digitos.clone());
    }

    /// Tabela-verdade do veredito: erro > alerta > aprovado, só pelas contagens
    #[test]
    fn suggested_status_follows_counts(n_erros in 0usize..4, n_alertas in 0usize..4) {
        let resultado = ValidationOutcome {
            erros: vec!["Regra: falhou".to_string(); n_erros],
            alertas: vec!["Regra: atenção".to_string(); n_alertas],
        };

        let esperado = if n_erros > 0 {
            DocumentStatus::Reprovado
        } else if n_alertas > 0 {
            DocumentStatus::Alerta
        } else {
            DocumentStatus::Aprovado
        };

        prop_assert_eq!(resultado.suggested_status(), esperado);
        prop_assert_eq!(resultado.is_valid(), n_erros == 0);
    }

    /// Classificação de regime é determinística e fechada sobre 3 categorias
    #[test]
    fn regime_classification_is_idempotent(optante in proptest::option::of(any::<bool>())) {
        let primeira = TaxRegime::from_optante(optante);
        let segunda = TaxRegime::from_optante(optante);
        prop_assert_eq!(primeira, segunda);

        match optante {
            Some(true) => prop_assert_eq!(primeira, TaxRegime::Simples),
            Some(false) => prop_assert_eq!(primeira, TaxRegime::Presumido),
            None => prop_assert_eq!(primeira, TaxRegime::SemInformacao),
        }
    }
}
