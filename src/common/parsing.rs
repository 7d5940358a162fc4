// src/common/parsing.rs

use rust_decimal::Decimal;
use std::str::FromStr;

// Os campos monetários das notas chegam em formato livre ("R$ 1.234,56",
// "1500.00", vazio...). O parse precisa ser total: um campo malformado
// vira zero, nunca aborta uma agregação de milhares de registros.

/// Converte um valor monetário em formato brasileiro livre para `Decimal`.
/// A última vírgula, quando existe, é o separador decimal; os demais
/// separadores são descartados. Retorna `Decimal::ZERO` para entrada
/// nula, vazia ou imprestável.
pub fn parse_amount(raw: Option<&str>) -> Decimal {
    let Some(raw) = raw else {
        return Decimal::ZERO;
    };

    let filtered: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if filtered.is_empty() {
        return Decimal::ZERO;
    }

    let normalized = match filtered.rfind(',') {
        Some(pos) => {
            // Convenção brasileira: "1.234,56" -> "1234.56"
            let (inteiro, decimal) = filtered.split_at(pos);
            let inteiro: String = inteiro.chars().filter(|c| !matches!(c, ',' | '.')).collect();
            let decimal: String = decimal[1..].chars().filter(|c| !matches!(c, ',' | '.')).collect();
            format!("{inteiro}.{decimal}")
        }
        // Sem vírgula assumimos que o ponto (se houver) já é decimal.
        None => filtered,
    };

    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}

/// Mantém apenas os dígitos ASCII. Normalização usada pelas regras de
/// validação e pelos formatadores ("12.345.678/0001-99" -> "12345678000199").
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

// Formatadores de exibição. Se a entrada não reduz à quantidade exata de
// dígitos esperada, devolvemos o texto original: formatação nunca bloqueia
// a renderização de um campo sujo.

/// "12345678000199" -> "12.345.678/0001-99"
pub fn format_cnpj(raw: &str) -> String {
    let d = digits_only(raw);
    if d.len() != 14 {
        return raw.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &d[0..2],
        &d[2..5],
        &d[5..8],
        &d[8..12],
        &d[12..14]
    )
}

/// Chave de acesso (44 dígitos) em grupos de 4, separados por espaço.
pub fn format_chave_acesso(raw: &str) -> String {
    let d = digits_only(raw);
    if d.len() != 44 {
        return raw.to_string();
    }
    d.as_bytes()
        .chunks(4)
        .map(|grupo| std::str::from_utf8(grupo).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}

/// "12345678" -> "1234.56.78"
pub fn format_ncm(raw: &str) -> String {
    let d = digits_only(raw);
    if d.len() != 8 {
        return raw.to_string();
    }
    format!("{}.{}.{}", &d[0..4], &d[4..6], &d[6..8])
}

/// "5102" -> "5.102"
pub fn format_cfop(raw: &str) -> String {
    let d = digits_only(raw);
    if d.len() != 4 {
        return raw.to_string();
    }
    format!("{}.{}", &d[0..1], &d[1..4])
}
