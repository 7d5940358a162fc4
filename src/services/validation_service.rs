// src/services/validation_service.rs

use std::collections::HashMap;

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        parsing::{digits_only, parse_amount},
    },
    db::NotaRepository,
    models::{
        fiscal::FiscalDocument,
        validation::{Severity, ValidationOutcome},
    },
};

// =========================================================================
//  REGRAS
// =========================================================================

// Cada regra inspeciona UMA preocupação e não depende do resultado de outra.
// Lista plana de dados, sem hierarquia de tipos: regras não compartilham
// comportamento além de "avaliar e reportar". A ordem da lista define a
// ordem das mensagens; o veredito só olha as contagens.
pub struct Rule {
    pub name: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    pub fails: fn(&FiscalDocument) -> bool,
}

fn blank(campo: Option<&String>) -> bool {
    campo.is_none_or(|s| s.trim().is_empty())
}

// Presente e com exatamente `esperado` dígitos após normalização.
fn has_digits(campo: Option<&String>, esperado: usize) -> bool {
    campo.is_some_and(|s| digits_only(s).len() == esperado)
}

pub static RULES: &[Rule] = &[
    Rule {
        name: "NCM",
        severity: Severity::Error,
        message: "código ausente ou diferente de 8 dígitos",
        fails: |nota| !has_digits(nota.ncm.as_ref(), 8),
    },
    Rule {
        name: "CFOP",
        severity: Severity::Error,
        message: "código ausente ou diferente de 4 dígitos",
        fails: |nota| !has_digits(nota.cfop.as_ref(), 4),
    },
    Rule {
        name: "Valor total",
        severity: Severity::Error,
        message: "valor total da nota ausente, zerado ou negativo",
        fails: |nota| parse_amount(nota.valor_total_nfe.as_deref()) <= rust_decimal::Decimal::ZERO,
    },
    Rule {
        name: "Número da NF-e",
        severity: Severity::Error,
        message: "número da nota não informado",
        fails: |nota| blank(nota.numero_nfe.as_ref()),
    },
    Rule {
        name: "Chave de acesso",
        severity: Severity::Error,
        message: "chave ausente ou diferente de 44 dígitos",
        fails: |nota| !has_digits(nota.chave_acesso.as_ref(), 44),
    },
    Rule {
        name: "Destinatário",
        severity: Severity::Warning,
        message: "nem nome nem CNPJ do destinatário informados",
        fails: |nota| {
            blank(nota.nome_destinatario.as_ref()) && blank(nota.cnpj_destinatario.as_ref())
        },
    },
    Rule {
        name: "CNPJ do destinatário",
        severity: Severity::Warning,
        message: "CNPJ informado com quantidade de dígitos diferente de 14",
        fails: |nota| {
            !blank(nota.cnpj_destinatario.as_ref())
                && !has_digits(nota.cnpj_destinatario.as_ref(), 14)
        },
    },
    Rule {
        name: "Descrição do produto",
        severity: Severity::Warning,
        message: "descrição ausente ou curta demais",
        fails: |nota| {
            nota.descricao_produto
                .as_ref()
                .is_none_or(|d| d.trim().chars().count() < 5)
        },
    },
    Rule {
        name: "Situação tributária",
        severity: Severity::Warning,
        message: "código de situação tributária do ICMS não informado",
        fails: |nota| blank(nota.situacao_tributaria.as_ref()),
    },
    Rule {
        name: "Carga tributária",
        severity: Severity::Warning,
        message: "soma de ICMS, PIS e COFINS acima de 150% do valor total",
        fails: |nota| {
            let impostos = parse_amount(nota.valor_icms.as_deref())
                + parse_amount(nota.valor_pis.as_deref())
                + parse_amount(nota.valor_cofins.as_deref());
            let total = parse_amount(nota.valor_total_nfe.as_deref());
            impostos > total * rust_decimal::Decimal::new(15, 1)
        },
    },
];

// =========================================================================
//  AVALIAÇÃO
// =========================================================================

/// Roda todas as regras sobre uma nota. Total: nunca falha, nunca lança —
/// uma nota malformada não pode derrubar a auditoria de um lote inteiro.
pub fn validate_document(nota: &FiscalDocument) -> ValidationOutcome {
    let mut resultado = ValidationOutcome::default();

    for regra in RULES {
        if (regra.fails)(nota) {
            let mensagem = format!("{}: {}", regra.name, regra.message);
            match regra.severity {
                Severity::Error => resultado.erros.push(mensagem),
                Severity::Warning => resultado.alertas.push(mensagem),
            }
        }
    }

    resultado
}

/// Mesma função, nota a nota, sem estado compartilhado.
pub fn validate_batch(notas: &[FiscalDocument]) -> HashMap<i64, ValidationOutcome> {
    notas
        .iter()
        .map(|nota| (nota.id, validate_document(nota)))
        .collect()
}

/// Relatório determinístico legível por humanos.
pub fn report(resultado: &ValidationOutcome) -> String {
    if resultado.erros.is_empty() && resultado.alertas.is_empty() {
        return "Nenhum problema encontrado na validação automática.".to_string();
    }

    let mut texto = String::new();

    if !resultado.erros.is_empty() {
        texto.push_str("ERROS CRÍTICOS:\n");
        for erro in &resultado.erros {
            texto.push_str("- ");
            texto.push_str(erro);
            texto.push('\n');
        }
    }

    if !resultado.alertas.is_empty() {
        if !texto.is_empty() {
            texto.push('\n');
        }
        texto.push_str("ALERTAS:\n");
        for alerta in &resultado.alertas {
            texto.push_str("- ");
            texto.push_str(alerta);
            texto.push('\n');
        }
    }

    texto
}

// =========================================================================
//  SERVIÇO
// =========================================================================

#[derive(Clone)]
pub struct ValidationService {
    repo: NotaRepository,
}

impl ValidationService {
    pub fn new(repo: NotaRepository) -> Self {
        Self { repo }
    }

    pub async fn validate_one<'e, E>(
        &self,
        executor: E,
        nota_id: i64,
    ) -> Result<(FiscalDocument, ValidationOutcome), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let nota = self.repo.find_by_id(executor, nota_id).await?;
        let resultado = validate_document(&nota);
        Ok((nota, resultado))
    }

    pub async fn validate_all<'e, E>(
        &self,
        executor: E,
    ) -> Result<HashMap<i64, ValidationOutcome>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notas = self.repo.list_all(executor).await?;
        Ok(validate_batch(&notas))
    }
}
