// src/services/metrics_service.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};

use crate::{
    common::{error::AppError, parsing::parse_amount},
    db::NotaRepository,
    models::{
        fiscal::{DocumentStatus, FiscalDocument, RegimeFilter, TaxRegime},
        metrics::{AuditMetrics, RegimeTally, SortBy, TopGroupEntry},
    },
};

// =========================================================================
//  REGIME TRIBUTÁRIO
// =========================================================================

pub fn filter_by_regime(
    notas: Vec<FiscalDocument>,
    filtro: RegimeFilter,
) -> Vec<FiscalDocument> {
    notas
        .into_iter()
        .filter(|nota| filtro.matches(nota.regime()))
        .collect()
}

/// Tally de formato fixo; a soma dos três campos é sempre o total de notas.
pub fn count_by_regime(notas: &[FiscalDocument]) -> RegimeTally {
    let mut tally = RegimeTally::default();
    for nota in notas {
        match nota.regime() {
            TaxRegime::Simples => tally.simples += 1,
            TaxRegime::Presumido => tally.presumido += 1,
            TaxRegime::SemInformacao => tally.sem_informacao += 1,
        }
    }
    tally
}

// =========================================================================
//  AGREGAÇÃO
// =========================================================================

/// Primeiro token da natureza da operação, em maiúsculas. O campo é texto
/// livre, não vocabulário controlado: token começando com dígito ou com
/// menos de 3 caracteres vira "OUTROS".
pub fn operation_kind(natureza: Option<&str>) -> String {
    const OUTROS: &str = "OUTROS";

    let Some(natureza) = natureza else {
        return OUTROS.to_string();
    };
    let Some(token) = natureza.split_whitespace().next() else {
        return OUTROS.to_string();
    };

    let token = token.to_uppercase();
    let comeca_com_digito = token.chars().next().is_some_and(|c| c.is_ascii_digit());

    if comeca_com_digito || token.chars().count() < 3 {
        OUTROS.to_string()
    } else {
        token
    }
}

/// Resumo em uma única passada. Cada campo monetário é parseado de forma
/// independente e zera em falha: um registro ruim degrada, não zera o lote.
pub fn aggregate(notas: &[FiscalDocument]) -> AuditMetrics {
    let mut metricas = AuditMetrics::default();

    for nota in notas {
        metricas.total_notas += 1;

        match nota.status {
            Some(DocumentStatus::Aprovado) => metricas.por_status.aprovadas += 1,
            Some(DocumentStatus::Alerta) => metricas.por_status.alertas += 1,
            Some(DocumentStatus::Reprovado) => metricas.por_status.reprovadas += 1,
            None => metricas.por_status.sem_status += 1,
        }

        metricas.valor_total += parse_amount(nota.valor_total_nfe.as_deref());
        metricas.total_icms += parse_amount(nota.valor_icms.as_deref());
        metricas.total_pis += parse_amount(nota.valor_pis.as_deref());
        metricas.total_cofins += parse_amount(nota.valor_cofins.as_deref());
        metricas.total_ipi += parse_amount(nota.valor_ipi.as_deref());

        *metricas
            .por_tipo_operacao
            .entry(operation_kind(nota.natureza_operacao.as_deref()))
            .or_insert(0) += 1;

        match nota.regime() {
            TaxRegime::Simples => metricas.por_regime.simples += 1,
            TaxRegime::Presumido => metricas.por_regime.presumido += 1,
            TaxRegime::SemInformacao => metricas.por_regime.sem_informacao += 1,
        }
    }

    metricas
}

/// Primitiva de agrupamento reutilizável: acumula {quantidade, soma} por
/// chave na ordem de primeira aparição e ordena por quantidade ou soma,
/// decrescente. `sort_by` do Vec é estável, então empates preservam a ordem
/// de entrada — determinismo exigido pelos painéis e pelos testes.
pub fn group_top_n<T, F>(itens: &[T], extract: F, n: usize, sort: SortBy) -> Vec<TopGroupEntry>
where
    F: Fn(&T) -> Option<(String, Decimal)>,
{
    let mut indice: HashMap<String, usize> = HashMap::new();
    let mut grupos: Vec<TopGroupEntry> = Vec::new();

    for item in itens {
        let Some((chave, valor)) = extract(item) else {
            continue;
        };
        match indice.get(&chave) {
            Some(&posicao) => {
                grupos[posicao].quantidade += 1;
                grupos[posicao].soma += valor;
            }
            None => {
                indice.insert(chave.clone(), grupos.len());
                grupos.push(TopGroupEntry {
                    chave,
                    quantidade: 1,
                    soma: valor,
                });
            }
        }
    }

    match sort {
        SortBy::Count => grupos.sort_by(|a, b| b.quantidade.cmp(&a.quantidade)),
        SortBy::Sum => grupos.sort_by(|a, b| b.soma.cmp(&a.soma)),
    }
    grupos.truncate(n);
    grupos
}

// =========================================================================
//  SERVIÇO
// =========================================================================

#[derive(Clone)]
pub struct MetricsService {
    repo: NotaRepository,
}

impl MetricsService {
    pub fn new(repo: NotaRepository) -> Self {
        Self { repo }
    }

    // 1. Resumo Geral (os cards do painel)
    pub async fn summary<'e, E>(&self, executor: E) -> Result<AuditMetrics, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notas = self.repo.list_all(executor).await?;
        Ok(aggregate(&notas))
    }

    // 2. Gráfico de Linha (valor total por mês de emissão)
    pub async fn monthly_totals<'e, E>(&self, executor: E) -> Result<Vec<TopGroupEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notas = self.repo.list_all(executor).await?;

        let mut meses = group_top_n(
            &notas,
            |nota| {
                let mes = nota.data_emissao?.format("%Y-%m").to_string();
                Some((mes, parse_amount(nota.valor_total_nfe.as_deref())))
            },
            usize::MAX,
            SortBy::Count,
        );

        // Para o gráfico a ordem é cronológica, não por volume.
        meses.sort_by(|a, b| a.chave.cmp(&b.chave));
        Ok(meses)
    }

    // 3. Top N destinatários por valor somado
    pub async fn top_counterparts<'e, E>(
        &self,
        executor: E,
        n: usize,
    ) -> Result<Vec<TopGroupEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notas = self.repo.list_all(executor).await?;

        Ok(group_top_n(
            &notas,
            |nota| {
                let nome = nota.nome_destinatario.as_deref()?.trim();
                if nome.is_empty() {
                    return None;
                }
                Some((nome.to_string(), parse_amount(nota.valor_total_nfe.as_deref())))
            },
            n,
            SortBy::Sum,
        ))
    }
}
