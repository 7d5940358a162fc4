// src/models/metrics.rs

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

// 1. Contagem por status (inclui notas nunca classificadas)
#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusTally {
    pub aprovadas: u64,
    pub alertas: u64,
    pub reprovadas: u64,
    pub sem_status: u64,
}

// 2. Contagem por regime tributário (soma = total de notas)
#[derive(Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegimeTally {
    pub simples: u64,
    pub presumido: u64,
    pub sem_informacao: u64,
}

// 3. Resumo geral (os cards do topo do painel)
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditMetrics {
    pub total_notas: u64,
    pub por_status: StatusTally,

    // Somas dos campos monetários parseados; campo ruim conta como zero.
    pub valor_total: Decimal,
    pub total_icms: Decimal,
    pub total_pis: Decimal,
    pub total_cofins: Decimal,
    pub total_ipi: Decimal,

    // Primeiro token da natureza da operação ("VENDA", "DEVOLUCAO", "OUTROS")
    pub por_tipo_operacao: BTreeMap<String, u64>,

    pub por_regime: RegimeTally,
}

// 4. Entrada de agrupamento (Top N destinatários, evolução mensal...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopGroupEntry {
    #[schema(example = "Comercial Ltda")]
    pub chave: String,
    pub quantidade: u64,
    #[schema(example = "1500.00")]
    pub soma: Decimal,
}

// Critério de ordenação do group_top_n (escolha do ponto de chamada).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Count,
    Sum,
}
