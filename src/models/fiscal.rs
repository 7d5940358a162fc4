// src/models/fiscal.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Enums (Mapeando o Postgres) ---

// Veredito de conformidade de uma nota. NULL no banco = nunca classificada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_nfe")]
pub enum DocumentStatus {
    Aprovado,  // Sem problemas detectados
    Alerta,    // Revisar: só alertas
    Reprovado, // Pelo menos um erro crítico
}

// O flag "optante pelo Simples" é tri-estado (sim/não/sem informação).
// Modelamos como enum para não espalhar checagem de NULL pelo código.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    Simples,
    Presumido,
    SemInformacao,
}

impl TaxRegime {
    pub fn from_optante(optante: Option<bool>) -> Self {
        match optante {
            Some(true) => TaxRegime::Simples,
            Some(false) => TaxRegime::Presumido,
            None => TaxRegime::SemInformacao,
        }
    }
}

// Filtro de listagem: `Todos` é pseudo-categoria, nunca derivada de uma nota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegimeFilter {
    Simples,
    Presumido,
    SemInformacao,
    Todos,
}

impl RegimeFilter {
    pub fn matches(&self, regime: TaxRegime) -> bool {
        match self {
            RegimeFilter::Todos => true,
            RegimeFilter::Simples => regime == TaxRegime::Simples,
            RegimeFilter::Presumido => regime == TaxRegime::Presumido,
            RegimeFilter::SemInformacao => regime == TaxRegime::SemInformacao,
        }
    }
}

// --- Structs ---

// Uma NF-e como chega do processo de ingestão. Quase tudo é opcional: a
// fonte é semi-estruturada e os campos monetários são texto livre no
// formato da fonte ("R$ 1.234,56"). O parse acontece na leitura, nunca
// na escrita.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FiscalDocument {
    pub id: i64,

    #[schema(example = "987")]
    pub numero_nfe: Option<String>,
    #[schema(example = "1")]
    pub serie: Option<String>,
    #[schema(example = "35200114200166000187550010000000046550000045")]
    pub chave_acesso: Option<String>,

    pub data_emissao: Option<DateTime<Utc>>,
    pub data_autorizacao: Option<DateTime<Utc>>,

    pub emitente_proprio: Option<bool>,
    pub optante_simples: Option<bool>,

    #[schema(example = "Comercial Ltda")]
    pub nome_destinatario: Option<String>,
    #[schema(example = "12.345.678/0001-99")]
    pub cnpj_destinatario: Option<String>,
    pub endereco_destinatario: Option<String>,
    pub contato_destinatario: Option<String>,

    pub descricao_produto: Option<String>,
    #[schema(example = "84713012")]
    pub ncm: Option<String>,
    #[schema(example = "5102")]
    pub cfop: Option<String>,
    #[schema(example = "Venda de mercadoria adquirida")]
    pub natureza_operacao: Option<String>,
    #[schema(example = "00")]
    pub situacao_tributaria: Option<String>,

    #[schema(example = "R$ 1.500,00")]
    pub valor_total_nfe: Option<String>,
    pub valor_icms: Option<String>,
    pub valor_pis: Option<String>,
    pub valor_cofins: Option<String>,
    pub valor_ipi: Option<String>,

    pub status: Option<DocumentStatus>,
    pub explicacao: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

impl FiscalDocument {
    pub fn regime(&self) -> TaxRegime {
        TaxRegime::from_optante(self.optante_simples)
    }
}
