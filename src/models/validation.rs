// src/models/validation.rs

use crate::models::fiscal::DocumentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

// Resultado efêmero da validação de UMA nota. Não é persistido: o operador
// decide se acata o status sugerido via transição manual.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub erros: Vec<String>,
    pub alertas: Vec<String>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.erros.is_empty()
    }

    // Função pura da contagem de erros/alertas; nunca lê o status anterior.
    pub fn suggested_status(&self) -> DocumentStatus {
        if !self.erros.is_empty() {
            DocumentStatus::Reprovado
        } else if !self.alertas.is_empty() {
            DocumentStatus::Alerta
        } else {
            DocumentStatus::Aprovado
        }
    }
}
