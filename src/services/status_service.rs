// src/services/status_service.rs

use crate::{
    common::error::AppError,
    db::TransitionStore,
    models::{
        audit::{NewStatusEntry, StatusHistoryEntry},
        fiscal::DocumentStatus,
    },
};

/// Tamanho mínimo do motivo, em caracteres, depois do trim.
pub const MIN_MOTIVO_CHARS: usize = 10;

const LIMITE_HISTORICO_PADRAO: i64 = 20;
const LIMITE_HISTORICO_MAXIMO: i64 = 100;

// Gerencia o ciclo de vida do status: valida a transição pedida e executa o
// commit em duas escritas (status + histórico) com compensação quando a
// segunda falha. Qualquer par de status DISTINTOS é transição válida; a
// identidade do operador chega como parâmetro explícito, resolvida pela
// camada HTTP a partir da sessão.
#[derive(Clone)]
pub struct StatusService<S> {
    store: S,
}

impl<S: TransitionStore> StatusService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn request_transition(
        &self,
        nota_id: i64,
        status_atual: DocumentStatus,
        status_novo: DocumentStatus,
        motivo: &str,
        usuario_email: &str,
    ) -> Result<StatusHistoryEntry, AppError> {
        // 1. Rejeições sem nenhuma escrita
        let motivo = motivo.trim();
        if usuario_email.trim().is_empty() {
            return Err(AppError::InvalidToken);
        }
        if motivo.chars().count() < MIN_MOTIVO_CHARS {
            return Err(AppError::ReasonTooShort);
        }
        if status_novo == status_atual {
            return Err(AppError::SameStatusTransition);
        }

        // 2. Escrita 1: o status da nota
        self.store.set_status(nota_id, status_novo).await?;

        // 3. Escrita 2: a trilha de auditoria. Se falhar, tentamos reverter
        // a escrita 1; o chamador sempre distingue "revertido" de
        // "possivelmente inconsistente".
        let entrada = NewStatusEntry {
            nota_id,
            status_anterior: status_atual,
            status_novo,
            motivo,
            usuario_email,
        };

        match self.store.append_history(entrada).await {
            Ok(gravado) => Ok(gravado),
            Err(causa) => match self.store.set_status(nota_id, status_atual).await {
                Ok(()) => Err(AppError::TransitionReverted(causa.to_string())),
                Err(reversao) => Err(AppError::InconsistentState {
                    original: causa.to_string(),
                    compensation: reversao.to_string(),
                }),
            },
        }
    }

    /// Entradas mais recentes primeiro.
    pub async fn history(
        &self,
        nota_id: i64,
        limite: Option<i64>,
    ) -> Result<Vec<StatusHistoryEntry>, AppError> {
        let limite = limite
            .unwrap_or(LIMITE_HISTORICO_PADRAO)
            .clamp(1, LIMITE_HISTORICO_MAXIMO);
        self.store.history(nota_id, limite).await
    }

    /// Checagem barata de existência, sem carregar o histórico.
    pub async fn has_manual_changes(&self, nota_id: i64) -> Result<bool, AppError> {
        self.store.has_history(nota_id).await
    }
}
