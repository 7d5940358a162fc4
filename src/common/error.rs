// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Falhas de parse de valores monetários NÃO aparecem aqui: parse nunca é
// erro, vira zero ou mensagem de validação (filosofia "reporte, não chute").
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Nota fiscal não encontrada")]
    DocumentNotFound,

    #[error("O motivo da alteração é curto demais")]
    ReasonTooShort,

    #[error("O novo status é igual ao status atual")]
    SameStatusTransition,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // A gravação do histórico falhou, mas o status foi revertido com sucesso.
    #[error("Histórico não gravado; status revertido: {0}")]
    TransitionReverted(String),

    // Pior caso: o histórico falhou E a reversão do status também.
    // O documento pode ter ficado com o status novo sem registro de auditoria.
    #[error("Estado inconsistente: {original}; reversão falhou: {compensation}")]
    InconsistentState {
        original: String,
        compensation: String,
    },

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.",
            ),
            AppError::DocumentNotFound => {
                (StatusCode::NOT_FOUND, "Nota fiscal não encontrada.")
            }
            AppError::ReasonTooShort => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "O motivo deve ter pelo menos 10 caracteres.",
            ),
            AppError::SameStatusTransition => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "O novo status deve ser diferente do status atual.",
            ),
            AppError::TransitionReverted(ref causa) => {
                tracing::error!("Histórico não gravado, status revertido: {}", causa);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Não foi possível registrar a alteração; o status foi revertido.",
                )
            }
            AppError::InconsistentState {
                ref original,
                ref compensation,
            } => {
                tracing::error!(
                    "Estado possivelmente inconsistente: {} / reversão: {}",
                    original,
                    compensation
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Falha ao registrar a alteração e ao reverter o status; verifique o documento manualmente.",
                )
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
