// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::fiscal::DocumentStatus;

// Registro imutável da trilha de auditoria. Uma vez gravado, nunca é
// alterado nem removido; a ordenação de exibição é created_at DESC.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub id: Uuid,

    pub nota_id: i64,

    pub status_anterior: DocumentStatus,
    pub status_novo: DocumentStatus,

    #[schema(example = "Revisado manualmente, documento correto.")]
    pub motivo: String,

    #[schema(example = "fiscal@empresa.com.br")]
    pub usuario_email: String,

    pub created_at: DateTime<Utc>,
}

// Dados de uma entrada ainda não persistida (o banco gera id e created_at).
#[derive(Debug, Clone)]
pub struct NewStatusEntry<'a> {
    pub nota_id: i64,
    pub status_anterior: DocumentStatus,
    pub status_novo: DocumentStatus,
    pub motivo: &'a str,
    pub usuario_email: &'a str,
}
