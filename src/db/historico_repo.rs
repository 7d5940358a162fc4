// src/db/historico_repo.rs

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{
        audit::{NewStatusEntry, StatusHistoryEntry},
        fiscal::DocumentStatus,
    },
};

// As duas escritas da transição (status + histórico) passam por este trait
// para que o commit compensado seja testável sem Postgres. O contrato é de
// duas chamadas separadas de propósito: o backend remoto original não expõe
// transação multi-statement a esta camada.
#[async_trait]
pub trait TransitionStore: Send + Sync {
    async fn set_status(&self, nota_id: i64, status: DocumentStatus) -> Result<(), AppError>;

    async fn append_history(
        &self,
        entry: NewStatusEntry<'_>,
    ) -> Result<StatusHistoryEntry, AppError>;

    async fn history(
        &self,
        nota_id: i64,
        limit: i64,
    ) -> Result<Vec<StatusHistoryEntry>, AppError>;

    async fn has_history(&self, nota_id: i64) -> Result<bool, AppError>;
}

// Permite usar qualquer `TransitionStore` atrás de um `Arc` compartilhado
// (ex.: um handle observável nos testes), encaminhando cada método ao interior.
#[async_trait]
impl<T: TransitionStore + ?Sized> TransitionStore for Arc<T> {
    async fn set_status(&self, nota_id: i64, status: DocumentStatus) -> Result<(), AppError> {
        (**self).set_status(nota_id, status).await
    }

    async fn append_history(
        &self,
        entry: NewStatusEntry<'_>,
    ) -> Result<StatusHistoryEntry, AppError> {
        (**self).append_history(entry).await
    }

    async fn history(
        &self,
        nota_id: i64,
        limit: i64,
    ) -> Result<Vec<StatusHistoryEntry>, AppError> {
        (**self).history(nota_id, limit).await
    }

    async fn has_history(&self, nota_id: i64) -> Result<bool, AppError> {
        (**self).has_history(nota_id).await
    }
}

#[derive(Clone)]
pub struct HistoricoRepository {
    pool: PgPool,
}

impl HistoricoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransitionStore for HistoricoRepository {
    async fn set_status(&self, nota_id: i64, status: DocumentStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE notas_fiscais SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(nota_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::DocumentNotFound);
        }

        Ok(())
    }

    async fn append_history(
        &self,
        entry: NewStatusEntry<'_>,
    ) -> Result<StatusHistoryEntry, AppError> {
        let gravado = sqlx::query_as::<_, StatusHistoryEntry>(
            r#"
            INSERT INTO historico_status_notas
                (nota_id, status_anterior, status_novo, motivo, usuario_email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, nota_id, status_anterior, status_novo, motivo, usuario_email, created_at
            "#,
        )
        .bind(entry.nota_id)
        .bind(entry.status_anterior)
        .bind(entry.status_novo)
        .bind(entry.motivo)
        .bind(entry.usuario_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(gravado)
    }

    async fn history(
        &self,
        nota_id: i64,
        limit: i64,
    ) -> Result<Vec<StatusHistoryEntry>, AppError> {
        let entradas = sqlx::query_as::<_, StatusHistoryEntry>(
            r#"
            SELECT id, nota_id, status_anterior, status_novo, motivo, usuario_email, created_at
            FROM historico_status_notas
            WHERE nota_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(nota_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entradas)
    }

    async fn has_history(&self, nota_id: i64) -> Result<bool, AppError> {
        let existe = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM historico_status_notas WHERE nota_id = $1)",
        )
        .bind(nota_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(existe)
    }
}
