// src/db/nota_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::fiscal::{DocumentStatus, FiscalDocument},
};

// Leitura das notas ingeridas. Usamos queries em tempo de execução
// (query_as + bind) porque o schema das notas vem do processo de ingestão,
// não de structs nossas.
#[derive(Clone)]
pub struct NotaRepository {
    pool: PgPool,
}

impl NotaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all<'e, E>(&self, executor: E) -> Result<Vec<FiscalDocument>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notas = sqlx::query_as::<_, FiscalDocument>(
            r#"
            SELECT *
            FROM notas_fiscais
            ORDER BY data_emissao DESC NULLS LAST, id DESC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(notas)
    }

    pub async fn list_by_status<'e, E>(
        &self,
        executor: E,
        status: DocumentStatus,
    ) -> Result<Vec<FiscalDocument>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notas = sqlx::query_as::<_, FiscalDocument>(
            r#"
            SELECT *
            FROM notas_fiscais
            WHERE status = $1
            ORDER BY data_emissao DESC NULLS LAST, id DESC
            "#,
        )
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(notas)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        nota_id: i64,
    ) -> Result<FiscalDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let nota = sqlx::query_as::<_, FiscalDocument>(
            "SELECT * FROM notas_fiscais WHERE id = $1",
        )
        .bind(nota_id)
        .fetch_optional(executor)
        .await?;

        nota.ok_or(AppError::DocumentNotFound)
    }
}
