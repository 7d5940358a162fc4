// src/config.rs

use crate::{
    db::{HistoricoRepository, NotaRepository},
    services::{
        metrics_service::MetricsService, status_service::StatusService,
        validation_service::ValidationService,
    },
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub nota_repo: NotaRepository,
    pub validation_service: ValidationService,
    pub status_service: StatusService<HistoricoRepository>,
    pub metrics_service: MetricsService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let nota_repo = NotaRepository::new(db_pool.clone());
        let historico_repo = HistoricoRepository::new(db_pool.clone());

        let validation_service = ValidationService::new(nota_repo.clone());
        let status_service = StatusService::new(historico_repo);
        let metrics_service = MetricsService::new(nota_repo.clone());

        Ok(Self {
            db_pool,
            jwt_secret,
            nota_repo,
            validation_service,
            status_service,
            metrics_service,
        })
    }
}
