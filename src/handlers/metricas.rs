// src/handlers/metricas.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::metrics::{AuditMetrics, TopGroupEntry},
};

// GET /api/metricas/resumo
#[utoipa::path(
    get,
    path = "/api/metricas/resumo",
    tag = "Métricas",
    responses(
        (status = 200, description = "Resumo da auditoria: contagens, somas e quebras", body = AuditMetrics),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let resumo = app_state
        .metrics_service
        .summary(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(resumo)))
}

// GET /api/metricas/evolucao-mensal
#[utoipa::path(
    get,
    path = "/api/metricas/evolucao-mensal",
    tag = "Métricas",
    responses(
        (status = 200, description = "Valor total por mês de emissão, em ordem cronológica", body = Vec<TopGroupEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_monthly_chart(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let meses = app_state
        .metrics_service
        .monthly_totals(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(meses)))
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub n: Option<usize>,
}

// GET /api/metricas/top-destinatarios
#[utoipa::path(
    get,
    path = "/api/metricas/top-destinatarios",
    tag = "Métricas",
    responses(
        (status = 200, description = "Destinatários com maior valor somado (Curva ABC)", body = Vec<TopGroupEntry>)
    ),
    params(
        ("n" = Option<usize>, Query, description = "Tamanho do ranking (padrão 5)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_top_counterparts(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filtro): Query<TopQuery>,
) -> Result<impl IntoResponse, AppError> {
    let ranking = app_state
        .metrics_service
        .top_counterparts(&app_state.db_pool, filtro.n.unwrap_or(5))
        .await?;

    Ok((StatusCode::OK, Json(ranking)))
}
