// src/handlers/notas.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        audit::StatusHistoryEntry,
        fiscal::{DocumentStatus, FiscalDocument, RegimeFilter},
        validation::ValidationOutcome,
    },
    services::{metrics_service::filter_by_regime, validation_service},
};

// =============================================================================
//  1. LISTAGEM E DETALHE
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListNotasQuery {
    pub status: Option<DocumentStatus>,
    pub regime: Option<RegimeFilter>,
}

// GET /api/notas
#[utoipa::path(
    get,
    path = "/api/notas",
    tag = "Notas",
    responses(
        (status = 200, description = "Notas fiscais ingeridas, mais recentes primeiro", body = Vec<FiscalDocument>),
        (status = 401, description = "Não autorizado")
    ),
    params(
        ("status" = Option<DocumentStatus>, Query, description = "Filtra pelo status atual"),
        ("regime" = Option<RegimeFilter>, Query, description = "Filtra pelo regime tributário (todos = sem filtro)")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filtros): Query<ListNotasQuery>,
) -> Result<impl IntoResponse, AppError> {
    let notas = match filtros.status {
        Some(status) => {
            app_state
                .nota_repo
                .list_by_status(&app_state.db_pool, status)
                .await?
        }
        None => app_state.nota_repo.list_all(&app_state.db_pool).await?,
    };

    // O regime é derivado de um flag tri-estado; filtramos após a leitura.
    let notas = match filtros.regime {
        Some(filtro) => filter_by_regime(notas, filtro),
        None => notas,
    };

    Ok((StatusCode::OK, Json(notas)))
}

// GET /api/notas/{id}
#[utoipa::path(
    get,
    path = "/api/notas/{id}",
    tag = "Notas",
    responses(
        (status = 200, description = "Nota fiscal", body = FiscalDocument),
        (status = 404, description = "Nota não encontrada")
    ),
    params(
        ("id" = i64, Path, description = "ID da nota fiscal")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(nota_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let nota = app_state
        .nota_repo
        .find_by_id(&app_state.db_pool, nota_id)
        .await?;

    Ok((StatusCode::OK, Json(nota)))
}

// =============================================================================
//  2. VALIDAÇÃO
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub nota_id: i64,
    pub valido: bool,
    pub status_sugerido: DocumentStatus,
    pub erros: Vec<String>,
    pub alertas: Vec<String>,
    #[schema(example = "Nenhum problema encontrado na validação automática.")]
    pub relatorio: String,
}

impl ValidationResponse {
    fn from_outcome(nota_id: i64, resultado: ValidationOutcome) -> Self {
        Self {
            nota_id,
            valido: resultado.is_valid(),
            status_sugerido: resultado.suggested_status(),
            relatorio: validation_service::report(&resultado),
            erros: resultado.erros,
            alertas: resultado.alertas,
        }
    }
}

// GET /api/notas/{id}/validacao
#[utoipa::path(
    get,
    path = "/api/notas/{id}/validacao",
    tag = "Validação",
    responses(
        (status = 200, description = "Resultado das regras sobre a nota", body = ValidationResponse),
        (status = 404, description = "Nota não encontrada")
    ),
    params(
        ("id" = i64, Path, description = "ID da nota fiscal")
    ),
    security(("api_jwt" = []))
)]
pub async fn validate_document(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(nota_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let (nota, resultado) = app_state
        .validation_service
        .validate_one(&app_state.db_pool, nota_id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ValidationResponse::from_outcome(nota.id, resultado)),
    ))
}

// GET /api/notas/validacao
#[utoipa::path(
    get,
    path = "/api/notas/validacao",
    tag = "Validação",
    responses(
        (status = 200, description = "Validação de todas as notas, uma entrada por nota", body = Vec<ValidationResponse>)
    ),
    security(("api_jwt" = []))
)]
pub async fn validate_batch(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let resultados = app_state
        .validation_service
        .validate_all(&app_state.db_pool)
        .await?;

    let mut corpo: Vec<ValidationResponse> = resultados
        .into_iter()
        .map(|(nota_id, resultado)| ValidationResponse::from_outcome(nota_id, resultado))
        .collect();
    // HashMap não tem ordem; a resposta tem.
    corpo.sort_by_key(|r| r.nota_id);

    Ok((StatusCode::OK, Json(corpo)))
}

// =============================================================================
//  3. TRANSIÇÃO DE STATUS + HISTÓRICO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    #[schema(example = "Alerta")]
    pub status_atual: DocumentStatus,

    #[schema(example = "Aprovado")]
    pub status_novo: DocumentStatus,

    #[validate(length(min = 10, message = "O motivo deve ter pelo menos 10 caracteres."))]
    #[schema(example = "Revisado manualmente, documento correto.")]
    pub motivo: String,
}

// POST /api/notas/{id}/status
#[utoipa::path(
    post,
    path = "/api/notas/{id}/status",
    tag = "Status",
    request_body = ChangeStatusPayload,
    responses(
        (status = 201, description = "Status alterado e auditado", body = StatusHistoryEntry),
        (status = 404, description = "Nota não encontrada"),
        (status = 422, description = "Motivo curto demais ou transição para o mesmo status"),
        (status = 500, description = "Falha de gravação (status revertido ou inconsistente)")
    ),
    params(
        ("id" = i64, Path, description = "ID da nota fiscal")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(nota_id): Path<i64>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entrada = app_state
        .status_service
        .request_transition(
            nota_id,
            payload.status_atual,
            payload.status_novo,
            &payload.motivo,
            &user.0,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entrada)))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limite: Option<i64>,
}

// GET /api/notas/{id}/historico
#[utoipa::path(
    get,
    path = "/api/notas/{id}/historico",
    tag = "Status",
    responses(
        (status = 200, description = "Trilha de auditoria, mais recente primeiro", body = Vec<StatusHistoryEntry>)
    ),
    params(
        ("id" = i64, Path, description = "ID da nota fiscal"),
        ("limite" = Option<i64>, Query, description = "Máximo de entradas (padrão 20, teto 100)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_history(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(nota_id): Path<i64>,
    Query(filtro): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let historico = app_state
        .status_service
        .history(nota_id, filtro.limite)
        .await?;

    Ok((StatusCode::OK, Json(historico)))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualChangeResponse {
    pub alterada_manualmente: bool,
}

// GET /api/notas/{id}/historico/existe
#[utoipa::path(
    get,
    path = "/api/notas/{id}/historico/existe",
    tag = "Status",
    responses(
        (status = 200, description = "Indica se a nota já sofreu alteração manual", body = ManualChangeResponse)
    ),
    params(
        ("id" = i64, Path, description = "ID da nota fiscal")
    ),
    security(("api_jwt" = []))
)]
pub async fn has_manual_change(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(nota_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let alterada = app_state.status_service.has_manual_changes(nota_id).await?;

    Ok((
        StatusCode::OK,
        Json(ManualChangeResponse {
            alterada_manualmente: alterada,
        }),
    ))
}
