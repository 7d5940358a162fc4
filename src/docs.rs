// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Notas ---
        handlers::notas::list_documents,
        handlers::notas::get_document,

        // --- Validação ---
        handlers::notas::validate_document,
        handlers::notas::validate_batch,

        // --- Status / Histórico ---
        handlers::notas::change_status,
        handlers::notas::get_history,
        handlers::notas::has_manual_change,

        // --- Métricas ---
        handlers::metricas::get_summary,
        handlers::metricas::get_monthly_chart,
        handlers::metricas::get_top_counterparts,
    ),
    components(
        schemas(
            // --- Notas ---
            models::fiscal::FiscalDocument,
            models::fiscal::DocumentStatus,
            models::fiscal::TaxRegime,
            models::fiscal::RegimeFilter,

            // --- Auditoria ---
            models::audit::StatusHistoryEntry,

            // --- Métricas ---
            models::metrics::AuditMetrics,
            models::metrics::StatusTally,
            models::metrics::RegimeTally,
            models::metrics::TopGroupEntry,

            // --- Payloads ---
            handlers::notas::ChangeStatusPayload,
            handlers::notas::ValidationResponse,
            handlers::notas::ManualChangeResponse,
        )
    ),
    tags(
        (name = "Notas", description = "Consulta das notas fiscais ingeridas"),
        (name = "Validação", description = "Regras de conformidade e veredito sugerido"),
        (name = "Status", description = "Transições manuais de status e trilha de auditoria"),
        (name = "Métricas", description = "Indicadores e agrupamentos do painel")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
