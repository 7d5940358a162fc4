//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auditoria_nfe::config::AppState;
use auditoria_nfe::docs::ApiDoc;
use auditoria_nfe::handlers;
use auditoria_nfe::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas das notas fiscais (consulta, validação, status, histórico)
    let notas_routes = Router::new()
        .route("/", get(handlers::notas::list_documents))
        .route("/validacao", get(handlers::notas::validate_batch))
        .route("/{id}", get(handlers::notas::get_document))
        .route("/{id}/validacao", get(handlers::notas::validate_document))
        .route("/{id}/status", post(handlers::notas::change_status))
        .route("/{id}/historico", get(handlers::notas::get_history))
        .route(
            "/{id}/historico/existe",
            get(handlers::notas::has_manual_change),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas do painel de métricas
    let metricas_routes = Router::new()
        .route("/resumo", get(handlers::metricas::get_summary))
        .route(
            "/evolucao-mensal",
            get(handlers::metricas::get_monthly_chart),
        )
        .route(
            "/top-destinatarios",
            get(handlers::metricas::get_top_counterparts),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/notas", notas_routes)
        .nest("/api/metricas", metricas_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
