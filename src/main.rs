// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Todo o resto da API exige o Bearer token.
    let api_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route(
            "/estoque",
            get(handlers::estoque::listar_estoque).post(handlers::estoque::registrar_entrada),
        )
        .route("/estoque/{id}", axum::routing::delete(handlers::estoque::excluir_item))
        .route("/estoque/criticos", get(handlers::dashboard::itens_criticos))
        .route(
            "/saidas",
            get(handlers::estoque::listar_saidas).post(handlers::estoque::registrar_saida),
        )
        .route(
            "/producao",
            get(handlers::producao::listar).post(handlers::producao::iniciar),
        )
        .route("/producao/{id}/finalizar", put(handlers::producao::finalizar))
        .route(
            "/fornecedores",
            get(handlers::catalogo::listar_fornecedores).post(handlers::catalogo::criar_fornecedor),
        )
        .route(
            "/fornecedores/{id}",
            put(handlers::catalogo::renomear_fornecedor)
                .delete(handlers::catalogo::excluir_fornecedor),
        )
        .route(
            "/categorias",
            get(handlers::catalogo::listar_categorias).post(handlers::catalogo::criar_categoria),
        )
        .route(
            "/categorias/{id}",
            put(handlers::catalogo::atualizar_categoria)
                .delete(handlers::catalogo::excluir_categoria),
        )
        .route("/dashboard/resumo", get(handlers::dashboard::resumo))
        .route(
            "/relatorios/estoque.csv",
            get(handlers::relatorios::exportar_estoque_csv),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .with_state(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
