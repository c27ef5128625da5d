// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{CatalogoRepository, EstoqueRepository, ProducaoRepository, UserRepository},
    services::{
        auth::AuthService, catalogo_service::CatalogoService, dashboard_service::DashboardService,
        estoque_service::EstoqueService, producao_service::ProducaoService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub catalogo_service: CatalogoService,
    pub estoque_service: EstoqueService,
    pub producao_service: ProducaoService,
    pub dashboard_service: DashboardService,
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
        let user_repo = UserRepository::new(db_pool.clone());
        let catalogo_repo = CatalogoRepository::new(db_pool.clone());
        let estoque_repo = EstoqueRepository::new(db_pool.clone());
        let producao_repo = ProducaoRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret);
        let catalogo_service = CatalogoService::new(catalogo_repo.clone(), db_pool.clone());
        let estoque_service =
            EstoqueService::new(estoque_repo.clone(), catalogo_repo, db_pool.clone());
        let producao_service =
            ProducaoService::new(producao_repo, estoque_repo.clone(), db_pool.clone());
        let dashboard_service = DashboardService::new(estoque_repo);

        Ok(Self {
            db_pool,
            auth_service,
            catalogo_service,
            estoque_service,
            producao_service,
            dashboard_service,
        })
    }
}
