// src/config.rs

use crate::{
    db::{InventoryRepository, ProductRepository, PurchaseRepository, RecipeRepository},
    services::{AnalysisService, ProductService, RecipeService, ReportService, StockService},
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub stock_service: StockService,
    pub recipe_service: RecipeService,
    pub product_service: ProductService,
    pub report_service: ReportService,
    pub analysis_service: AnalysisService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let purchase_repo = PurchaseRepository::new(db_pool.clone());
        let recipe_repo = RecipeRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());

        let stock_service = StockService::new(inventory_repo.clone(), purchase_repo.clone());
        let recipe_service = RecipeService::new(recipe_repo.clone(), inventory_repo.clone());
        let product_service = ProductService::new(
            product_repo.clone(),
            recipe_repo.clone(),
            recipe_service.clone(),
        );
        let report_service = ReportService::new(inventory_repo.clone());
        let analysis_service = AnalysisService::new(
            inventory_repo,
            recipe_repo,
            product_repo,
            purchase_repo,
        );

        Ok(Self {
            db_pool,
            stock_service,
            recipe_service,
            product_service,
            report_service,
            analysis_service,
        })
    }
}
