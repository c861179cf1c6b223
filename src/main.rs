//src/main.rs

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    // Inicializa o logger
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

    // Cadastro de ingredientes
    let ingredient_routes = Router::new()
        .route("/"
               ,post(handlers::inventory::create_ingredient)
               .get(handlers::inventory::list_ingredients)
        )
        .route("/{id}"
               ,put(handlers::inventory::update_ingredient)
               .delete(handlers::inventory::deactivate_ingredient)
        );

    // Livro-razão de movimentações
    let inventory_routes = Router::new()
        .route("/movements"
               ,post(handlers::inventory::record_movement)
               .get(handlers::inventory::list_movements)
        );

    // Compras: criação, consulta e transições de estado
    let purchase_routes = Router::new()
        .route("/"
               ,post(handlers::purchases::create_purchase)
               .get(handlers::purchases::list_purchases)
        )
        .route("/{id}", get(handlers::purchases::get_purchase))
        .route("/{id}/receive", post(handlers::purchases::receive_purchase))
        .route("/{id}/cancel", post(handlers::purchases::cancel_purchase));

    // Receitas e custeio derivado
    let recipe_routes = Router::new()
        .route("/"
               ,post(handlers::recipes::create_recipe)
               .get(handlers::recipes::list_recipes)
        )
        .route("/{id}/cost", get(handlers::recipes::get_recipe_cost));

    // Produtos e precificação derivada
    let product_routes = Router::new()
        .route("/"
               ,post(handlers::products::create_product)
               .get(handlers::products::list_products)
        )
        .route("/{id}/pricing", get(handlers::products::get_product_pricing))
        .route("/{id}/costs", patch(handlers::products::update_product_costs));

    // Relatórios derivados (saúde do estoque e análise de custos)
    let report_routes = Router::new()
        .route("/inventory", get(handlers::reports::inventory_report))
        .route("/cost-analysis", get(handlers::reports::cost_analysis));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/ingredients", ingredient_routes)
        .nest("/api/inventory", inventory_routes)
        .nest("/api/purchases", purchase_routes)
        .nest("/api/recipes", recipe_routes)
        .nest("/api/products", product_routes)
        .nest("/api/reports", report_routes)
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
