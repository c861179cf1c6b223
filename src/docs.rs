// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Ingredients ---
        handlers::inventory::create_ingredient,
        handlers::inventory::list_ingredients,
        handlers::inventory::update_ingredient,
        handlers::inventory::deactivate_ingredient,

        // --- Inventory ---
        handlers::inventory::record_movement,
        handlers::inventory::list_movements,

        // --- Purchases ---
        handlers::purchases::create_purchase,
        handlers::purchases::list_purchases,
        handlers::purchases::get_purchase,
        handlers::purchases::receive_purchase,
        handlers::purchases::cancel_purchase,

        // --- Recipes ---
        handlers::recipes::create_recipe,
        handlers::recipes::list_recipes,
        handlers::recipes::get_recipe_cost,

        // --- Products ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product_pricing,
        handlers::products::update_product_costs,

        // --- Reports ---
        handlers::reports::inventory_report,
        handlers::reports::cost_analysis,
    ),
    components(
        schemas(
            // --- Inventory ---
            models::inventory::Ingredient,
            models::inventory::IngredientBatch,
            models::inventory::MovementType,
            models::inventory::MovementReason,
            models::inventory::StockMovement,
            models::inventory::StockStatus,
            models::inventory::ExpiryStatus,

            // --- Purchasing ---
            models::purchasing::PurchaseStatus,
            models::purchasing::Purchase,
            models::purchasing::PurchaseItem,
            models::purchasing::PurchaseDetail,

            // --- Recipes ---
            models::recipes::Recipe,
            models::recipes::RecipeIngredient,
            models::recipes::RecipeCostItem,
            models::recipes::RecipeCost,

            // --- Products ---
            models::products::Product,
            models::products::ProductPricing,

            // --- Reports ---
            models::reports::BatchExpiryEntry,
            models::reports::IngredientStockEntry,
            models::reports::InventoryReport,
            models::reports::CategoryValueEntry,
            models::reports::RecipeCostEntry,
            models::reports::SupplierSpendEntry,
            models::reports::CostAnalysis,

            // --- Payloads ---
            handlers::inventory::CreateIngredientPayload,
            handlers::inventory::RecordMovementPayload,
            handlers::purchases::PurchaseItemPayload,
            handlers::purchases::CreatePurchasePayload,
            handlers::recipes::RecipeIngredientPayload,
            handlers::recipes::CreateRecipePayload,
            handlers::products::CreateProductPayload,
            handlers::products::UpdateProductCostsPayload,
        )
    ),
    tags(
        (name = "Ingredients", description = "Cadastro de Ingredientes"),
        (name = "Inventory", description = "Movimentações e Saldo de Estoque"),
        (name = "Purchases", description = "Compras e Recebimento"),
        (name = "Recipes", description = "Receitas e Custeio"),
        (name = "Products", description = "Produtos e Precificação"),
        (name = "Reports", description = "Relatórios e Análise de Custos")
    )
)]
pub struct ApiDoc;
