// src/models/reports.rs

use serde::Serialize;
use chrono::{DateTime, Utc, NaiveDate};
use rust_decimal::Decimal;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::inventory::{ExpiryStatus, StockStatus};

// --- 1. Relatório de Saúde do Estoque ---
// Tudo aqui é derivado no momento da consulta; nada vem de colunas de
// status persistidas.

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchExpiryEntry {
    pub batch_id: Uuid,
    pub batch_number: String,
    pub quantity: Decimal,
    pub expiration_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub status: ExpiryStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientStockEntry {
    pub ingredient_id: Uuid,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub avg_cost: Decimal,
    pub stock_value: Decimal, // current_stock * avg_cost
    pub status: StockStatus,
    pub batches: Vec<BatchExpiryEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub generated_at: DateTime<Utc>,
    pub total_stock_value: Decimal,
    pub ok_count: i64,
    pub low_count: i64,
    pub critical_count: i64,
    pub expiring_batches: i64, // Lotes em CRITICAL ou EXPIRED
    pub items: Vec<IngredientStockEntry>,
}

// --- 2. Análise de Custos (Dashboard) ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryValueEntry {
    pub category: String,
    pub value: Decimal,
    pub percentage: Decimal, // Fatia do valor total de estoque (0-100)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCostEntry {
    pub recipe_id: Uuid,
    pub name: String,
    pub total_cost: Decimal,
    pub cost_per_serving: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSpendEntry {
    pub supplier: String,
    pub total_spent: Decimal,
    pub purchase_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysis {
    pub period_days: i64,
    pub generated_at: DateTime<Utc>,

    // Estoque
    pub total_stock_value: Decimal,
    pub low_stock_count: i64,
    pub critical_stock_count: i64,
    pub category_breakdown: Vec<CategoryValueEntry>,

    // Receitas
    pub avg_cost_per_serving: Decimal,
    pub most_expensive_recipes: Vec<RecipeCostEntry>,
    pub least_expensive_recipes: Vec<RecipeCostEntry>,

    // Produtos
    pub avg_profit_margin: Decimal,
    pub revenue_potential: Decimal, // soma de sale_price * current_stock

    // Compras no período
    pub purchase_total: Decimal,
    pub purchase_count: i64,
    pub top_suppliers: Vec<SupplierSpendEntry>,
}
