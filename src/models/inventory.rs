// src/models/inventory.rs

use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc, NaiveDate};
use rust_decimal::Decimal;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Ingredientes ---
// O ingrediente é a raiz do grafo de custos: compras atualizam o
// custo médio, receitas e produtos apenas leem.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub category: String,
    pub unit: String,

    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub max_stock: Decimal,

    pub avg_cost: Decimal, // Custo Médio Unitário (ponderado)

    pub supplier: Option<String>,
    pub shelf_life_days: Option<i32>,
    pub storage_condition: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Lotes ---
// Lotes são rastreados somente para validade; o custeio usa o custo
// médio do ingrediente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientBatch {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub ingredient_id: Uuid,
    pub batch_number: String,
    pub expiration_date: Option<NaiveDate>, // Data simples (Dia/Mês/Ano)
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
}

// --- 3. Movimentações de Estoque ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "movement_type", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum MovementType {
    Entrada, // Vira "ENTRADA"
    Saida,   // Vira "SAIDA"
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "movement_reason", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementReason {
    Purchase,   // Recebimento de compra
    Production, // Consumo em produção
    Spoilage,   // Perda / descarte
    Adjustment, // Ajuste de contagem
    Return,     // Devolução
    Other,
}

// --- STOCK MOVEMENT (Histórico) ---
// Registro append-only: nunca é alterado, apenas sucedido por novas
// movimentações.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub ingredient_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub reason: MovementReason,
    pub notes: Option<String>,
    pub performed_by: Uuid,
    pub performed_by_role: String,
    pub created_at: DateTime<Utc>,
}

// --- 4. Classificações derivadas ---
// Calculadas a cada leitura; nunca persistidas (evita status defasado).

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Ok,
    Low,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpiryStatus {
    Ok,
    Warning,
    Critical,
    Expired,
}
