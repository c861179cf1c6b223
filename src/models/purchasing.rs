// src/models/purchasing.rs

use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc, NaiveDate};
use rust_decimal::Decimal;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Ciclo de vida da Compra ---
// PENDING -> RECEIVED (dispara o custeio) ou PENDING -> CANCELLED (terminal).
// Uma compra recebida é imutável.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "purchase_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    Pending,
    Received,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub supplier: String,
    pub purchase_date: NaiveDate,
    pub status: PurchaseStatus,
    pub total_amount: Decimal, // Soma dos line_total dos itens
    pub received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub purchase_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub line_total: Decimal, // quantity * unit_cost, congelado na criação

    // Dados de lote (opcionais, só para validade)
    pub batch_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
}

// Compra + itens, como o front consome
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub items: Vec<PurchaseItem>,
}
