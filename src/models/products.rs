// src/models/products.rs

use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Produtos ---
// recipe_id e base_cost são mutuamente exclusivos: vinculado a uma
// receita, o custo base é lido do costPerServing dela a cada cálculo
// (read-through); sem receita, vale o base_cost manual.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub category: String,

    pub recipe_id: Option<Uuid>,
    pub base_cost: Option<Decimal>, // Custo base manual

    // Custos adicionais
    pub packaging_cost: Decimal,
    pub labor_cost: Decimal,
    pub overhead_cost: Decimal,
    pub other_costs: Decimal,

    pub profit_margin: Decimal, // Percentual

    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub unit: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Precificação derivada ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPricing {
    pub product_id: Uuid,
    pub product_name: String,
    pub base_cost: Decimal,
    pub packaging_cost: Decimal,
    pub labor_cost: Decimal,
    pub overhead_cost: Decimal,
    pub other_costs: Decimal,
    pub total_cost: Decimal,
    pub profit_margin: Decimal,
    pub sale_price: Decimal, // total_cost * (1 + margem/100)
}

impl ProductPricing {
    /// Arredonda os valores monetários para exibição (2 casas).
    pub fn rounded(mut self) -> Self {
        self.base_cost = self.base_cost.round_dp(2);
        self.packaging_cost = self.packaging_cost.round_dp(2);
        self.labor_cost = self.labor_cost.round_dp(2);
        self.overhead_cost = self.overhead_cost.round_dp(2);
        self.other_costs = self.other_costs.round_dp(2);
        self.total_cost = self.total_cost.round_dp(2);
        self.sale_price = self.sale_price.round_dp(2);
        self
    }
}
