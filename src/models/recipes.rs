// src/models/recipes.rs

use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Receitas ---
// A receita guarda SOMENTE a composição. Custos (totalCost,
// costPerServing, suggestedPrice) são derivados a cada leitura a partir
// do avg_cost atual dos ingredientes; valor persistido ficaria defasado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub category: String,
    pub prep_time_minutes: i32,
    pub servings: i32,
    pub difficulty: Option<String>,
    pub instructions: Vec<String>, // Passos ordenados
    pub profit_margin: Decimal,    // Percentual (ex: 150 = 150%)
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    pub unit: String,
}

// --- Custeio derivado ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCostItem {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_cost: Decimal, // avg_cost no momento do cálculo
    pub cost: Decimal,      // quantity * unit_cost
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCost {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub servings: i32,
    pub items: Vec<RecipeCostItem>,
    pub total_cost: Decimal,
    pub cost_per_serving: Decimal,
    pub profit_margin: Decimal,
    pub suggested_price: Decimal, // cost_per_serving * (1 + margem/100)
}

impl RecipeCost {
    /// Arredonda os valores monetários para exibição (2 casas). O
    /// cálculo interno permanece com precisão cheia até aqui.
    pub fn rounded(mut self) -> Self {
        for item in &mut self.items {
            item.unit_cost = item.unit_cost.round_dp(2);
            item.cost = item.cost.round_dp(2);
        }
        self.total_cost = self.total_cost.round_dp(2);
        self.cost_per_serving = self.cost_per_serving.round_dp(2);
        self.suggested_price = self.suggested_price.round_dp(2);
        self
    }
}
