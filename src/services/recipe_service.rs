// src/services/recipe_service.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, RecipeRepository},
    models::{
        inventory::Ingredient,
        recipes::{Recipe, RecipeCost, RecipeCostItem, RecipeIngredient},
    },
};

// ---
// Núcleo de custeio (puro)
// ---

/// Recalcula o custo da receita a partir do avg_cost ATUAL dos
/// ingredientes. Nunca confia em valor persistido: qualquer compra
/// recebida mudaria o custo médio e deixaria o número velho errado.
pub(crate) fn compute_recipe_cost(
    recipe: &Recipe,
    lines: &[RecipeIngredient],
    ingredients: &HashMap<Uuid, Ingredient>,
) -> Result<RecipeCost, AppError> {
    if recipe.servings <= 0 {
        return Err(AppError::InvalidServings);
    }

    let mut items = Vec::with_capacity(lines.len());
    let mut total_cost = Decimal::ZERO;

    for line in lines {
        let ingredient = ingredients
            .get(&line.ingredient_id)
            .ok_or(AppError::IngredientNotFound)?;

        let cost = line.quantity * ingredient.avg_cost;
        total_cost += cost;

        items.push(RecipeCostItem {
            ingredient_id: line.ingredient_id,
            ingredient_name: ingredient.name.clone(),
            quantity: line.quantity,
            unit: line.unit.clone(),
            unit_cost: ingredient.avg_cost,
            cost,
        });
    }

    let cost_per_serving = total_cost / Decimal::from(recipe.servings);
    let suggested_price =
        cost_per_serving * (Decimal::ONE + recipe.profit_margin / Decimal::ONE_HUNDRED);

    Ok(RecipeCost {
        recipe_id: recipe.id,
        recipe_name: recipe.name.clone(),
        servings: recipe.servings,
        items,
        total_cost,
        cost_per_serving,
        profit_margin: recipe.profit_margin,
        suggested_price,
    })
}

// ---
// Entradas do service
// ---

#[derive(Debug, Clone)]
pub struct NewRecipeIngredient {
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub name: String,
    pub category: String,
    pub prep_time_minutes: i32,
    pub servings: i32,
    pub difficulty: Option<String>,
    pub instructions: Vec<String>,
    pub profit_margin: Decimal,
    pub ingredients: Vec<NewRecipeIngredient>,
}

#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    inventory_repo: InventoryRepository,
}

impl RecipeService {
    pub fn new(recipe_repo: RecipeRepository, inventory_repo: InventoryRepository) -> Self {
        Self {
            recipe_repo,
            inventory_repo,
        }
    }

    pub async fn create_recipe<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: NewRecipe,
    ) -> Result<Recipe, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if input.servings <= 0 {
            return Err(AppError::InvalidServings);
        }

        let mut tx = executor.begin().await?;

        let recipe = self
            .recipe_repo
            .insert_recipe(
                &mut *tx,
                tenant_id,
                &input.name,
                &input.category,
                input.prep_time_minutes,
                input.servings,
                input.difficulty.as_deref(),
                &input.instructions,
                input.profit_margin,
            )
            .await?;

        for line in &input.ingredients {
            // A composição só pode apontar para ingrediente cadastrado.
            self.inventory_repo
                .get_ingredient(&mut *tx, tenant_id, line.ingredient_id)
                .await?
                .ok_or(AppError::IngredientNotFound)?;

            self.recipe_repo
                .insert_recipe_ingredient(
                    &mut *tx,
                    tenant_id,
                    recipe.id,
                    line.ingredient_id,
                    line.quantity,
                    &line.unit,
                )
                .await?;
        }

        tx.commit().await?;
        Ok(recipe)
    }

    pub async fn list_recipes<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<Recipe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.recipe_repo.list_recipes(executor, tenant_id).await
    }

    /// Custo da receita, recalculado a cada chamada (leitura derivada).
    pub async fn get_recipe_cost<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<RecipeCost, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Transação só para leitura consistente de receita + ingredientes.
        let mut tx = executor.begin().await?;

        let recipe = self
            .recipe_repo
            .get_recipe(&mut *tx, tenant_id, recipe_id)
            .await?
            .ok_or(AppError::RecipeNotFound)?;

        let lines = self
            .recipe_repo
            .get_recipe_ingredients(&mut *tx, tenant_id, recipe_id)
            .await?;

        let mut ingredients = HashMap::with_capacity(lines.len());
        for line in &lines {
            let ingredient = self
                .inventory_repo
                .get_ingredient(&mut *tx, tenant_id, line.ingredient_id)
                .await?
                .ok_or(AppError::IngredientNotFound)?;
            ingredients.insert(ingredient.id, ingredient);
        }

        tx.commit().await?;
        compute_recipe_cost(&recipe, &lines, &ingredients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ingredient(id: Uuid, name: &str, avg_cost: &str) -> Ingredient {
        let now = Utc::now();
        Ingredient {
            id,
            tenant_id: Uuid::new_v4(),
            name: name.to_string(),
            category: "Laticínios".to_string(),
            unit: "kg".to_string(),
            current_stock: dec("10"),
            min_stock: dec("2"),
            max_stock: dec("50"),
            avg_cost: dec(avg_cost),
            supplier: None,
            shelf_life_days: None,
            storage_condition: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn recipe(servings: i32, profit_margin: &str) -> Recipe {
        let now = Utc::now();
        Recipe {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Bolo de cenoura".to_string(),
            category: "Bolos".to_string(),
            prep_time_minutes: 50,
            servings,
            difficulty: Some("fácil".to_string()),
            instructions: vec!["Misturar".to_string(), "Assar".to_string()],
            profit_margin: dec(profit_margin),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(recipe: &Recipe, ingredient: &Ingredient, quantity: &str) -> RecipeIngredient {
        RecipeIngredient {
            id: Uuid::new_v4(),
            tenant_id: recipe.tenant_id,
            recipe_id: recipe.id,
            ingredient_id: ingredient.id,
            quantity: dec(quantity),
            unit: ingredient.unit.clone(),
        }
    }

    #[test]
    fn custo_da_receita_soma_linhas_e_divide_por_porcoes() {
        let farinha = ingredient(Uuid::new_v4(), "Farinha", "5.00");
        let r = recipe(2, "0");
        let lines = vec![line(&r, &farinha, "2")];
        let mut map = HashMap::new();
        map.insert(farinha.id, farinha);

        let cost = compute_recipe_cost(&r, &lines, &map).unwrap();
        assert_eq!(cost.total_cost, dec("10.00"));
        assert_eq!(cost.cost_per_serving, dec("5.00"));
    }

    #[test]
    fn custo_e_derivado_mudar_avg_cost_muda_o_resultado_proporcionalmente() {
        let id = Uuid::new_v4();
        let r = recipe(2, "0");

        let antes = ingredient(id, "Farinha", "5.00");
        let lines = vec![line(&r, &antes, "2")];
        let mut map = HashMap::new();
        map.insert(id, antes);
        let custo_antes = compute_recipe_cost(&r, &lines, &map).unwrap();
        assert_eq!(custo_antes.cost_per_serving, dec("5.00"));

        // Mesma receita, só o custo médio do ingrediente mudou
        let depois = ingredient(id, "Farinha", "8.00");
        map.insert(id, depois);
        let custo_depois = compute_recipe_cost(&r, &lines, &map).unwrap();
        assert_eq!(custo_depois.total_cost, dec("16.00"));
        assert_eq!(custo_depois.cost_per_serving, dec("8.00"));
    }

    #[test]
    fn preco_sugerido_aplica_margem_sobre_o_custo_por_porcao() {
        let farinha = ingredient(Uuid::new_v4(), "Farinha", "5.00");
        let r = recipe(2, "100");
        let lines = vec![line(&r, &farinha, "2")];
        let mut map = HashMap::new();
        map.insert(farinha.id, farinha);

        let cost = compute_recipe_cost(&r, &lines, &map).unwrap();
        assert_eq!(cost.suggested_price, dec("10.00"));
    }

    #[test]
    fn ingrediente_desconhecido_falha_sem_custo_parcial() {
        let farinha = ingredient(Uuid::new_v4(), "Farinha", "5.00");
        let r = recipe(2, "0");
        let fantasma = ingredient(Uuid::new_v4(), "Fermento", "1.00");
        let lines = vec![line(&r, &farinha, "2"), line(&r, &fantasma, "1")];
        let mut map = HashMap::new();
        map.insert(farinha.id, farinha);
        // fantasma não entra no lookup

        let err = compute_recipe_cost(&r, &lines, &map).unwrap_err();
        assert!(matches!(err, AppError::IngredientNotFound));
    }

    #[test]
    fn porcoes_invalidas_sao_rejeitadas() {
        let r = recipe(0, "0");
        let err = compute_recipe_cost(&r, &[], &HashMap::new()).unwrap_err();
        assert!(matches!(err, AppError::InvalidServings));
    }

    #[test]
    fn receita_sem_ingredientes_custa_zero() {
        let r = recipe(4, "50");
        let cost = compute_recipe_cost(&r, &[], &HashMap::new()).unwrap();
        assert_eq!(cost.total_cost, Decimal::ZERO);
        assert_eq!(cost.cost_per_serving, Decimal::ZERO);
        assert_eq!(cost.suggested_price, Decimal::ZERO);
    }
}
