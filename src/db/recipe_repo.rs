// src/db/recipe_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use rust_decimal::Decimal;
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::recipes::{Recipe, RecipeIngredient},
};

#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_recipe<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        category: &str,
        prep_time_minutes: i32,
        servings: i32,
        difficulty: Option<&str>,
        instructions: &[String],
        profit_margin: Decimal,
    ) -> Result<Recipe, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes
                (tenant_id, name, category, prep_time_minutes, servings,
                 difficulty, instructions, profit_margin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(category)
        .bind(prep_time_minutes)
        .bind(servings)
        .bind(difficulty)
        .bind(instructions)
        .bind(profit_margin)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::NameAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn insert_recipe_ingredient<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        recipe_id: Uuid,
        ingredient_id: Uuid,
        quantity: Decimal,
        unit: &str,
    ) -> Result<RecipeIngredient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let line = sqlx::query_as::<_, RecipeIngredient>(
            r#"
            INSERT INTO recipe_ingredients
                (tenant_id, recipe_id, ingredient_id, quantity, unit)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(recipe_id)
        .bind(ingredient_id)
        .bind(quantity)
        .bind(unit)
        .fetch_one(executor)
        .await?;
        Ok(line)
    }

    pub async fn get_recipe<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<Option<Recipe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recipe = sqlx::query_as::<_, Recipe>(
            "SELECT * FROM recipes WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(recipe_id)
        .fetch_optional(executor)
        .await?;
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
        let recipes = sqlx::query_as::<_, Recipe>(
            "SELECT * FROM recipes WHERE tenant_id = $1 AND is_active = TRUE ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(recipes)
    }

    pub async fn get_recipe_ingredients<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<Vec<RecipeIngredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, RecipeIngredient>(
            r#"
            SELECT * FROM recipe_ingredients
            WHERE tenant_id = $1 AND recipe_id = $2
            ORDER BY id ASC
            "#,
        )
        .bind(tenant_id)
        .bind(recipe_id)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }

    /// Todas as linhas de composição do tenant, para a análise de
    /// custos recalcular as receitas em lote.
    pub async fn list_all_recipe_ingredients<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<RecipeIngredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, RecipeIngredient>(
            "SELECT * FROM recipe_ingredients WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }
}
