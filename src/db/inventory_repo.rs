// src/db/inventory_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use rust_decimal::Decimal;
use chrono::NaiveDate;
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::inventory::{
        Ingredient, IngredientBatch, MovementReason, MovementType, StockMovement,
    },
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn get_ingredient<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Uuid,
    ) -> Result<Option<Ingredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT * FROM ingredients WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(ingredient_id)
        .fetch_optional(executor)
        .await?;
        Ok(ingredient)
    }

    /// Tranca a linha do ingrediente (FOR UPDATE). Todo cálculo de
    /// custo médio/saldo acontece dentro desse escopo exclusivo.
    pub async fn get_ingredient_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Uuid,
    ) -> Result<Option<Ingredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT * FROM ingredients WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(ingredient_id)
        .fetch_optional(executor)
        .await?;
        Ok(ingredient)
    }

    pub async fn list_ingredients<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        category: Option<&str>,
        include_inactive: bool,
    ) -> Result<Vec<Ingredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT * FROM ingredients
            WHERE tenant_id = $1
              AND ($2::text IS NULL OR category = $2)
              AND ($3 OR is_active = TRUE)
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(category)
        .bind(include_inactive)
        .fetch_all(executor)
        .await?;
        Ok(ingredients)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn create_ingredient<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        category: &str,
        unit: &str,
        min_stock: Decimal,
        max_stock: Decimal,
        supplier: Option<&str>,
        shelf_life_days: Option<i32>,
        storage_condition: Option<&str>,
    ) -> Result<Ingredient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients
                (tenant_id, name, category, unit, min_stock, max_stock,
                 supplier, shelf_life_days, storage_condition)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(category)
        .bind(unit)
        .bind(min_stock)
        .bind(max_stock)
        .bind(supplier)
        .bind(shelf_life_days)
        .bind(storage_condition)
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

    pub async fn update_ingredient<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Uuid,
        name: &str,
        category: &str,
        unit: &str,
        min_stock: Decimal,
        max_stock: Decimal,
        supplier: Option<&str>,
        shelf_life_days: Option<i32>,
        storage_condition: Option<&str>,
    ) -> Result<Option<Ingredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE ingredients SET
                name = $3, category = $4, unit = $5, min_stock = $6,
                max_stock = $7, supplier = $8, shelf_life_days = $9,
                storage_condition = $10, updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(ingredient_id)
        .bind(name)
        .bind(category)
        .bind(unit)
        .bind(min_stock)
        .bind(max_stock)
        .bind(supplier)
        .bind(shelf_life_days)
        .bind(storage_condition)
        .fetch_optional(executor)
        .await?;
        Ok(updated)
    }

    /// Grava saldo e custo médio já calculados pelo service, sempre
    /// sob a linha trancada por `get_ingredient_for_update`.
    pub async fn set_stock_and_cost<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Uuid,
        new_stock: Decimal,
        new_avg_cost: Decimal,
    ) -> Result<Ingredient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE ingredients
            SET current_stock = $3, avg_cost = $4, updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(ingredient_id)
        .bind(new_stock)
        .bind(new_avg_cost)
        .fetch_one(executor)
        .await?;
        Ok(updated)
    }

    /// Grava apenas o saldo (movimentações manuais não alteram custo).
    pub async fn set_stock<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Uuid,
        new_stock: Decimal,
    ) -> Result<Ingredient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE ingredients
            SET current_stock = $3, updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(ingredient_id)
        .bind(new_stock)
        .fetch_one(executor)
        .await?;
        Ok(updated)
    }

    pub async fn deactivate_ingredient<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Uuid,
    ) -> Result<Option<Ingredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE ingredients
            SET is_active = FALSE, updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(ingredient_id)
        .fetch_optional(executor)
        .await?;
        Ok(updated)
    }

    /// Quantas receitas ativas ainda referenciam o ingrediente.
    pub async fn count_active_recipe_refs<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM recipe_ingredients ri
            JOIN recipes r ON r.id = ri.recipe_id
            WHERE ri.tenant_id = $1
              AND ri.ingredient_id = $2
              AND r.is_active = TRUE
            "#,
        )
        .bind(tenant_id)
        .bind(ingredient_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    // ---
    // Lotes
    // ---

    pub async fn insert_batch<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Uuid,
        batch_number: &str,
        expiration_date: Option<NaiveDate>,
        quantity: Decimal,
        unit_cost: Decimal,
    ) -> Result<IngredientBatch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, IngredientBatch>(
            r#"
            INSERT INTO ingredient_batches
                (tenant_id, ingredient_id, batch_number, expiration_date, quantity, unit_cost)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(ingredient_id)
        .bind(batch_number)
        .bind(expiration_date)
        .bind(quantity)
        .bind(unit_cost)
        .fetch_one(executor)
        .await?;
        Ok(batch)
    }

    pub async fn list_batches<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<IngredientBatch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batches = sqlx::query_as::<_, IngredientBatch>(
            r#"
            SELECT * FROM ingredient_batches
            WHERE tenant_id = $1 AND quantity > 0
            ORDER BY expiration_date ASC NULLS LAST
            "#,
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(batches)
    }

    // ---
    // Livro-razão de movimentações
    // ---

    pub async fn record_stock_movement<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Uuid,
        movement_type: MovementType,
        quantity: Decimal,
        reason: MovementReason,
        notes: Option<&str>,
        performed_by: Uuid,
        performed_by_role: &str,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (tenant_id, ingredient_id, movement_type, quantity, reason,
                 notes, performed_by, performed_by_role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(ingredient_id)
        .bind(movement_type)
        .bind(quantity)
        .bind(reason)
        .bind(notes)
        .bind(performed_by)
        .bind(performed_by_role)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    pub async fn list_stock_movements<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Option<Uuid>,
        movement_type: Option<MovementType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE tenant_id = $1
              AND ($2::uuid IS NULL OR ingredient_id = $2)
              AND ($3::movement_type IS NULL OR movement_type = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(tenant_id)
        .bind(ingredient_id)
        .bind(movement_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }
}
