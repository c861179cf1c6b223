// src/db/product_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use rust_decimal::Decimal;
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::products::Product,
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_product<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        category: &str,
        recipe_id: Option<Uuid>,
        base_cost: Option<Decimal>,
        packaging_cost: Decimal,
        labor_cost: Decimal,
        overhead_cost: Decimal,
        other_costs: Decimal,
        profit_margin: Decimal,
        current_stock: Decimal,
        min_stock: Decimal,
        unit: &str,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (tenant_id, name, category, recipe_id, base_cost,
                 packaging_cost, labor_cost, overhead_cost, other_costs,
                 profit_margin, current_stock, min_stock, unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(category)
        .bind(recipe_id)
        .bind(base_cost)
        .bind(packaging_cost)
        .bind(labor_cost)
        .bind(overhead_cost)
        .bind(other_costs)
        .bind(profit_margin)
        .bind(current_stock)
        .bind(min_stock)
        .bind(unit)
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

    pub async fn get_product<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(product_id)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn list_products<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        category: Option<&str>,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE tenant_id = $1
              AND is_active = TRUE
              AND ($2::text IS NULL OR category = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(category)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    /// Atualiza a parte de custos/margem. A trava do custo base com
    /// receita vinculada é verificada no service, antes de chegar aqui.
    pub async fn update_costs<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        base_cost: Option<Decimal>,
        packaging_cost: Decimal,
        labor_cost: Decimal,
        overhead_cost: Decimal,
        other_costs: Decimal,
        profit_margin: Decimal,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                base_cost = $3, packaging_cost = $4, labor_cost = $5,
                overhead_cost = $6, other_costs = $7, profit_margin = $8,
                updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .bind(base_cost)
        .bind(packaging_cost)
        .bind(labor_cost)
        .bind(overhead_cost)
        .bind(other_costs)
        .bind(profit_margin)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }
}
