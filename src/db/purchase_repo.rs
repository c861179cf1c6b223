// src/db/purchase_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use rust_decimal::Decimal;
use chrono::{NaiveDate, DateTime, Utc};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::purchasing::{Purchase, PurchaseItem, PurchaseStatus},
};

#[derive(Clone)]
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_purchase<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        supplier: &str,
        purchase_date: NaiveDate,
        total_amount: Decimal,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (tenant_id, supplier, purchase_date, total_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(supplier)
        .bind(purchase_date)
        .bind(total_amount)
        .fetch_one(executor)
        .await?;
        Ok(purchase)
    }

    pub async fn insert_purchase_item<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        purchase_id: Uuid,
        ingredient_id: Uuid,
        quantity: Decimal,
        unit_cost: Decimal,
        line_total: Decimal,
        batch_number: Option<&str>,
        expiration_date: Option<NaiveDate>,
    ) -> Result<PurchaseItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, PurchaseItem>(
            r#"
            INSERT INTO purchase_items
                (tenant_id, purchase_id, ingredient_id, quantity, unit_cost,
                 line_total, batch_number, expiration_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(purchase_id)
        .bind(ingredient_id)
        .bind(quantity)
        .bind(unit_cost)
        .bind(line_total)
        .bind(batch_number)
        .bind(expiration_date)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn get_purchase<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<Option<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(
            "SELECT * FROM purchases WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(purchase_id)
        .fetch_optional(executor)
        .await?;
        Ok(purchase)
    }

    /// Tranca a compra durante a transição de estado (receber/cancelar),
    /// para que dois operadores não a recebam ao mesmo tempo.
    pub async fn get_purchase_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<Option<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(
            "SELECT * FROM purchases WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(purchase_id)
        .fetch_optional(executor)
        .await?;
        Ok(purchase)
    }

    pub async fn list_purchases<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        status: Option<PurchaseStatus>,
    ) -> Result<Vec<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT * FROM purchases
            WHERE tenant_id = $1
              AND ($2::purchase_status IS NULL OR status = $2)
            ORDER BY purchase_date DESC, created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_all(executor)
        .await?;
        Ok(purchases)
    }

    /// Compras de um período, para os totais da análise de custos.
    pub async fn list_purchases_since<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT * FROM purchases
            WHERE tenant_id = $1 AND purchase_date >= $2
            ORDER BY purchase_date DESC
            "#,
        )
        .bind(tenant_id)
        .bind(since)
        .fetch_all(executor)
        .await?;
        Ok(purchases)
    }

    pub async fn get_purchase_items<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<Vec<PurchaseItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, PurchaseItem>(
            r#"
            SELECT * FROM purchase_items
            WHERE tenant_id = $1 AND purchase_id = $2
            ORDER BY id ASC
            "#,
        )
        .bind(tenant_id)
        .bind(purchase_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        purchase_id: Uuid,
        status: PurchaseStatus,
        received_at: Option<DateTime<Utc>>,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            UPDATE purchases
            SET status = $3, received_at = COALESCE($4, received_at), updated_at = now()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(purchase_id)
        .bind(status)
        .bind(received_at)
        .fetch_one(executor)
        .await?;
        Ok(purchase)
    }
}
