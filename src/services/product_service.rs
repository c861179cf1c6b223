// src/services/product_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductRepository, RecipeRepository},
    models::products::{Product, ProductPricing},
    services::recipe_service::RecipeService,
};

// ---
// Núcleo de precificação (puro)
// ---

/// Preço de venda a partir do custo base (receita ou manual) mais os
/// custos adicionais, com a margem em percentual sobre o custo total.
pub(crate) fn compute_product_pricing(product: &Product, base_cost: Decimal) -> ProductPricing {
    let total_cost = base_cost
        + product.packaging_cost
        + product.labor_cost
        + product.overhead_cost
        + product.other_costs;
    let sale_price = total_cost * (Decimal::ONE + product.profit_margin / Decimal::ONE_HUNDRED);

    ProductPricing {
        product_id: product.id,
        product_name: product.name.clone(),
        base_cost,
        packaging_cost: product.packaging_cost,
        labor_cost: product.labor_cost,
        overhead_cost: product.overhead_cost,
        other_costs: product.other_costs,
        total_cost,
        profit_margin: product.profit_margin,
        sale_price,
    }
}

// ---
// Entradas do service
// ---

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub recipe_id: Option<Uuid>,
    pub base_cost: Option<Decimal>,
    pub packaging_cost: Decimal,
    pub labor_cost: Decimal,
    pub overhead_cost: Decimal,
    pub other_costs: Decimal,
    pub profit_margin: Decimal,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone)]
pub struct ProductCostsUpdate {
    pub base_cost: Option<Decimal>,
    pub packaging_cost: Decimal,
    pub labor_cost: Decimal,
    pub overhead_cost: Decimal,
    pub other_costs: Decimal,
    pub profit_margin: Decimal,
}

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    recipe_repo: RecipeRepository,
    recipe_service: RecipeService,
}

impl ProductService {
    pub fn new(
        product_repo: ProductRepository,
        recipe_repo: RecipeRepository,
        recipe_service: RecipeService,
    ) -> Self {
        Self {
            product_repo,
            recipe_repo,
            recipe_service,
        }
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: NewProduct,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Receita vinculada e custo base manual são mutuamente exclusivos.
        if input.recipe_id.is_some() && input.base_cost.is_some() {
            let mut errors = validator::ValidationErrors::new();
            let mut err = validator::ValidationError::new("exclusive");
            err.message =
                Some("Informe receita OU custo base manual, nunca os dois.".into());
            errors.add("baseCost", err);
            return Err(AppError::ValidationError(errors));
        }

        let mut tx = executor.begin().await?;

        if let Some(recipe_id) = input.recipe_id {
            self.recipe_repo
                .get_recipe(&mut *tx, tenant_id, recipe_id)
                .await?
                .ok_or(AppError::RecipeNotFound)?;
        }

        let product = self
            .product_repo
            .insert_product(
                &mut *tx,
                tenant_id,
                &input.name,
                &input.category,
                input.recipe_id,
                input.base_cost,
                input.packaging_cost,
                input.labor_cost,
                input.overhead_cost,
                input.other_costs,
                input.profit_margin,
                input.current_stock,
                input.min_stock,
                &input.unit,
            )
            .await?;

        tx.commit().await?;
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
        self.product_repo
            .list_products(executor, tenant_id, category)
            .await
    }

    /// Precificação derivada, calculada a cada leitura. Produto com
    /// receita lê o custo por porção dela na hora (read-through).
    pub async fn get_product_pricing(
        &self,
        conn: &mut sqlx::PgConnection,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<ProductPricing, AppError> {

        let product = self
            .product_repo
            .get_product(&mut *conn, tenant_id, product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        let base_cost = match product.recipe_id {
            Some(recipe_id) => {
                // Vínculo pendurado vira RecipeNotFound, sem preço parcial
                let recipe_cost = self
                    .recipe_service
                    .get_recipe_cost(&mut *conn, tenant_id, recipe_id)
                    .await?;
                recipe_cost.cost_per_serving
            }
            None => product.base_cost.unwrap_or(Decimal::ZERO),
        };

        Ok(compute_product_pricing(&product, base_cost))
    }

    /// Atualiza custos/margem. Com receita vinculada o custo base é
    /// read-through e não pode ser fixado manualmente.
    pub async fn update_product_costs<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        product_id: Uuid,
        update: ProductCostsUpdate,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let product = self
            .product_repo
            .get_product(&mut *tx, tenant_id, product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        if product.recipe_id.is_some() && update.base_cost.is_some() {
            return Err(AppError::ProductBaseCostLocked);
        }

        let base_cost = if product.recipe_id.is_some() {
            None
        } else {
            update.base_cost.or(product.base_cost)
        };

        let updated = self
            .product_repo
            .update_costs(
                &mut *tx,
                tenant_id,
                product_id,
                base_cost,
                update.packaging_cost,
                update.labor_cost,
                update.overhead_cost,
                update.other_costs,
                update.profit_margin,
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
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

    fn product(margin: &str, additional: [&str; 4]) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Fatia de bolo".to_string(),
            category: "Confeitaria".to_string(),
            recipe_id: None,
            base_cost: None,
            packaging_cost: dec(additional[0]),
            labor_cost: dec(additional[1]),
            overhead_cost: dec(additional[2]),
            other_costs: dec(additional[3]),
            profit_margin: dec(margin),
            current_stock: dec("0"),
            min_stock: dec("0"),
            unit: "un".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn margem_de_100_por_cento_dobra_o_custo() {
        let p = product("100", ["0", "0", "0", "0"]);
        let pricing = compute_product_pricing(&p, dec("10.00"));
        assert_eq!(pricing.total_cost, dec("10.00"));
        assert_eq!(pricing.sale_price, dec("20.00"));
    }

    #[test]
    fn margem_de_50_por_cento_sobre_custo_10_da_15() {
        let p = product("50", ["0", "0", "0", "0"]);
        let pricing = compute_product_pricing(&p, dec("10.00"));
        assert_eq!(pricing.sale_price, dec("15.00"));
    }

    #[test]
    fn custos_adicionais_entram_no_custo_total() {
        let p = product("0", ["1.50", "2.00", "0.75", "0.25"]);
        let pricing = compute_product_pricing(&p, dec("5.50"));
        assert_eq!(pricing.total_cost, dec("10.00"));
        assert_eq!(pricing.sale_price, dec("10.00"));
    }

    #[test]
    fn margem_zero_vende_a_preco_de_custo() {
        let p = product("0", ["0", "0", "0", "0"]);
        let pricing = compute_product_pricing(&p, dec("7.33"));
        assert_eq!(pricing.sale_price, dec("7.33"));
    }
}
