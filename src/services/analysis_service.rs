// src/services/analysis_service.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, ProductRepository, PurchaseRepository, RecipeRepository},
    models::{
        inventory::{Ingredient, StockStatus},
        products::Product,
        purchasing::{Purchase, PurchaseStatus},
        recipes::RecipeCost,
        reports::{CategoryValueEntry, CostAnalysis, RecipeCostEntry, SupplierSpendEntry},
    },
    services::{
        product_service::compute_product_pricing,
        recipe_service::compute_recipe_cost,
        report_service::classify_stock,
    },
};

const TOP_N: usize = 5;

// ---
// Agregações (puras)
// ---

/// Distribuição de valor de estoque por categoria. Percentuais somam
/// 100 (a menos do arredondamento a 2 casas).
pub(crate) fn category_breakdown(ingredients: &[Ingredient]) -> Vec<CategoryValueEntry> {
    let mut by_category: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut total = Decimal::ZERO;

    for ingredient in ingredients {
        let value = ingredient.current_stock * ingredient.avg_cost;
        *by_category.entry(ingredient.category.as_str()).or_default() += value;
        total += value;
    }

    by_category
        .into_iter()
        .map(|(category, value)| {
            let percentage = if total.is_zero() {
                Decimal::ZERO
            } else {
                (value / total * Decimal::ONE_HUNDRED).round_dp(2)
            };
            CategoryValueEntry {
                category: category.to_string(),
                value: value.round_dp(2),
                percentage,
            }
        })
        .collect()
}

/// Gasto por fornecedor no período, do maior para o menor.
pub(crate) fn top_suppliers(purchases: &[Purchase]) -> Vec<SupplierSpendEntry> {
    let mut by_supplier: BTreeMap<&str, (Decimal, i64)> = BTreeMap::new();
    for purchase in purchases {
        let entry = by_supplier.entry(purchase.supplier.as_str()).or_default();
        entry.0 += purchase.total_amount;
        entry.1 += 1;
    }

    let mut entries: Vec<SupplierSpendEntry> = by_supplier
        .into_iter()
        .map(|(supplier, (total_spent, purchase_count))| SupplierSpendEntry {
            supplier: supplier.to_string(),
            total_spent: total_spent.round_dp(2),
            purchase_count,
        })
        .collect();
    entries.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
    entries.truncate(TOP_N);
    entries
}

/// Consolida tudo em um snapshot de análise. Só leitura: nenhuma
/// entidade é alterada aqui.
pub(crate) fn build_cost_analysis(
    ingredients: &[Ingredient],
    recipe_costs: &[RecipeCost],
    products_pricing: &[(Product, Decimal)], // (produto, preço de venda)
    period_purchases: &[Purchase],
    period_days: i64,
    generated_at: DateTime<Utc>,
) -> CostAnalysis {
    // Estoque
    let mut total_stock_value = Decimal::ZERO;
    let mut low_stock_count = 0i64;
    let mut critical_stock_count = 0i64;
    for ingredient in ingredients {
        total_stock_value += ingredient.current_stock * ingredient.avg_cost;
        match classify_stock(ingredient.current_stock, ingredient.min_stock) {
            StockStatus::Low => low_stock_count += 1,
            StockStatus::Critical => critical_stock_count += 1,
            StockStatus::Ok => {}
        }
    }

    // Receitas
    let avg_cost_per_serving = if recipe_costs.is_empty() {
        Decimal::ZERO
    } else {
        let sum: Decimal = recipe_costs.iter().map(|c| c.cost_per_serving).sum();
        (sum / Decimal::from(recipe_costs.len() as i64)).round_dp(2)
    };

    let mut ranked: Vec<RecipeCostEntry> = recipe_costs
        .iter()
        .map(|cost| RecipeCostEntry {
            recipe_id: cost.recipe_id,
            name: cost.recipe_name.clone(),
            total_cost: cost.total_cost.round_dp(2),
            cost_per_serving: cost.cost_per_serving.round_dp(2),
        })
        .collect();
    ranked.sort_by(|a, b| b.total_cost.cmp(&a.total_cost));
    let most_expensive_recipes: Vec<RecipeCostEntry> =
        ranked.iter().take(TOP_N).cloned().collect();
    let least_expensive_recipes: Vec<RecipeCostEntry> =
        ranked.iter().rev().take(TOP_N).cloned().collect();

    // Produtos
    let avg_profit_margin = if products_pricing.is_empty() {
        Decimal::ZERO
    } else {
        let sum: Decimal = products_pricing.iter().map(|(p, _)| p.profit_margin).sum();
        (sum / Decimal::from(products_pricing.len() as i64)).round_dp(2)
    };
    let revenue_potential: Decimal = products_pricing
        .iter()
        .map(|(product, sale_price)| *sale_price * product.current_stock)
        .sum();

    // Compras do período
    let purchase_total: Decimal = period_purchases.iter().map(|p| p.total_amount).sum();
    let purchase_count = period_purchases.len() as i64;

    CostAnalysis {
        period_days,
        generated_at,
        total_stock_value: total_stock_value.round_dp(2),
        low_stock_count,
        critical_stock_count,
        category_breakdown: category_breakdown(ingredients),
        avg_cost_per_serving,
        most_expensive_recipes,
        least_expensive_recipes,
        avg_profit_margin,
        revenue_potential: revenue_potential.round_dp(2),
        purchase_total: purchase_total.round_dp(2),
        purchase_count,
        top_suppliers: top_suppliers(period_purchases),
    }
}

#[derive(Clone)]
pub struct AnalysisService {
    inventory_repo: InventoryRepository,
    recipe_repo: RecipeRepository,
    product_repo: ProductRepository,
    purchase_repo: PurchaseRepository,
}

impl AnalysisService {
    pub fn new(
        inventory_repo: InventoryRepository,
        recipe_repo: RecipeRepository,
        product_repo: ProductRepository,
        purchase_repo: PurchaseRepository,
    ) -> Self {
        Self {
            inventory_repo,
            recipe_repo,
            product_repo,
            purchase_repo,
        }
    }

    /// Snapshot de análise de custos do tenant. Relatório é melhor
    /// esforço: receita ou produto com referência quebrada é pulado,
    /// nunca derruba a análise inteira.
    pub async fn get_cost_analysis<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        period_days: i64,
        category: Option<&str>,
    ) -> Result<CostAnalysis, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // Estatísticas de estoque respeitam o filtro de categoria;
        // o custeio de receitas precisa de TODOS os ingredientes.
        let all_ingredients = self
            .inventory_repo
            .list_ingredients(&mut *tx, tenant_id, None, false)
            .await?;

        let recipes = self.recipe_repo.list_recipes(&mut *tx, tenant_id).await?;
        let all_lines = self
            .recipe_repo
            .list_all_recipe_ingredients(&mut *tx, tenant_id)
            .await?;

        let products = self
            .product_repo
            .list_products(&mut *tx, tenant_id, None)
            .await?;

        let since = (Utc::now() - Duration::days(period_days)).date_naive();
        let purchases = self
            .purchase_repo
            .list_purchases_since(&mut *tx, tenant_id, since)
            .await?;

        tx.commit().await?;

        let ingredient_map: HashMap<Uuid, Ingredient> = all_ingredients
            .iter()
            .cloned()
            .map(|i| (i.id, i))
            .collect();

        let mut lines_by_recipe: HashMap<Uuid, Vec<_>> = HashMap::new();
        for line in all_lines {
            lines_by_recipe.entry(line.recipe_id).or_default().push(line);
        }

        let recipe_costs: Vec<RecipeCost> = recipes
            .iter()
            .filter_map(|recipe| {
                let lines = lines_by_recipe.get(&recipe.id).cloned().unwrap_or_default();
                compute_recipe_cost(recipe, &lines, &ingredient_map).ok()
            })
            .collect();

        let cost_by_recipe: HashMap<Uuid, Decimal> = recipe_costs
            .iter()
            .map(|cost| (cost.recipe_id, cost.cost_per_serving))
            .collect();

        let products_pricing: Vec<(Product, Decimal)> = products
            .into_iter()
            .filter_map(|product| {
                let base_cost = match product.recipe_id {
                    Some(recipe_id) => *cost_by_recipe.get(&recipe_id)?,
                    None => product.base_cost.unwrap_or(Decimal::ZERO),
                };
                let sale_price = compute_product_pricing(&product, base_cost).sale_price;
                Some((product, sale_price))
            })
            .collect();

        // Gasto real: compras efetivamente recebidas no período
        let received: Vec<Purchase> = purchases
            .into_iter()
            .filter(|p| p.status == PurchaseStatus::Received)
            .collect();

        let filtered_ingredients: Vec<Ingredient> = match category {
            Some(cat) => all_ingredients
                .into_iter()
                .filter(|i| i.category == cat)
                .collect(),
            None => all_ingredients,
        };

        Ok(build_cost_analysis(
            &filtered_ingredients,
            &recipe_costs,
            &products_pricing,
            &received,
            period_days,
            Utc::now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ingredient(category: &str, stock: &str, min: &str, cost: &str) -> Ingredient {
        let now = Utc::now();
        Ingredient {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: format!("{category}-{stock}"),
            category: category.to_string(),
            unit: "kg".to_string(),
            current_stock: dec(stock),
            min_stock: dec(min),
            max_stock: dec("100"),
            avg_cost: dec(cost),
            supplier: None,
            shelf_life_days: None,
            storage_condition: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn purchase(supplier: &str, total: &str) -> Purchase {
        let now = Utc::now();
        Purchase {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            supplier: supplier.to_string(),
            purchase_date: NaiveDate::from_str("2025-06-10").unwrap(),
            status: PurchaseStatus::Received,
            total_amount: dec(total),
            received_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn percentuais_por_categoria_somam_100() {
        let ingredients = vec![
            ingredient("Secos", "10", "1", "3.00"),      // 30
            ingredient("Laticínios", "4", "1", "10.00"), // 40
            ingredient("Carnes", "2", "1", "15.00"),     // 30
        ];

        let breakdown = category_breakdown(&ingredients);
        assert_eq!(breakdown.len(), 3);

        let sum: Decimal = breakdown.iter().map(|e| e.percentage).sum();
        let epsilon = dec("0.05");
        assert!((sum - Decimal::ONE_HUNDRED).abs() <= epsilon, "soma = {sum}");
    }

    #[test]
    fn percentuais_somam_100_mesmo_com_dizimas() {
        // 3 categorias iguais => 33.33 cada; a soma fica em 99.99
        let ingredients = vec![
            ingredient("A", "1", "0", "1.00"),
            ingredient("B", "1", "0", "1.00"),
            ingredient("C", "1", "0", "1.00"),
        ];

        let breakdown = category_breakdown(&ingredients);
        let sum: Decimal = breakdown.iter().map(|e| e.percentage).sum();
        assert!((sum - Decimal::ONE_HUNDRED).abs() <= dec("0.05"), "soma = {sum}");
    }

    #[test]
    fn estoque_zerado_gera_percentuais_zero_sem_divisao_por_zero() {
        let ingredients = vec![ingredient("Secos", "0", "1", "3.00")];
        let breakdown = category_breakdown(&ingredients);
        assert_eq!(breakdown[0].percentage, Decimal::ZERO);
    }

    #[test]
    fn fornecedores_ordenados_por_gasto() {
        let purchases = vec![
            purchase("Atacadão", "100.00"),
            purchase("Makro", "250.00"),
            purchase("Atacadão", "80.00"),
        ];

        let top = top_suppliers(&purchases);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].supplier, "Makro");
        assert_eq!(top[0].total_spent, dec("250.00"));
        assert_eq!(top[1].supplier, "Atacadão");
        assert_eq!(top[1].total_spent, dec("180.00"));
        assert_eq!(top[1].purchase_count, 2);
    }

    #[test]
    fn analise_consolida_estoque_compras_e_contagens() {
        let ingredients = vec![
            ingredient("Secos", "20", "10", "2.00"), // ok, valor 40
            ingredient("Secos", "4", "10", "5.00"),  // crítico, valor 20
        ];
        let purchases = vec![purchase("Makro", "300.00")];
        let analysis = build_cost_analysis(
            &ingredients,
            &[],
            &[],
            &purchases,
            30,
            Utc::now(),
        );

        assert_eq!(analysis.total_stock_value, dec("60.00"));
        assert_eq!(analysis.critical_stock_count, 1);
        assert_eq!(analysis.low_stock_count, 0);
        assert_eq!(analysis.purchase_total, dec("300.00"));
        assert_eq!(analysis.purchase_count, 1);
        assert_eq!(analysis.avg_cost_per_serving, Decimal::ZERO);
        assert_eq!(analysis.revenue_potential, Decimal::ZERO);
    }

    #[test]
    fn potencial_de_receita_soma_preco_vezes_estoque() {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Brownie".to_string(),
            category: "Confeitaria".to_string(),
            recipe_id: None,
            base_cost: Some(dec("4.00")),
            packaging_cost: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
            overhead_cost: Decimal::ZERO,
            other_costs: Decimal::ZERO,
            profit_margin: dec("50"),
            current_stock: dec("10"),
            min_stock: dec("2"),
            unit: "un".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let analysis = build_cost_analysis(
            &[],
            &[],
            &[(product, dec("6.00"))],
            &[],
            30,
            Utc::now(),
        );

        assert_eq!(analysis.revenue_potential, dec("60.00"));
        assert_eq!(analysis.avg_profit_margin, dec("50"));
    }
}
