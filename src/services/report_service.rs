// src/services/report_service.rs

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    models::{
        inventory::{ExpiryStatus, Ingredient, IngredientBatch, StockStatus},
        reports::{BatchExpiryEntry, IngredientStockEntry, InventoryReport},
    },
};

// ---
// Classificação (pura, recalculada a cada consulta)
// ---

/// crítico <= 50% do mínimo; baixo <= mínimo; acima disso, ok.
pub(crate) fn classify_stock(current_stock: Decimal, min_stock: Decimal) -> StockStatus {
    let critical_threshold = min_stock * Decimal::new(5, 1);
    if current_stock <= critical_threshold {
        StockStatus::Critical
    } else if current_stock <= min_stock {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

/// Dias restantes e faixa de risco de validade. Lote sem validade
/// declarada não expira (ok).
pub(crate) fn classify_expiry(
    expiration_date: Option<NaiveDate>,
    today: NaiveDate,
) -> (Option<i64>, ExpiryStatus) {
    match expiration_date {
        None => (None, ExpiryStatus::Ok),
        Some(expiration) => {
            let days_remaining = (expiration - today).num_days();
            let status = if days_remaining <= 0 {
                ExpiryStatus::Expired
            } else if days_remaining <= 7 {
                ExpiryStatus::Critical
            } else if days_remaining <= 30 {
                ExpiryStatus::Warning
            } else {
                ExpiryStatus::Ok
            };
            (Some(days_remaining), status)
        }
    }
}

/// Monta o relatório inteiro a partir do estado atual. Valores
/// monetários saem arredondados a 2 casas (apresentação); o cálculo
/// interno permanece com precisão cheia.
pub(crate) fn build_inventory_report(
    ingredients: &[Ingredient],
    batches: &[IngredientBatch],
    today: NaiveDate,
    generated_at: DateTime<Utc>,
) -> InventoryReport {
    let mut batches_by_ingredient: HashMap<Uuid, Vec<&IngredientBatch>> = HashMap::new();
    for batch in batches {
        batches_by_ingredient
            .entry(batch.ingredient_id)
            .or_default()
            .push(batch);
    }

    let mut total_stock_value = Decimal::ZERO;
    let mut ok_count = 0i64;
    let mut low_count = 0i64;
    let mut critical_count = 0i64;
    let mut expiring_batches = 0i64;
    let mut items = Vec::with_capacity(ingredients.len());

    for ingredient in ingredients {
        let stock_value = ingredient.current_stock * ingredient.avg_cost;
        total_stock_value += stock_value;

        let status = classify_stock(ingredient.current_stock, ingredient.min_stock);
        match status {
            StockStatus::Ok => ok_count += 1,
            StockStatus::Low => low_count += 1,
            StockStatus::Critical => critical_count += 1,
        }

        let batch_entries: Vec<BatchExpiryEntry> = batches_by_ingredient
            .get(&ingredient.id)
            .map(|list| {
                list.iter()
                    .map(|batch| {
                        let (days_remaining, expiry_status) =
                            classify_expiry(batch.expiration_date, today);
                        if matches!(expiry_status, ExpiryStatus::Critical | ExpiryStatus::Expired) {
                            expiring_batches += 1;
                        }
                        BatchExpiryEntry {
                            batch_id: batch.id,
                            batch_number: batch.batch_number.clone(),
                            quantity: batch.quantity,
                            expiration_date: batch.expiration_date,
                            days_remaining,
                            status: expiry_status,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        items.push(IngredientStockEntry {
            ingredient_id: ingredient.id,
            name: ingredient.name.clone(),
            category: ingredient.category.clone(),
            unit: ingredient.unit.clone(),
            current_stock: ingredient.current_stock,
            min_stock: ingredient.min_stock,
            avg_cost: ingredient.avg_cost.round_dp(2),
            stock_value: stock_value.round_dp(2),
            status,
            batches: batch_entries,
        });
    }

    InventoryReport {
        generated_at,
        total_stock_value: total_stock_value.round_dp(2),
        ok_count,
        low_count,
        critical_count,
        expiring_batches,
        items,
    }
}

#[derive(Clone)]
pub struct ReportService {
    inventory_repo: InventoryRepository,
}

impl ReportService {
    pub fn new(inventory_repo: InventoryRepository) -> Self {
        Self { inventory_repo }
    }

    pub async fn get_inventory_report<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<InventoryReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Snapshot consistente de ingredientes + lotes
        let mut tx = executor.begin().await?;

        let ingredients = self
            .inventory_repo
            .list_ingredients(&mut *tx, tenant_id, None, false)
            .await?;

        let batches = self.inventory_repo.list_batches(&mut *tx, tenant_id).await?;

        tx.commit().await?;

        let today = Utc::now().date_naive();
        Ok(build_inventory_report(&ingredients, &batches, today, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    #[test]
    fn estoque_ate_metade_do_minimo_e_critico() {
        // min 10 => limiar crítico 5
        assert_eq!(classify_stock(dec("4"), dec("10")), StockStatus::Critical);
        assert_eq!(classify_stock(dec("5"), dec("10")), StockStatus::Critical);
    }

    #[test]
    fn estoque_ate_o_minimo_e_baixo() {
        assert_eq!(classify_stock(dec("8"), dec("10")), StockStatus::Low);
        assert_eq!(classify_stock(dec("10"), dec("10")), StockStatus::Low);
    }

    #[test]
    fn estoque_acima_do_minimo_e_ok() {
        assert_eq!(classify_stock(dec("20"), dec("10")), StockStatus::Ok);
        assert_eq!(classify_stock(dec("10.01"), dec("10")), StockStatus::Ok);
    }

    #[test]
    fn validade_vencida_ou_no_dia_e_expired() {
        let today = date("2025-06-15");
        let (dias, status) = classify_expiry(Some(date("2025-06-15")), today);
        assert_eq!(dias, Some(0));
        assert_eq!(status, ExpiryStatus::Expired);

        let (dias, status) = classify_expiry(Some(date("2025-06-01")), today);
        assert_eq!(dias, Some(-14));
        assert_eq!(status, ExpiryStatus::Expired);
    }

    #[test]
    fn validade_em_ate_sete_dias_e_critica() {
        let today = date("2025-06-15");
        let (dias, status) = classify_expiry(Some(date("2025-06-22")), today);
        assert_eq!(dias, Some(7));
        assert_eq!(status, ExpiryStatus::Critical);
    }

    #[test]
    fn validade_em_ate_trinta_dias_e_warning() {
        let today = date("2025-06-15");
        let (_, status) = classify_expiry(Some(date("2025-07-01")), today);
        assert_eq!(status, ExpiryStatus::Warning);
        let (dias, status) = classify_expiry(Some(date("2025-07-15")), today);
        assert_eq!(dias, Some(30));
        assert_eq!(status, ExpiryStatus::Warning);
    }

    #[test]
    fn validade_distante_ou_ausente_e_ok() {
        let today = date("2025-06-15");
        let (_, status) = classify_expiry(Some(date("2025-08-01")), today);
        assert_eq!(status, ExpiryStatus::Ok);
        let (dias, status) = classify_expiry(None, today);
        assert_eq!(dias, None);
        assert_eq!(status, ExpiryStatus::Ok);
    }

    #[test]
    fn relatorio_soma_valor_do_estoque_e_conta_status() {
        let now = Utc::now();
        let mk = |name: &str, stock: &str, min: &str, cost: &str| Ingredient {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: name.to_string(),
            category: "Secos".to_string(),
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
        };

        let ingredients = vec![
            mk("Farinha", "20", "10", "3.00"),  // ok, valor 60
            mk("Açúcar", "8", "10", "2.50"),    // baixo, valor 20
            mk("Fermento", "4", "10", "10.00"), // crítico, valor 40
        ];

        let report =
            build_inventory_report(&ingredients, &[], date("2025-06-15"), now);

        assert_eq!(report.total_stock_value, dec("120.00"));
        assert_eq!(report.ok_count, 1);
        assert_eq!(report.low_count, 1);
        assert_eq!(report.critical_count, 1);
        assert_eq!(report.items.len(), 3);
        assert_eq!(report.expiring_batches, 0);
    }
}
