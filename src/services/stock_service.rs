// src/services/stock_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, PurchaseRepository},
    models::{
        inventory::{Ingredient, MovementReason, MovementType, StockMovement},
        purchasing::{Purchase, PurchaseDetail, PurchaseStatus},
    },
};

// ---
// Núcleo de cálculo (puro)
// ---

/// Custo médio ponderado após uma entrada com preço:
/// (saldo_atual * custo_atual + qtd * custo) / (saldo_atual + qtd).
/// Com base zerada, o custo médio passa a ser o custo da própria entrada.
pub(crate) fn calculate_new_average_cost(
    current_qty: Decimal,
    current_avg: Decimal,
    incoming_qty: Decimal,
    incoming_cost: Decimal,
) -> Decimal {
    let new_total_qty = current_qty + incoming_qty;
    if new_total_qty <= Decimal::ZERO {
        return incoming_cost;
    }
    let total_current_value = current_qty * current_avg;
    let total_incoming_value = incoming_qty * incoming_cost;
    (total_current_value + total_incoming_value) / new_total_qty
}

/// Saldo resultante de uma movimentação manual. Saída maior que o saldo
/// atual é rejeitada (política: bloquear em vez de negativar o estoque).
pub(crate) fn apply_movement(
    current_stock: Decimal,
    movement_type: MovementType,
    quantity: Decimal,
) -> Result<Decimal, AppError> {
    match movement_type {
        MovementType::Entrada => Ok(current_stock + quantity),
        MovementType::Saida => {
            if quantity > current_stock {
                return Err(AppError::InsufficientStock {
                    available: current_stock,
                    requested: quantity,
                });
            }
            Ok(current_stock - quantity)
        }
    }
}

/// Transições de compra só saem de PENDING; RECEIVED e CANCELLED são
/// estados terminais.
pub(crate) fn ensure_pending(status: PurchaseStatus) -> Result<(), AppError> {
    if status != PurchaseStatus::Pending {
        return Err(AppError::InvalidPurchaseState);
    }
    Ok(())
}

fn quantity_validation_error(message: &'static str) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    let mut err = validator::ValidationError::new("range");
    err.message = Some(message.into());
    errors.add("quantity", err);
    AppError::ValidationError(errors)
}

// ---
// Entradas do service
// ---

#[derive(Debug, Clone)]
pub struct NewPurchaseItem {
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub batch_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub ingredient_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub reason: MovementReason,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct StockService {
    inventory_repo: InventoryRepository,
    purchase_repo: PurchaseRepository,
}

impl StockService {
    pub fn new(inventory_repo: InventoryRepository, purchase_repo: PurchaseRepository) -> Self {
        Self {
            inventory_repo,
            purchase_repo,
        }
    }

    // --- CRIAR COMPRA (nasce PENDING, sem efeito no estoque) ---
    pub async fn create_purchase<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        supplier: &str,
        purchase_date: NaiveDate,
        items: Vec<NewPurchaseItem>,
    ) -> Result<PurchaseDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if items.is_empty() {
            return Err(quantity_validation_error("A compra precisa de ao menos um item."));
        }

        // Total calculado a partir dos itens; nunca aceito do cliente.
        let mut total_amount = Decimal::ZERO;
        for item in &items {
            if item.quantity <= Decimal::ZERO {
                return Err(quantity_validation_error("A quantidade deve ser maior que zero."));
            }
            total_amount += item.quantity * item.unit_cost;
        }

        let mut tx = executor.begin().await?;

        let purchase = self
            .purchase_repo
            .insert_purchase(&mut *tx, tenant_id, supplier, purchase_date, total_amount)
            .await?;

        let mut saved_items = Vec::with_capacity(items.len());
        for item in &items {
            // Item de compra só referencia ingrediente cadastrado.
            self.inventory_repo
                .get_ingredient(&mut *tx, tenant_id, item.ingredient_id)
                .await?
                .ok_or(AppError::IngredientNotFound)?;

            let line_total = item.quantity * item.unit_cost;
            let saved = self
                .purchase_repo
                .insert_purchase_item(
                    &mut *tx,
                    tenant_id,
                    purchase.id,
                    item.ingredient_id,
                    item.quantity,
                    item.unit_cost,
                    line_total,
                    item.batch_number.as_deref(),
                    item.expiration_date,
                )
                .await?;
            saved_items.push(saved);
        }

        tx.commit().await?;
        Ok(PurchaseDetail {
            purchase,
            items: saved_items,
        })
    }

    // --- RECEBER COMPRA (aplica o custeio) ---
    // Transação única: ou todos os itens entram no estoque, ou nenhum.
    pub async fn receive_purchase<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        purchase_id: Uuid,
        performed_by: Uuid,
        performed_by_role: &str,
    ) -> Result<PurchaseDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let purchase = self
            .purchase_repo
            .get_purchase_for_update(&mut *tx, tenant_id, purchase_id)
            .await?
            .ok_or(AppError::PurchaseNotFound)?;

        ensure_pending(purchase.status)?;

        let items = self
            .purchase_repo
            .get_purchase_items(&mut *tx, tenant_id, purchase_id)
            .await?;

        for item in &items {
            // Escopo exclusivo por ingrediente: a linha fica trancada até
            // o commit, serializando o cálculo do custo médio.
            let ingredient = self
                .inventory_repo
                .get_ingredient_for_update(&mut *tx, tenant_id, item.ingredient_id)
                .await?
                .ok_or(AppError::IngredientNotFound)?;

            let new_avg_cost = calculate_new_average_cost(
                ingredient.current_stock,
                ingredient.avg_cost,
                item.quantity,
                item.unit_cost,
            );
            let new_stock = ingredient.current_stock + item.quantity;

            self.inventory_repo
                .set_stock_and_cost(&mut *tx, tenant_id, item.ingredient_id, new_stock, new_avg_cost)
                .await?;

            // Lote só para rastreio de validade
            if item.batch_number.is_some() || item.expiration_date.is_some() {
                let batch_number = item.batch_number.as_deref().unwrap_or("DEFAULT");
                self.inventory_repo
                    .insert_batch(
                        &mut *tx,
                        tenant_id,
                        item.ingredient_id,
                        batch_number,
                        item.expiration_date,
                        item.quantity,
                        item.unit_cost,
                    )
                    .await?;
            }

            // Entrada implícita no livro-razão (simetria de auditoria)
            self.inventory_repo
                .record_stock_movement(
                    &mut *tx,
                    tenant_id,
                    item.ingredient_id,
                    MovementType::Entrada,
                    item.quantity,
                    MovementReason::Purchase,
                    Some("Recebimento de compra"),
                    performed_by,
                    performed_by_role,
                )
                .await?;
        }

        let updated = self
            .purchase_repo
            .update_status(
                &mut *tx,
                tenant_id,
                purchase_id,
                PurchaseStatus::Received,
                Some(Utc::now()),
            )
            .await?;

        tx.commit().await?;
        Ok(PurchaseDetail {
            purchase: updated,
            items,
        })
    }

    // --- CANCELAR COMPRA ---
    // Permitido apenas enquanto PENDING; nunca toca o estoque.
    pub async fn cancel_purchase<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<PurchaseDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let purchase = self
            .purchase_repo
            .get_purchase_for_update(&mut *tx, tenant_id, purchase_id)
            .await?
            .ok_or(AppError::PurchaseNotFound)?;

        ensure_pending(purchase.status)?;

        let updated = self
            .purchase_repo
            .update_status(&mut *tx, tenant_id, purchase_id, PurchaseStatus::Cancelled, None)
            .await?;

        let items = self
            .purchase_repo
            .get_purchase_items(&mut *tx, tenant_id, purchase_id)
            .await?;

        tx.commit().await?;
        Ok(PurchaseDetail {
            purchase: updated,
            items,
        })
    }

    // --- MOVIMENTAÇÃO MANUAL (ENTRADA / SAÍDA) ---
    // Não altera o custo médio: movimentação manual não carrega preço.
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: NewStockMovement,
        performed_by: Uuid,
        performed_by_role: &str,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if input.quantity <= Decimal::ZERO {
            return Err(quantity_validation_error("A quantidade deve ser maior que zero."));
        }

        let mut tx = executor.begin().await?;

        let ingredient = self
            .inventory_repo
            .get_ingredient_for_update(&mut *tx, tenant_id, input.ingredient_id)
            .await?
            .ok_or(AppError::IngredientNotFound)?;

        let new_stock = apply_movement(ingredient.current_stock, input.movement_type, input.quantity)?;

        self.inventory_repo
            .set_stock(&mut *tx, tenant_id, input.ingredient_id, new_stock)
            .await?;

        let movement = self
            .inventory_repo
            .record_stock_movement(
                &mut *tx,
                tenant_id,
                input.ingredient_id,
                input.movement_type,
                input.quantity,
                input.reason,
                input.notes.as_deref(),
                performed_by,
                performed_by_role,
            )
            .await?;

        tx.commit().await?;
        Ok(movement)
    }

    // ---
    // CRUD de ingredientes
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
        self.inventory_repo
            .create_ingredient(
                executor,
                tenant_id,
                name,
                category,
                unit,
                min_stock,
                max_stock,
                supplier,
                shelf_life_days,
                storage_condition,
            )
            .await
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
        self.inventory_repo
            .list_ingredients(executor, tenant_id, category, include_inactive)
            .await
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
    ) -> Result<Ingredient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.inventory_repo
            .update_ingredient(
                executor,
                tenant_id,
                ingredient_id,
                name,
                category,
                unit,
                min_stock,
                max_stock,
                supplier,
                shelf_life_days,
                storage_condition,
            )
            .await?
            .ok_or(AppError::IngredientNotFound)
    }

    // Ingrediente nunca é removido: desativação, e só quando nenhuma
    // receita ativa ainda o referencia.
    pub async fn deactivate_ingredient<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ingredient_id: Uuid,
    ) -> Result<Ingredient, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let refs = self
            .inventory_repo
            .count_active_recipe_refs(&mut *tx, tenant_id, ingredient_id)
            .await?;
        if refs > 0 {
            return Err(AppError::IngredientInUse);
        }

        let ingredient = self
            .inventory_repo
            .deactivate_ingredient(&mut *tx, tenant_id, ingredient_id)
            .await?
            .ok_or(AppError::IngredientNotFound)?;

        tx.commit().await?;
        Ok(ingredient)
    }

    pub async fn list_movements<'e, E>(
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
        self.inventory_repo
            .list_stock_movements(executor, tenant_id, ingredient_id, movement_type, limit, offset)
            .await
    }

    // ---
    // Consultas de compras
    // ---

    pub async fn list_purchases<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        status: Option<PurchaseStatus>,
    ) -> Result<Vec<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.purchase_repo
            .list_purchases(executor, tenant_id, status)
            .await
    }

    pub async fn get_purchase_detail<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<PurchaseDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let purchase = self
            .purchase_repo
            .get_purchase(&mut *tx, tenant_id, purchase_id)
            .await?
            .ok_or(AppError::PurchaseNotFound)?;

        let items = self
            .purchase_repo
            .get_purchase_items(&mut *tx, tenant_id, purchase_id)
            .await?;

        tx.commit().await?;
        Ok(PurchaseDetail { purchase, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn custo_medio_em_base_zerada_vira_o_custo_da_entrada() {
        let avg = calculate_new_average_cost(dec("0"), dec("0"), dec("10"), dec("2.00"));
        assert_eq!(avg, dec("2.00"));
    }

    #[test]
    fn custo_medio_pondera_saldo_existente() {
        // 10 un a 2.00 já em estoque + 10 un a 4.00 => 20 un a 3.00
        let avg = calculate_new_average_cost(dec("10"), dec("2.00"), dec("10"), dec("4.00"));
        assert_eq!(avg, dec("3.00"));
    }

    #[test]
    fn custo_medio_de_sequencia_de_compras_e_a_media_ponderada_global() {
        let compras = [
            (dec("10"), dec("2.00")),
            (dec("5"), dec("3.50")),
            (dec("20"), dec("1.25")),
        ];

        let mut saldo = Decimal::ZERO;
        let mut avg = Decimal::ZERO;
        for (qtd, custo) in &compras {
            avg = calculate_new_average_cost(saldo, avg, *qtd, *custo);
            saldo += qtd;
        }

        let total_valor: Decimal = compras.iter().map(|(q, c)| q * c).sum();
        let total_qtd: Decimal = compras.iter().map(|(q, _)| *q).sum();

        assert_eq!(saldo, total_qtd);
        assert_eq!(avg, total_valor / total_qtd);
    }

    #[test]
    fn entrada_manual_soma_ao_saldo() {
        let saldo = apply_movement(dec("7.5"), MovementType::Entrada, dec("2.5")).unwrap();
        assert_eq!(saldo, dec("10"));
    }

    #[test]
    fn saida_manual_subtrai_do_saldo() {
        let saldo = apply_movement(dec("10"), MovementType::Saida, dec("4")).unwrap();
        assert_eq!(saldo, dec("6"));
    }

    #[test]
    fn saida_maior_que_o_saldo_e_rejeitada_sem_alterar_nada() {
        let err = apply_movement(dec("3"), MovementType::Saida, dec("5")).unwrap_err();
        match err {
            AppError::InsufficientStock { available, requested } => {
                assert_eq!(available, dec("3"));
                assert_eq!(requested, dec("5"));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn saida_igual_ao_saldo_zera_o_estoque() {
        let saldo = apply_movement(dec("5"), MovementType::Saida, dec("5")).unwrap();
        assert_eq!(saldo, Decimal::ZERO);
    }

    #[test]
    fn compra_pendente_pode_transicionar() {
        assert!(ensure_pending(PurchaseStatus::Pending).is_ok());
    }

    #[test]
    fn compra_cancelada_ou_recebida_e_terminal() {
        assert!(matches!(
            ensure_pending(PurchaseStatus::Cancelled),
            Err(AppError::InvalidPurchaseState)
        ));
        assert!(matches!(
            ensure_pending(PurchaseStatus::Received),
            Err(AppError::InvalidPurchaseState)
        ));
    }
}
