// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{db_utils::get_tenant_connection, error::AppError},
    config::AppState,
    middleware::tenancy::{OperatorContext, TenantContext},
    models::inventory::{MovementReason, MovementType},
    services::stock_service::NewStockMovement,
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: CreateIngredient
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub min_stock: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub max_stock: Decimal,

    pub supplier: Option<String>,
    pub shelf_life_days: Option<i32>,
    pub storage_condition: Option<String>,
}

// ---
// Handler: create_ingredient
// ---
#[utoipa::path(
    post,
    path = "/api/ingredients",
    tag = "Ingredients",
    request_body = CreateIngredientPayload,
    responses((status = 201, description = "Ingrediente criado", body = crate::models::inventory::Ingredient))
)]
pub async fn create_ingredient(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateIngredientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let ingredient = app_state
        .stock_service
        .create_ingredient(
            &mut *conn,
            tenant.0,
            &payload.name,
            &payload.category,
            &payload.unit,
            payload.min_stock,
            payload.max_stock,
            payload.supplier.as_deref(),
            payload.shelf_life_days,
            payload.storage_condition.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ingredient)))
}

// ---
// Handler: list_ingredients
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListIngredientsParams {
    pub category: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "Ingredients",
    params(ListIngredientsParams),
    responses((status = 200, description = "Lista de ingredientes", body = [crate::models::inventory::Ingredient]))
)]
pub async fn list_ingredients(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<ListIngredientsParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let ingredients = app_state
        .stock_service
        .list_ingredients(
            &mut *conn,
            tenant.0,
            params.category.as_deref(),
            params.include_inactive,
        )
        .await?;

    Ok((StatusCode::OK, Json(ingredients)))
}

// ---
// Handler: update_ingredient
// ---
#[utoipa::path(
    put,
    path = "/api/ingredients/{id}",
    tag = "Ingredients",
    params(("id" = Uuid, Path, description = "Id do ingrediente")),
    request_body = CreateIngredientPayload,
    responses((status = 200, description = "Ingrediente atualizado", body = crate::models::inventory::Ingredient))
)]
pub async fn update_ingredient(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateIngredientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let ingredient = app_state
        .stock_service
        .update_ingredient(
            &mut *conn,
            tenant.0,
            id,
            &payload.name,
            &payload.category,
            &payload.unit,
            payload.min_stock,
            payload.max_stock,
            payload.supplier.as_deref(),
            payload.shelf_life_days,
            payload.storage_condition.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(ingredient)))
}

// ---
// Handler: deactivate_ingredient (soft delete)
// ---
// Ingrediente referenciado por receita ativa nunca é removido; apenas
// desativado, e mesmo isso só quando nenhuma receita ativa o usa.
#[utoipa::path(
    delete,
    path = "/api/ingredients/{id}",
    tag = "Ingredients",
    params(("id" = Uuid, Path, description = "Id do ingrediente")),
    responses((status = 200, description = "Ingrediente desativado", body = crate::models::inventory::Ingredient))
)]
pub async fn deactivate_ingredient(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let ingredient = app_state
        .stock_service
        .deactivate_ingredient(&mut *conn, tenant.0, id)
        .await?;

    Ok((StatusCode::OK, Json(ingredient)))
}

// ---
// Payload: movimentação manual
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordMovementPayload {
    pub ingredient_id: Uuid,

    pub movement_type: MovementType,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    pub reason: MovementReason,

    pub notes: Option<String>,
}

// ---
// Handler: record_movement
// ---
#[utoipa::path(
    post,
    path = "/api/inventory/movements",
    tag = "Inventory",
    request_body = RecordMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada", body = crate::models::inventory::StockMovement),
        (status = 409, description = "Estoque insuficiente para a saída")
    )
)]
pub async fn record_movement(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    operator: OperatorContext,
    Json(payload): Json<RecordMovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let movement = app_state
        .stock_service
        .record_movement(
            &mut *conn,
            tenant.0,
            NewStockMovement {
                ingredient_id: payload.ingredient_id,
                movement_type: payload.movement_type,
                quantity: payload.quantity,
                reason: payload.reason,
                notes: payload.notes,
            },
            operator.user_id,
            &operator.role,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(movement)))
}

// ---
// Handler: list_movements
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListMovementsParams {
    pub ingredient_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/inventory/movements",
    tag = "Inventory",
    params(ListMovementsParams),
    responses((status = 200, description = "Histórico de movimentações", body = [crate::models::inventory::StockMovement]))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<ListMovementsParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let per_page = params.per_page.unwrap_or(50).clamp(1, 200);
    let page = params.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let movements = app_state
        .stock_service
        .list_movements(
            &mut *conn,
            tenant.0,
            params.ingredient_id,
            params.movement_type,
            per_page,
            offset,
        )
        .await?;

    Ok((StatusCode::OK, Json(movements)))
}
