// src/handlers/purchases.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{db_utils::get_tenant_connection, error::AppError},
    config::AppState,
    middleware::tenancy::{OperatorContext, TenantContext},
    models::purchasing::PurchaseStatus,
    services::stock_service::NewPurchaseItem,
};

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItemPayload {
    pub ingredient_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Decimal,

    // Dados de lote (opcionais): quem compra remédio/perecível manda;
    // insumo seco pode vir sem nada.
    pub batch_number: Option<String>,
    pub expiration_date: Option<NaiveDate>, // Formato YYYY-MM-DD
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchasePayload {
    #[validate(length(min = 1, message = "O fornecedor é obrigatório."))]
    pub supplier: String,

    pub purchase_date: NaiveDate,

    #[validate(length(min = 1, message = "A compra precisa de ao menos um item."), nested)]
    pub items: Vec<PurchaseItemPayload>,
}

// ---
// Handler: create_purchase (nasce PENDING)
// ---
#[utoipa::path(
    post,
    path = "/api/purchases",
    tag = "Purchases",
    request_body = CreatePurchasePayload,
    responses((status = 201, description = "Compra registrada", body = crate::models::purchasing::PurchaseDetail))
)]
pub async fn create_purchase(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreatePurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let items: Vec<NewPurchaseItem> = payload
        .items
        .into_iter()
        .map(|item| NewPurchaseItem {
            ingredient_id: item.ingredient_id,
            quantity: item.quantity,
            unit_cost: item.unit_cost,
            batch_number: item.batch_number,
            expiration_date: item.expiration_date,
        })
        .collect();

    let detail = app_state
        .stock_service
        .create_purchase(&mut *conn, tenant.0, &payload.supplier, payload.purchase_date, items)
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// ---
// Handler: list_purchases
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListPurchasesParams {
    pub status: Option<PurchaseStatus>,
}

#[utoipa::path(
    get,
    path = "/api/purchases",
    tag = "Purchases",
    params(ListPurchasesParams),
    responses((status = 200, description = "Lista de compras", body = [crate::models::purchasing::Purchase]))
)]
pub async fn list_purchases(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<ListPurchasesParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let purchases = app_state
        .stock_service
        .list_purchases(&mut *conn, tenant.0, params.status)
        .await?;

    Ok((StatusCode::OK, Json(purchases)))
}

// ---
// Handler: get_purchase
// ---
#[utoipa::path(
    get,
    path = "/api/purchases/{id}",
    tag = "Purchases",
    params(("id" = Uuid, Path, description = "Id da compra")),
    responses((status = 200, description = "Compra com itens", body = crate::models::purchasing::PurchaseDetail))
)]
pub async fn get_purchase(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let detail = app_state
        .stock_service
        .get_purchase_detail(&mut *conn, tenant.0, id)
        .await?;

    Ok((StatusCode::OK, Json(detail)))
}

// ---
// Handler: receive_purchase
// ---
// Transição PENDING -> RECEIVED. É aqui que o estoque e o custo médio
// dos ingredientes são atualizados, tudo ou nada.
#[utoipa::path(
    post,
    path = "/api/purchases/{id}/receive",
    tag = "Purchases",
    params(("id" = Uuid, Path, description = "Id da compra")),
    responses(
        (status = 200, description = "Compra recebida e estoque atualizado", body = crate::models::purchasing::PurchaseDetail),
        (status = 409, description = "Compra fora do estado PENDING")
    )
)]
pub async fn receive_purchase(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    operator: OperatorContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let detail = app_state
        .stock_service
        .receive_purchase(&mut *conn, tenant.0, id, operator.user_id, &operator.role)
        .await?;

    Ok((StatusCode::OK, Json(detail)))
}

// ---
// Handler: cancel_purchase
// ---
#[utoipa::path(
    post,
    path = "/api/purchases/{id}/cancel",
    tag = "Purchases",
    params(("id" = Uuid, Path, description = "Id da compra")),
    responses(
        (status = 200, description = "Compra cancelada (sem efeito no estoque)", body = crate::models::purchasing::PurchaseDetail),
        (status = 409, description = "Compra fora do estado PENDING")
    )
)]
pub async fn cancel_purchase(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let detail = app_state
        .stock_service
        .cancel_purchase(&mut *conn, tenant.0, id)
        .await?;

    Ok((StatusCode::OK, Json(detail)))
}
