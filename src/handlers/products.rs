// src/handlers/products.rs

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
    middleware::tenancy::TenantContext,
    services::product_service::{NewProduct, ProductCostsUpdate},
};

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
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    // Ou receita vinculada, ou custo base manual; nunca os dois.
    pub recipe_id: Option<Uuid>,
    pub base_cost: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub packaging_cost: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub labor_cost: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub overhead_cost: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub other_costs: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub profit_margin: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub current_stock: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub min_stock: Decimal,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductCostsPayload {
    // Só aceito em produto SEM receita vinculada
    pub base_cost: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub packaging_cost: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub labor_cost: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub overhead_cost: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub other_costs: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub profit_margin: Decimal,
}

// ---
// Handler: create_product
// ---
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses((status = 201, description = "Produto criado", body = crate::models::products::Product))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if let Some(base_cost) = payload.base_cost {
        validate_not_negative(&base_cost).map_err(|e| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("baseCost", e);
            AppError::ValidationError(errors)
        })?;
    }

    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let product = app_state
        .product_service
        .create_product(
            &mut *conn,
            tenant.0,
            NewProduct {
                name: payload.name,
                category: payload.category,
                recipe_id: payload.recipe_id,
                base_cost: payload.base_cost,
                packaging_cost: payload.packaging_cost,
                labor_cost: payload.labor_cost,
                overhead_cost: payload.overhead_cost,
                other_costs: payload.other_costs,
                profit_margin: payload.profit_margin,
                current_stock: payload.current_stock,
                min_stock: payload.min_stock,
                unit: payload.unit,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// ---
// Handler: list_products
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsParams {
    pub category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ListProductsParams),
    responses((status = 200, description = "Lista de produtos", body = [crate::models::products::Product]))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<ListProductsParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let products = app_state
        .product_service
        .list_products(&mut *conn, tenant.0, params.category.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(products)))
}

// ---
// Handler: get_product_pricing
// ---
// Precificação derivada: produto com receita lê o custo por porção
// dela na hora (read-through), nunca uma cópia salva.
#[utoipa::path(
    get,
    path = "/api/products/{id}/pricing",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Id do produto")),
    responses((status = 200, description = "Precificação atual do produto", body = crate::models::products::ProductPricing))
)]
pub async fn get_product_pricing(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let pricing = app_state
        .product_service
        .get_product_pricing(&mut *conn, tenant.0, id)
        .await?;

    Ok((StatusCode::OK, Json(pricing.rounded())))
}

// ---
// Handler: update_product_costs
// ---
#[utoipa::path(
    patch,
    path = "/api/products/{id}/costs",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Id do produto")),
    request_body = UpdateProductCostsPayload,
    responses(
        (status = 200, description = "Custos atualizados", body = crate::models::products::Product),
        (status = 409, description = "Custo base travado por receita vinculada")
    )
)]
pub async fn update_product_costs(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductCostsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let product = app_state
        .product_service
        .update_product_costs(
            &mut *conn,
            tenant.0,
            id,
            ProductCostsUpdate {
                base_cost: payload.base_cost,
                packaging_cost: payload.packaging_cost,
                labor_cost: payload.labor_cost,
                overhead_cost: payload.overhead_cost,
                other_costs: payload.other_costs,
                profit_margin: payload.profit_margin,
            },
        )
        .await?;

    Ok((StatusCode::OK, Json(product)))
}
