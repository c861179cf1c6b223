// src/handlers/recipes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{db_utils::get_tenant_connection, error::AppError},
    config::AppState,
    middleware::tenancy::TenantContext,
    services::recipe_service::{NewRecipe, NewRecipeIngredient},
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
pub struct RecipeIngredientPayload {
    pub ingredient_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[serde(default)]
    pub prep_time_minutes: i32,

    #[validate(range(min = 1, message = "A receita precisa render ao menos uma porção."))]
    pub servings: i32,

    pub difficulty: Option<String>,

    #[serde(default)]
    pub instructions: Vec<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub profit_margin: Decimal,

    #[validate(length(min = 1, message = "A receita precisa de ao menos um ingrediente."), nested)]
    pub ingredients: Vec<RecipeIngredientPayload>,
}

// ---
// Handler: create_recipe
// ---
#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "Recipes",
    request_body = CreateRecipePayload,
    responses((status = 201, description = "Receita criada", body = crate::models::recipes::Recipe))
)]
pub async fn create_recipe(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateRecipePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let recipe = app_state
        .recipe_service
        .create_recipe(
            &mut *conn,
            tenant.0,
            NewRecipe {
                name: payload.name,
                category: payload.category,
                prep_time_minutes: payload.prep_time_minutes,
                servings: payload.servings,
                difficulty: payload.difficulty,
                instructions: payload.instructions,
                profit_margin: payload.profit_margin,
                ingredients: payload
                    .ingredients
                    .into_iter()
                    .map(|line| NewRecipeIngredient {
                        ingredient_id: line.ingredient_id,
                        quantity: line.quantity,
                        unit: line.unit,
                    })
                    .collect(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

// ---
// Handler: list_recipes
// ---
#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "Recipes",
    responses((status = 200, description = "Lista de receitas", body = [crate::models::recipes::Recipe]))
)]
pub async fn list_recipes(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let recipes = app_state
        .recipe_service
        .list_recipes(&mut *conn, tenant.0)
        .await?;

    Ok((StatusCode::OK, Json(recipes)))
}

// ---
// Handler: get_recipe_cost
// ---
// O custo NUNCA vem de coluna persistida: é recalculado aqui, com o
// custo médio atual de cada ingrediente.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/cost",
    tag = "Recipes",
    params(("id" = Uuid, Path, description = "Id da receita")),
    responses((status = 200, description = "Custeio atual da receita", body = crate::models::recipes::RecipeCost))
)]
pub async fn get_recipe_cost(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let cost = app_state
        .recipe_service
        .get_recipe_cost(&mut *conn, tenant.0, id)
        .await?;

    // Valores monetários saem com 2 casas; o cálculo interno é feito
    // com precisão cheia.
    Ok((StatusCode::OK, Json(cost.rounded())))
}
