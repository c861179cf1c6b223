// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::{db_utils::get_tenant_connection, error::AppError},
    config::AppState,
    middleware::tenancy::TenantContext,
};

// ---
// Handler: inventory_report
// ---
// Saúde do estoque (níveis + validade), classificada na hora da
// consulta a partir do estado atual.
#[utoipa::path(
    get,
    path = "/api/reports/inventory",
    tag = "Reports",
    responses((status = 200, description = "Relatório de saúde do estoque", body = crate::models::reports::InventoryReport))
)]
pub async fn inventory_report(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let report = app_state
        .report_service
        .get_inventory_report(&mut *conn, tenant.0)
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

// ---
// Handler: cost_analysis
// ---
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysisParams {
    /// Janela de compras em dias (padrão: 30)
    pub period_days: Option<i64>,
    /// Restringe as estatísticas de estoque a uma categoria
    pub category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/reports/cost-analysis",
    tag = "Reports",
    params(CostAnalysisParams),
    responses((status = 200, description = "Análise consolidada de custos", body = crate::models::reports::CostAnalysis))
)]
pub async fn cost_analysis(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<CostAnalysisParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = get_tenant_connection(&app_state, &tenant).await?;

    let period_days = params.period_days.unwrap_or(30).clamp(1, 365);

    let analysis = app_state
        .analysis_service
        .get_cost_analysis(&mut *conn, tenant.0, period_days, params.category.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(analysis)))
}
