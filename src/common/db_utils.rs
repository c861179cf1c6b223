use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::tenancy::TenantContext;

// ---
// Helper RLS: a "chave" para o banco de dados
// ---
/// Adquire uma conexão da pool e define a variável de sessão que as
/// políticas de RLS usam para isolar o tenant.
pub(crate) async fn get_tenant_connection(
    app_state: &AppState,
    tenant_ctx: &TenantContext,
) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
    // 1. Adquire conexão
    // O operador '?' converte automaticamente sqlx::Error -> AppError
    let mut conn = app_state.db_pool.acquire().await?;

    // 2. Define Tenant ID
    sqlx::query("SELECT set_config('app.tenant_id', $1, true)")
        .bind(tenant_ctx.0.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(conn)
}
