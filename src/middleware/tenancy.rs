// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

// Cabeçalhos que a camada externa (UI/gateway) preenche. Autenticação e
// roteamento de tenant acontecem lá fora; aqui eles chegam como
// identidades opacas.
const TENANT_ID_HEADER: &str = "x-tenant-id";
const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

// Rejeição simples com status + mensagem, já em formato de API.
#[derive(Debug)]
pub struct ContextRejection {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ContextRejection {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

fn bad_request(message: &str) -> ContextRejection {
    ContextRejection {
        status: StatusCode::BAD_REQUEST,
        message: message.to_string(),
    }
}

fn header_uuid(parts: &Parts, header: &str, label: &str) -> Result<Uuid, ContextRejection> {
    let value = parts
        .headers
        .get(header)
        .ok_or_else(|| bad_request(&format!("O cabeçalho {} é obrigatório.", label)))?;

    let value_str = value
        .to_str()
        .map_err(|_| bad_request(&format!("Cabeçalho {} contém caracteres inválidos.", label)))?;

    Uuid::parse_str(value_str)
        .map_err(|_| bad_request(&format!("Cabeçalho {} inválido (não é um UUID).", label)))
}

// ---
// TenantContext: qual loja está sendo acessada
// ---
#[derive(Debug, Clone)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ContextRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let tenant_id = header_uuid(parts, TENANT_ID_HEADER, "X-Tenant-ID")?;
        Ok(TenantContext(tenant_id))
    }
}

// ---
// OperatorContext: quem executa a operação (auditoria de movimentações)
// ---
#[derive(Debug, Clone)]
pub struct OperatorContext {
    pub user_id: Uuid,
    pub role: String,
}

impl<S> FromRequestParts<S> for OperatorContext
where
    S: Send + Sync,
{
    type Rejection = ContextRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user_id = header_uuid(parts, USER_ID_HEADER, "X-User-ID")?;

        let role = match parts.headers.get(USER_ROLE_HEADER) {
            Some(value) => value
                .to_str()
                .map_err(|_| bad_request("Cabeçalho X-User-Role contém caracteres inválidos."))?
                .to_string(),
            None => "operador".to_string(),
        };

        Ok(OperatorContext { user_id, role })
    }
}
