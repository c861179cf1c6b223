use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Nenhuma variante é fatal: cada erro fica restrito à operação pedida e
// nunca deixa o livro-razão inconsistente para as demais entidades.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Ingrediente não encontrado")]
    IngredientNotFound,

    #[error("Receita não encontrada")]
    RecipeNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Compra não encontrada")]
    PurchaseNotFound,

    #[error("Estoque insuficiente: disponível {available}, solicitado {requested}")]
    InsufficientStock {
        available: rust_decimal::Decimal,
        requested: rust_decimal::Decimal,
    },

    #[error("Compra em estado inválido para esta operação")]
    InvalidPurchaseState,

    #[error("Número de porções da receita deve ser maior que zero")]
    InvalidServings,

    #[error("Ingrediente em uso por receita ativa")]
    IngredientInUse,

    #[error("Custo base não pode ser editado enquanto houver receita vinculada")]
    ProductBaseCostLocked,

    // Outra transação venceu a disputa pela mesma linha; o chamador
    // deve tentar de novo.
    #[error("Conflito de concorrência")]
    ConcurrencyConflict,

    #[error("Nome já cadastrado: {0}")]
    NameAlreadyExists(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// Conversão manual (em vez de #[from]) para reconhecer falhas de
// serialização/deadlock do Postgres e devolvê-las como conflito
// recuperável, não como 500.
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if matches!(db_err.code().as_deref(), Some("40001") | Some("40P01")) {
                return AppError::ConcurrencyConflict;
            }
        }
        AppError::DatabaseError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }

            AppError::InsufficientStock { available, requested } => {
                let body = Json(json!({
                    "error": "Estoque insuficiente para a saída solicitada.",
                    "available": available,
                    "requested": requested,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            AppError::IngredientNotFound => (StatusCode::NOT_FOUND, "Ingrediente não encontrado."),
            AppError::RecipeNotFound => (StatusCode::NOT_FOUND, "Receita não encontrada."),
            AppError::ProductNotFound => (StatusCode::NOT_FOUND, "Produto não encontrado."),
            AppError::PurchaseNotFound => (StatusCode::NOT_FOUND, "Compra não encontrada."),

            AppError::InvalidPurchaseState => (
                StatusCode::CONFLICT,
                "A compra não está em um estado que permita esta operação.",
            ),
            AppError::InvalidServings => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "O número de porções deve ser maior que zero.",
            ),
            AppError::IngredientInUse => (
                StatusCode::CONFLICT,
                "Ingrediente é usado por receita ativa; desative-a antes.",
            ),
            AppError::ProductBaseCostLocked => (
                StatusCode::CONFLICT,
                "Produto vinculado a receita: o custo base acompanha o custo por porção.",
            ),
            AppError::ConcurrencyConflict => (
                StatusCode::CONFLICT,
                "Outra operação atualizou este registro; tente novamente.",
            ),
            AppError::NameAlreadyExists(_) => (StatusCode::CONFLICT, "Este nome já está em uso."),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
