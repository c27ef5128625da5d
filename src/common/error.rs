use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Item de estoque não encontrado")]
    ItemNotFound,

    #[error("Categoria não encontrada")]
    CategoryNotFound,

    #[error("Fornecedor não encontrado")]
    SupplierNotFound,

    #[error("Sessão de produção não encontrada")]
    SessionNotFound,

    #[error("Estoque insuficiente: disponível {disponivel}, solicitado {solicitado}")]
    InsufficientStock { disponivel: i64, solicitado: i64 },

    #[error("Nome já cadastrado: {0}")]
    NameAlreadyExists(String),

    #[error("Categoria em uso por itens de estoque")]
    CategoryInUse,

    #[error("Sessão de produção já finalizada")]
    SessionAlreadyClosed,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InsufficientStock { disponivel, solicitado } => {
                let body = Json(json!({
                    "error": "Estoque insuficiente para a baixa solicitada.",
                    "disponivel": disponivel,
                    "solicitado": solicitado,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::NameAlreadyExists(nome) => {
                (StatusCode::CONFLICT, format!("O nome '{}' já está cadastrado.", nome))
            }
            AppError::CategoryInUse => (
                StatusCode::CONFLICT,
                "A categoria não pode ser removida enquanto houver itens de estoque nela.".to_string(),
            ),
            AppError::SessionAlreadyClosed => (
                StatusCode::CONFLICT,
                "Esta sessão de produção já foi finalizada.".to_string(),
            ),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string()),
            AppError::ItemNotFound => {
                (StatusCode::NOT_FOUND, "Item de estoque não encontrado.".to_string())
            }
            AppError::CategoryNotFound => {
                (StatusCode::NOT_FOUND, "Categoria não encontrada.".to_string())
            }
            AppError::SupplierNotFound => {
                (StatusCode::NOT_FOUND, "Fornecedor não encontrado.".to_string())
            }
            AppError::SessionNotFound => {
                (StatusCode::NOT_FOUND, "Sessão de produção não encontrada.".to_string())
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
