// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use convert_case::{Case, Casing};
use serde_json::json;
use thiserror::Error;

// Erros de negócio são resultados esperados; só falhas de infraestrutura viram 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Corpo da requisição que nem chega a ter o formato do payload
    #[error("Corpo da requisição inválido: {0}")]
    MalformedPayload(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("SKU já existe nesta organização")]
    SkuAlreadyExists,

    // Usado tanto para "não existe" quanto para "pertence a outra organização"
    #[error("Recurso não encontrado")]
    NotFound,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido ou ausente")]
    Unauthorized,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists | AppError::SkuAlreadyExists => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(camel_case(&field), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::MalformedPayload(reason) => {
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": { "body": [reason] },
                }));
                return (status, body).into_response();
            }
            AppError::EmailAlreadyExists => "Este e-mail já está em uso.",
            AppError::SkuAlreadyExists => "Este SKU já existe na sua organização.",
            AppError::NotFound => "Recurso não encontrado.",
            AppError::InvalidCredentials => "E-mail ou senha inválidos.",
            AppError::Unauthorized => "Token de autenticação inválido ou ausente.",

            // Banco, bcrypt, JWT e afins: loga o detalhe, devolve mensagem opaca.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                "Ocorreu um erro inesperado."
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// Os payloads trafegam em camelCase, o validator reporta o nome do campo Rust.
fn camel_case(field: &str) -> String {
    field.to_case(Case::Camel)
}
