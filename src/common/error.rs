// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use validator::ValidationErrorsKind;

use crate::common::i18n::{translate, MessageKey};
use crate::middleware::i18n::Locale;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Código de catálogo já existe: {0}")]
    CatalogCodeAlreadyExists(String),

    // Dois pedidos simultâneos podem calcular o mesmo número
    #[error("Número de documento já utilizado: {0}")]
    DocumentNumberConflict(String),

    #[error("Devis bloqueado para edição: {0}")]
    QuoteLocked(String),

    #[error("Já existe uma fatura para o devis {0}")]
    InvoiceAlreadyExists(String),

    #[error("Valor de pagamento inválido")]
    InvalidPaymentAmount,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Erro já traduzido, pronto para virar resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidPaymentAmount => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::QuoteLocked(_) => StatusCode::FORBIDDEN,
            AppError::ResourceNotFound(_) | AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                StatusCode::NOT_FOUND
            }
            AppError::CatalogCodeAlreadyExists(_)
            | AppError::DocumentNumberConflict(_)
            | AppError::InvoiceAlreadyExists(_)
            | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta localizada.
    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status_code();

        let (message, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                collect_validation_details(&errors, "", &mut details);
                (
                    translate(MessageKey::ValidationFailed, lang, None),
                    Some(json!(details)),
                )
            }
            AppError::InvalidCredentials => (translate(MessageKey::InvalidCredentials, lang, None), None),
            AppError::InvalidToken => (translate(MessageKey::InvalidToken, lang, None), None),
            AppError::ResourceNotFound(what) => {
                (translate(MessageKey::ResourceNotFound, lang, Some(&what)), None)
            }
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                (translate(MessageKey::ResourceNotFound, lang, Some("?")), None)
            }
            AppError::CatalogCodeAlreadyExists(code) => {
                (translate(MessageKey::CatalogCodeAlreadyExists, lang, Some(&code)), None)
            }
            AppError::DocumentNumberConflict(number) => {
                (translate(MessageKey::DocumentNumberConflict, lang, Some(&number)), None)
            }
            AppError::QuoteLocked(number) => (translate(MessageKey::QuoteLocked, lang, Some(&number)), None),
            AppError::InvoiceAlreadyExists(number) => {
                (translate(MessageKey::InvoiceAlreadyExists, lang, Some(&number)), None)
            }
            AppError::InvalidPaymentAmount => (translate(MessageKey::InvalidPaymentAmount, lang, None), None),
            AppError::UniqueConstraintViolation(what) => {
                (translate(MessageKey::UniqueConstraintViolation, lang, Some(&what)), None)
            }
            e => {
                // O detalhe fica só no log
                tracing::error!("Erro Interno do Servidor: {}", e);
                (translate(MessageKey::Unexpected, lang, None), None)
            }
        };

        ApiError { status, message, details }
    }
}

// Usado pelo middleware, que não tem acesso ao Locale
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

// Erros aninhados viram chaves como "lines[0].quantity"
fn collect_validation_details(
    errors: &validator::ValidationErrors,
    prefix: &str,
    details: &mut HashMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let key = format!("{}{}", prefix, field);
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                details.insert(key, messages);
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_details(inner, &format!("{}.", key), details);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_details(inner, &format!("{}[{}].", key, index), details);
                }
            }
        }
    }
}

/// Traduz violações de unicidade do Postgres no erro de domínio certo.
pub fn map_unique_violation(e: sqlx::Error, on_conflict: impl FnOnce(&str) -> AppError) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return on_conflict(constraint);
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Le nom est requis"))]
        name: String,
    }

    #[test]
    fn maps_domain_errors_to_http_status() {
        assert_eq!(AppError::QuoteLocked("N°001".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvoiceAlreadyExists("N°001".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidPaymentAmount.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DatabaseError(sqlx::Error::RowNotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let errors = Sample { name: String::new() }.validate().unwrap_err();
        let api_error = AppError::ValidationError(errors).to_api_error(&Locale::default());

        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.message, "Un ou plusieurs champs sont invalides.");
        let details = api_error.details.expect("details");
        assert_eq!(details["name"][0], "Le nom est requis");
    }

    #[test]
    fn nested_line_errors_are_reported_by_index() {
        use crate::models::quote::QuotePayload;

        let payload: QuotePayload = serde_json::from_value(json!({
            "clientId": uuid::Uuid::new_v4(),
            "lines": [{ "quantity": 2 }, { "quantity": 1e20, "unitPriceHt": 1e11 }]
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let details = AppError::ValidationError(errors)
            .to_api_error(&Locale::default())
            .details
            .expect("details");
        assert!(details.get("lines[1].quantity").is_some());
        assert!(details.get("lines[1].unit_price_ht").is_some());
        assert!(details.get("lines[0].quantity").is_none());
    }

    #[test]
    fn messages_follow_the_locale() {
        let api_error = AppError::QuoteLocked("N°003".into()).to_api_error(&Locale("en".into()));
        assert_eq!(
            api_error.message,
            "Quote N°003 is locked because it was accepted or converted into an invoice."
        );
    }
}
