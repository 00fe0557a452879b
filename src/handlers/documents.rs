// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    services::document_service::PdfDocument,
};

fn pdf_response(document: PdfDocument) -> Result<Response, AppError> {
    // Configura os Headers para o navegador baixar o PDF
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", document.filename))
        .map_err(|e| anyhow::anyhow!("Nome de arquivo inválido: {}", e))?;

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, document.bytes).into_response())
}

// GET /api/quotes/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID do devis")),
    responses(
        (status = 200, description = "PDF do devis (application/pdf)"),
        (status = 404, description = "Devis não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn quote_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let document = app_state
        .document_service
        .generate_quote_pdf(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    pdf_response(document).map_err(|e| e.to_api_error(&locale))
}

// GET /api/invoices/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/invoices/{id}/pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID da fatura")),
    responses(
        (status = 200, description = "PDF da fatura com QR code de pagamento (application/pdf)"),
        (status = 404, description = "Fatura não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn invoice_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let document = app_state
        .document_service
        .generate_invoice_pdf(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    pdf_response(document).map_err(|e| e.to_api_error(&locale))
}
