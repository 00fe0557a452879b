// src/handlers/quotes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        invoice::Invoice,
        quote::{Quote, QuoteDetail, QuoteListQuery, QuotePayload, QuoteStatusPayload, QuoteSummary},
    },
};

// GET /api/quotes
#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Quotes",
    params(QuoteListQuery),
    responses((status = 200, description = "Devis, mais recentes primeiro", body = Vec<QuoteSummary>)),
    security(("api_jwt" = []))
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let quotes = app_state
        .quote_service
        .list(query.search.as_deref(), query.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(quotes)))
}

// POST /api/quotes
#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Quotes",
    request_body = QuotePayload,
    responses(
        (status = 201, description = "Devis criado com número sequencial", body = QuoteDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Número já utilizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let quote = app_state
        .quote_service
        .create(payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(quote)))
}

// GET /api/quotes/{id}
#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do devis")),
    responses(
        (status = 200, description = "Devis com linhas", body = QuoteDetail),
        (status = 404, description = "Devis não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .get_detail(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(quote)))
}

// PUT /api/quotes/{id}
#[utoipa::path(
    put,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do devis")),
    request_body = QuotePayload,
    responses(
        (status = 200, description = "Devis atualizado e totais recalculados", body = QuoteDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Devis aceito ou já faturado"),
        (status = 404, description = "Devis não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let quote = app_state
        .quote_service
        .update(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(quote)))
}

// POST /api/quotes/{id}/status
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/status",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do devis")),
    request_body = QuoteStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = Quote),
        (status = 403, description = "Devis aceito ou já faturado"),
        (status = 404, description = "Devis não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_quote_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuoteStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .change_status(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(quote)))
}

// POST /api/quotes/{id}/invoice
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/invoice",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do devis")),
    responses(
        (status = 201, description = "Fatura criada; o devis passa a aceito", body = Invoice),
        (status = 404, description = "Devis não encontrado"),
        (status = 409, description = "Devis já faturado")
    ),
    security(("api_jwt" = []))
)]
pub async fn convert_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .quote_service
        .convert_to_invoice(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

// DELETE /api/quotes/{id}
#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "ID do devis")),
    responses(
        (status = 204, description = "Devis removido com linhas e fatura"),
        (status = 404, description = "Devis não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .quote_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
