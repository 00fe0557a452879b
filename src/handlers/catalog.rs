// src/handlers/catalog.rs

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
    models::catalog::{CatalogListQuery, CatalogPrice, CatalogPricePayload},
};

// GET /api/catalog
#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "Catalog",
    params(CatalogListQuery),
    responses((status = 200, description = "Preços do catálogo", body = Vec<CatalogPrice>)),
    security(("api_jwt" = []))
)]
pub async fn list_prices(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Query(query): Query<CatalogListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let prices = app_state
        .catalog_service
        .list(query.category, query.active_only)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(prices)))
}

// POST /api/catalog
#[utoipa::path(
    post,
    path = "/api/catalog",
    tag = "Catalog",
    request_body = CatalogPricePayload,
    responses(
        (status = 201, description = "Preço criado", body = CatalogPrice),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Código já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_price(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Json(payload): Json<CatalogPricePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let price = app_state
        .catalog_service
        .create(payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(price)))
}

// GET /api/catalog/code/{code}
#[utoipa::path(
    get,
    path = "/api/catalog/code/{code}",
    tag = "Catalog",
    params(("code" = String, Path, description = "Código do preço (ex: T3)")),
    responses(
        (status = 200, description = "Preço para preencher a linha do devis", body = CatalogPrice),
        (status = 404, description = "Código não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_price_by_code(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let price = app_state
        .catalog_service
        .get_by_code(&code)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(price)))
}

// GET /api/catalog/{id}
#[utoipa::path(
    get,
    path = "/api/catalog/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do preço")),
    responses(
        (status = 200, description = "Preço", body = CatalogPrice),
        (status = 404, description = "Preço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_price(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let price = app_state
        .catalog_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(price)))
}

// PUT /api/catalog/{id}
#[utoipa::path(
    put,
    path = "/api/catalog/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do preço")),
    request_body = CatalogPricePayload,
    responses(
        (status = 200, description = "Preço atualizado", body = CatalogPrice),
        (status = 404, description = "Preço não encontrado"),
        (status = 409, description = "Código já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_price(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CatalogPricePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let price = app_state
        .catalog_service
        .update(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(price)))
}

// DELETE /api/catalog/{id}
#[utoipa::path(
    delete,
    path = "/api/catalog/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do preço")),
    responses(
        (status = 204, description = "Preço removido"),
        (status = 404, description = "Preço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_price(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
