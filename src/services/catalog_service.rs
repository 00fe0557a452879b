// src/services/catalog_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{CatalogCategory, CatalogPrice, CatalogPricePayload},
};

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
}

fn normalize(mut payload: CatalogPricePayload) -> CatalogPricePayload {
    payload.code = payload.code.trim().to_string();
    payload.description = payload
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    payload
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository) -> Self {
        Self { catalog_repo }
    }

    pub async fn list(
        &self,
        category: Option<CatalogCategory>,
        active_only: bool,
    ) -> Result<Vec<CatalogPrice>, AppError> {
        self.catalog_repo.list(category, active_only).await
    }

    pub async fn get(&self, id: Uuid) -> Result<CatalogPrice, AppError> {
        self.catalog_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("prix".into()))
    }

    pub async fn get_by_code(&self, code: &str) -> Result<CatalogPrice, AppError> {
        self.catalog_repo
            .find_by_code(code.trim())
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(code.to_string()))
    }

    pub async fn create(&self, payload: CatalogPricePayload) -> Result<CatalogPrice, AppError> {
        let price = self.catalog_repo.create(&normalize(payload)).await?;
        tracing::info!("Preço {} adicionado ao catálogo", price.code);
        Ok(price)
    }

    pub async fn update(&self, id: Uuid, payload: CatalogPricePayload) -> Result<CatalogPrice, AppError> {
        self.catalog_repo
            .update(id, &normalize(payload))
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("prix".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        match self.catalog_repo.delete(id).await? {
            0 => Err(AppError::ResourceNotFound("prix".into())),
            _ => Ok(()),
        }
    }
}
