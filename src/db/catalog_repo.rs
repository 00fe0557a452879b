// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::catalog::{CatalogCategory, CatalogPrice, CatalogPricePayload},
};

const CATALOG_COLUMNS: &str = "id, code, category, description, price, active, created_at";

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        category: Option<CatalogCategory>,
        active_only: bool,
    ) -> Result<Vec<CatalogPrice>, AppError> {
        let sql = format!(
            r#"
            SELECT {CATALOG_COLUMNS}
            FROM catalog_prices
            WHERE ($1::catalog_category IS NULL OR category = $1)
              AND ($2 = FALSE OR active = TRUE)
            ORDER BY category ASC, code ASC
            "#
        );

        let prices = sqlx::query_as::<_, CatalogPrice>(&sql)
            .bind(category)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?;

        Ok(prices)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CatalogPrice>, AppError> {
        let sql = format!("SELECT {CATALOG_COLUMNS} FROM catalog_prices WHERE id = $1");
        let price = sqlx::query_as::<_, CatalogPrice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(price)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<CatalogPrice>, AppError> {
        let sql = format!("SELECT {CATALOG_COLUMNS} FROM catalog_prices WHERE code = $1");
        let price = sqlx::query_as::<_, CatalogPrice>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(price)
    }

    /// Preço ativo para o código, usado no preenchimento das linhas de devis.
    pub async fn find_active_by_code<'e, E>(
        &self,
        executor: E,
        code: &str,
    ) -> Result<Option<CatalogPrice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CATALOG_COLUMNS} FROM catalog_prices WHERE code = $1 AND active = TRUE"
        );
        let price = sqlx::query_as::<_, CatalogPrice>(&sql)
            .bind(code)
            .fetch_optional(executor)
            .await?;

        Ok(price)
    }

    pub async fn create(&self, payload: &CatalogPricePayload) -> Result<CatalogPrice, AppError> {
        let sql = format!(
            r#"
            INSERT INTO catalog_prices (code, category, description, price, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CATALOG_COLUMNS}
            "#
        );

        sqlx::query_as::<_, CatalogPrice>(&sql)
            .bind(&payload.code)
            .bind(payload.category)
            .bind(&payload.description)
            .bind(payload.price)
            .bind(payload.active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, |_| AppError::CatalogCodeAlreadyExists(payload.code.clone())))
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &CatalogPricePayload,
    ) -> Result<Option<CatalogPrice>, AppError> {
        let sql = format!(
            r#"
            UPDATE catalog_prices
            SET code = $2, category = $3, description = $4, price = $5, active = $6
            WHERE id = $1
            RETURNING {CATALOG_COLUMNS}
            "#
        );

        sqlx::query_as::<_, CatalogPrice>(&sql)
            .bind(id)
            .bind(&payload.code)
            .bind(payload.category)
            .bind(&payload.description)
            .bind(payload.price)
            .bind(payload.active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, |_| AppError::CatalogCodeAlreadyExists(payload.code.clone())))
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM catalog_prices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
