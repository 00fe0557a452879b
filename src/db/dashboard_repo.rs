// src/db/dashboard_repo.rs

use sqlx::PgPool;

use crate::common::error::AppError;

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Contadores da página inicial: (clientes, devis, faturas)
    pub async fn get_counts(&self) -> Result<(i64, i64, i64), AppError> {
        let counts = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM clients),
                (SELECT COUNT(*) FROM quotes),
                (SELECT COUNT(*) FROM invoices)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}
