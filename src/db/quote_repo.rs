// src/db/quote_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::quote::{NewQuoteLine, Quote, QuoteFields, QuoteLine, QuoteStatus, QuoteSummary},
};

const QUOTE_COLUMNS: &str = "id, number, date, client_id, serial_number, inventory, status, \
     validity_days, total_ht, total_ttc, discount_percent, deposit, created_at, updated_at";

const LINE_COLUMNS: &str = "id, quote_id, task, vehicle, description, quantity, unit, \
     unit_price_ht, vat_percent, total_ttc, position";

#[derive(Clone)]
pub struct QuoteRepository {
    pool: PgPool,
}

impl QuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    /// Devis mais recentes primeiro. `limit` é usado pelo dashboard.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<QuoteStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<QuoteSummary>, AppError> {
        let quotes = sqlx::query_as::<_, QuoteSummary>(
            r#"
            SELECT q.id, q.number, q.date, q.client_id, c.name AS client_name,
                   q.status, q.total_ttc, q.created_at
            FROM quotes q
            JOIN clients c ON c.id = q.client_id
            WHERE ($1::text IS NULL
                   OR q.number ILIKE '%' || $1 || '%'
                   OR c.name ILIKE '%' || $1 || '%')
              AND ($2::quote_status IS NULL OR q.status = $2)
            ORDER BY q.created_at DESC, q.id DESC
            LIMIT $3
            "#,
        )
        .bind(search)
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(quotes)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = $1");
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(quote)
    }

    /// Carrega o devis travando a linha até o fim da transação.
    pub async fn lock_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = $1 FOR UPDATE");
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(quote)
    }

    pub async fn list_lines<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Vec<QuoteLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {LINE_COLUMNS} FROM quote_lines WHERE quote_id = $1 ORDER BY position ASC"
        );
        let lines = sqlx::query_as::<_, QuoteLine>(&sql)
            .bind(quote_id)
            .fetch_all(executor)
            .await?;

        Ok(lines)
    }

    /// Número do último devis criado (base da numeração).
    pub async fn latest_number<'e, E>(&self, executor: E) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let number = sqlx::query_scalar::<_, String>(
            "SELECT number FROM quotes ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(executor)
        .await?;

        Ok(number)
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn insert<'e, E>(&self, executor: E, number: &str, fields: &QuoteFields) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO quotes (
                number, date, client_id, serial_number, inventory, status,
                validity_days, discount_percent, deposit, total_ht, total_ttc
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {QUOTE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Quote>(&sql)
            .bind(number)
            .bind(fields.date)
            .bind(fields.client_id)
            .bind(&fields.serial_number)
            .bind(&fields.inventory)
            .bind(fields.status)
            .bind(fields.validity_days)
            .bind(fields.discount_percent)
            .bind(fields.deposit)
            .bind(fields.total_ht)
            .bind(fields.total_ttc)
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, |_| AppError::DocumentNumberConflict(number.to_string())))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, fields: &QuoteFields) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE quotes
            SET date = $2, client_id = $3, serial_number = $4, inventory = $5,
                status = $6, validity_days = $7, discount_percent = $8, deposit = $9,
                total_ht = $10, total_ttc = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING {QUOTE_COLUMNS}
            "#
        );

        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .bind(fields.date)
            .bind(fields.client_id)
            .bind(&fields.serial_number)
            .bind(&fields.inventory)
            .bind(fields.status)
            .bind(fields.validity_days)
            .bind(fields.discount_percent)
            .bind(fields.deposit)
            .bind(fields.total_ht)
            .bind(fields.total_ttc)
            .fetch_one(executor)
            .await?;

        Ok(quote)
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: QuoteStatus) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE quotes SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {QUOTE_COLUMNS}"
        );
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .bind(status)
            .fetch_one(executor)
            .await?;

        Ok(quote)
    }

    pub async fn insert_line<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        position: i32,
        line: &NewQuoteLine,
    ) -> Result<QuoteLine, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO quote_lines (
                quote_id, task, vehicle, description, quantity, unit,
                unit_price_ht, vat_percent, total_ttc, position
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {LINE_COLUMNS}
            "#
        );

        let line = sqlx::query_as::<_, QuoteLine>(&sql)
            .bind(quote_id)
            .bind(&line.task)
            .bind(&line.vehicle)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(&line.unit)
            .bind(line.unit_price_ht)
            .bind(line.vat_percent)
            .bind(line.total_ttc)
            .bind(position)
            .fetch_one(executor)
            .await?;

        Ok(line)
    }

    pub async fn delete_lines<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quote_lines WHERE quote_id = $1")
            .bind(quote_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // --- Cascata a partir do cliente ---

    pub async fn delete_lines_by_client<'e, E>(&self, executor: E, client_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM quote_lines WHERE quote_id IN (SELECT id FROM quotes WHERE client_id = $1)",
        )
        .bind(client_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_by_client<'e, E>(&self, executor: E, client_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quotes WHERE client_id = $1")
            .bind(client_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
