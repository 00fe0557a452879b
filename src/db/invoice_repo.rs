// src/db/invoice_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::invoice::{Invoice, InvoiceSummary, NewInvoice, PaymentState},
    services::payment::PaymentOutcome,
};

const INVOICE_COLUMNS: &str = "id, number, date, quote_id, client_id, amount_ttc, deposit, \
     remaining, payment_state, payment_method, payment_date, created_at";

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        state: Option<PaymentState>,
    ) -> Result<Vec<InvoiceSummary>, AppError> {
        let invoices = sqlx::query_as::<_, InvoiceSummary>(
            r#"
            SELECT i.id, i.number, i.date, i.client_id, c.name AS client_name,
                   q.number AS quote_number, i.amount_ttc, i.remaining,
                   i.payment_state, i.created_at
            FROM invoices i
            JOIN clients c ON c.id = i.client_id
            JOIN quotes q ON q.id = i.quote_id
            WHERE ($1::text IS NULL
                   OR i.number ILIKE '%' || $1 || '%'
                   OR c.name ILIKE '%' || $1 || '%')
              AND ($2::payment_state IS NULL OR i.payment_state = $2)
            ORDER BY i.created_at DESC, i.id DESC
            "#,
        )
        .bind(search)
        .bind(state)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(invoice)
    }

    pub async fn lock_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1 FOR UPDATE");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(invoice)
    }

    pub async fn find_by_quote<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE quote_id = $1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(quote_id)
            .fetch_optional(executor)
            .await?;

        Ok(invoice)
    }

    /// Nome do cliente e número do devis de origem, para o detalhe e o PDF.
    pub async fn find_references<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<(String, String)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let refs = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT c.name, q.number
            FROM invoices i
            JOIN clients c ON c.id = i.client_id
            JOIN quotes q ON q.id = i.quote_id
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(refs)
    }

    pub async fn latest_number<'e, E>(&self, executor: E) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let number = sqlx::query_scalar::<_, String>(
            "SELECT number FROM invoices ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(executor)
        .await?;

        Ok(number)
    }

    pub async fn insert<'e, E>(&self, executor: E, new: &NewInvoice) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO invoices (
                number, date, quote_id, client_id, amount_ttc, deposit,
                remaining, payment_state, payment_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Invoice>(&sql)
            .bind(&new.number)
            .bind(new.date)
            .bind(new.quote_id)
            .bind(new.client_id)
            .bind(new.amount_ttc)
            .bind(new.deposit)
            .bind(new.remaining)
            .bind(new.payment_state)
            .bind(new.payment_date)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                map_unique_violation(e, |constraint| match constraint {
                    "invoices_quote_id_key" => AppError::InvoiceAlreadyExists(new.quote_id.to_string()),
                    "invoices_number_key" => AppError::DocumentNumberConflict(new.number.clone()),
                    other => AppError::UniqueConstraintViolation(other.to_string()),
                })
            })
    }

    /// Grava o resultado de um pagamento. Método e data só mudam quando
    /// vêm preenchidos (pagamento que quita a fatura).
    pub async fn apply_payment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        outcome: &PaymentOutcome,
    ) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE invoices
            SET deposit = $2,
                remaining = $3,
                payment_state = $4,
                payment_method = COALESCE($5, payment_method),
                payment_date = COALESCE($6, payment_date)
            WHERE id = $1
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .bind(outcome.deposit)
            .bind(outcome.remaining)
            .bind(outcome.state)
            .bind(outcome.method)
            .bind(outcome.paid_on)
            .fetch_one(executor)
            .await?;

        Ok(invoice)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_by_quote<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM invoices WHERE quote_id = $1")
            .bind(quote_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_by_client<'e, E>(&self, executor: E, client_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM invoices WHERE client_id = $1")
            .bind(client_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
