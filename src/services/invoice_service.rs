// src/services/invoice_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InvoiceRepository,
    models::invoice::{Invoice, InvoiceDetail, InvoiceSummary, PaymentState, RecordPaymentPayload},
    services::payment::{self, InvoiceBalance},
};

#[derive(Clone)]
pub struct InvoiceService {
    invoice_repo: InvoiceRepository,
    pool: PgPool,
}

impl InvoiceService {
    pub fn new(invoice_repo: InvoiceRepository, pool: PgPool) -> Self {
        Self { invoice_repo, pool }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        state: Option<PaymentState>,
    ) -> Result<Vec<InvoiceSummary>, AppError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.invoice_repo.list(search, state).await
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<InvoiceDetail, AppError> {
        let mut conn = self.pool.acquire().await?;

        let invoice = self.invoice_repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("facture".into()))?;
        let (client_name, quote_number) = self.invoice_repo
            .find_references(&mut *conn, id)
            .await?
            .unwrap_or_default();

        Ok(InvoiceDetail { invoice, client_name, quote_number })
    }

    /// Registra um pagamento (parcial ou total) na fatura.
    pub async fn record_payment(&self, id: Uuid, payload: RecordPaymentPayload) -> Result<Invoice, AppError> {
        // Valor inválido não chega a abrir transação
        let amount = payment::ensure_positive(payload.amount)?;

        let mut tx = self.pool.begin().await?;

        let current = self.invoice_repo
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("facture".into()))?;

        let balance = InvoiceBalance {
            amount_ttc: current.amount_ttc,
            deposit: current.deposit,
            remaining: current.remaining,
        };
        let outcome = payment::apply_payment(balance, amount, payload.method, Utc::now().date_naive())?;

        let invoice = self.invoice_repo.apply_payment(&mut *tx, id, &outcome).await?;
        tx.commit().await?;

        match invoice.payment_state {
            PaymentState::Paid => tracing::info!(
                "💶 Fatura {} quitada ({} por {})",
                invoice.number, amount, payload.method.label()
            ),
            _ => tracing::info!(
                "Pagamento parcial de {} na fatura {}: restam {}",
                amount, invoice.number, invoice.remaining
            ),
        }

        Ok(invoice)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let invoice = self.invoice_repo
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("facture".into()))?;
        self.invoice_repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::warn!(
            "Fatura removida: {} ({}) - TTC {} - estado {}",
            invoice.number, id, invoice.amount_ttc, invoice.payment_state.label()
        );
        Ok(())
    }
}
