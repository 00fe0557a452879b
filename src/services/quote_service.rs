// src/services/quote_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, ClientRepository, InvoiceRepository, QuoteRepository},
    models::{
        catalog::CatalogPrice,
        invoice::{Invoice, NewInvoice},
        quote::{
            NewQuoteLine, Quote, QuoteDetail, QuoteFields, QuoteLine, QuoteLinePayload,
            QuotePayload, QuoteStatus, QuoteSummary,
        },
    },
    services::{
        lifecycle,
        numbering::{next_number, DocumentKind},
        payment::opening_balance,
        pricing::{compute_totals, round_money, LineAmounts},
    },
};

/// TVA aplicada quando a linha vem do catálogo sem taxa informada.
pub const DEFAULT_VAT_PERCENT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

#[derive(Clone)]
pub struct QuoteService {
    quote_repo: QuoteRepository,
    invoice_repo: InvoiceRepository,
    client_repo: ClientRepository,
    catalog_repo: CatalogRepository,
    pool: PgPool,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Monta a linha a gravar. Uma linha com código de catálogo (`unit`) e sem
/// preço é completada pela entrada ativa do catálogo.
pub(crate) fn resolve_line(payload: QuoteLinePayload, catalog: Option<&CatalogPrice>) -> NewQuoteLine {
    let mut task = blank_to_none(payload.task);
    let mut description = blank_to_none(payload.description);
    let mut unit_price_ht = payload.unit_price_ht;
    let mut vat_percent = payload.vat_percent;

    if let (Some(entry), None) = (catalog, unit_price_ht) {
        unit_price_ht = Some(entry.price);
        task = Some(entry.category.as_task().to_string());
        if description.is_none() {
            description = entry.description.clone();
        }
        if vat_percent.is_none() {
            vat_percent = Some(DEFAULT_VAT_PERCENT);
        }
    }

    let amounts = LineAmounts::from_optional(payload.quantity, unit_price_ht, vat_percent);

    NewQuoteLine {
        task,
        vehicle: blank_to_none(payload.vehicle),
        description,
        quantity: amounts.quantity,
        unit: blank_to_none(payload.unit),
        unit_price_ht: amounts.unit_price_ht,
        vat_percent: amounts.vat_percent,
        total_ttc: amounts.total_ttc(),
    }
}

impl QuoteService {
    pub fn new(
        quote_repo: QuoteRepository,
        invoice_repo: InvoiceRepository,
        client_repo: ClientRepository,
        catalog_repo: CatalogRepository,
        pool: PgPool,
    ) -> Self {
        Self { quote_repo, invoice_repo, client_repo, catalog_repo, pool }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<QuoteStatus>,
    ) -> Result<Vec<QuoteSummary>, AppError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.quote_repo.list(search, status, None).await
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<QuoteDetail, AppError> {
        let mut conn = self.pool.acquire().await?;
        let quote = self.quote_repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("devis".into()))?;

        self.build_detail(&mut conn, quote, None).await
    }

    pub async fn create(&self, mut payload: QuotePayload) -> Result<QuoteDetail, AppError> {
        let lines = payload.lines.take().unwrap_or_default();

        let mut tx = self.pool.begin().await?;

        self.ensure_client(&mut tx, payload.client_id).await?;
        let lines = self.resolve_lines(&mut tx, lines).await?;
        let fields = Self::fields_from(&payload, &lines);

        let previous = self.quote_repo.latest_number(&mut *tx).await?;
        let number = next_number(DocumentKind::Quote, previous.as_deref());

        let quote = self.quote_repo.insert(&mut *tx, &number, &fields).await?;
        let stored = self.insert_lines(&mut tx, quote.id, &lines).await?;

        tx.commit().await?;

        tracing::info!("Devis criado: {} ({}) total TTC {}", quote.number, quote.id, quote.total_ttc);

        let mut conn = self.pool.acquire().await?;
        self.build_detail(&mut conn, quote, Some(stored)).await
    }

    /// Edição completa. Sem `lines` no payload as linhas atuais são mantidas,
    /// mas os totais são sempre recalculados. Sem `status`, o atual é mantido.
    pub async fn update(&self, id: Uuid, mut payload: QuotePayload) -> Result<QuoteDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self.lock_quote(&mut tx, id).await?;
        let has_invoice = self.invoice_repo.find_by_quote(&mut *tx, id).await?.is_some();
        lifecycle::ensure_editable(&current.number, current.status, has_invoice)?;

        self.ensure_client(&mut tx, payload.client_id).await?;

        let lines = match payload.lines.take() {
            Some(lines) => {
                let resolved = self.resolve_lines(&mut tx, lines).await?;
                self.quote_repo.delete_lines(&mut *tx, id).await?;
                self.insert_lines(&mut tx, id, &resolved).await?;
                resolved
            }
            None => self.quote_repo
                .list_lines(&mut *tx, id)
                .await?
                .into_iter()
                .map(NewQuoteLine::from)
                .collect(),
        };

        let mut fields = Self::fields_from(&payload, &lines);
        if payload.date.is_none() {
            fields.date = current.date;
        }
        if payload.status.is_none() {
            fields.status = current.status;
        }

        let quote = self.quote_repo.update(&mut *tx, id, &fields).await?;
        tx.commit().await?;

        tracing::info!("Devis atualizado: {} ({})", quote.number, quote.id);

        let mut conn = self.pool.acquire().await?;
        self.build_detail(&mut conn, quote, None).await
    }

    pub async fn change_status(&self, id: Uuid, requested: QuoteStatus) -> Result<Quote, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self.lock_quote(&mut tx, id).await?;
        let has_invoice = self.invoice_repo.find_by_quote(&mut *tx, id).await?.is_some();
        let status = lifecycle::apply_status_change(&current.number, current.status, has_invoice, requested)?;

        let quote = self.quote_repo.set_status(&mut *tx, id, status).await?;
        tx.commit().await?;

        tracing::info!("Devis {}: {} -> {}", quote.number, current.status.label(), quote.status.label());
        Ok(quote)
    }

    /// Remove o devis, as linhas e a fatura vinculada (se houver).
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let quote = self.lock_quote(&mut tx, id).await?;

        let invoices = self.invoice_repo.delete_by_quote(&mut *tx, id).await?;
        self.quote_repo.delete_lines(&mut *tx, id).await?;
        self.quote_repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        if invoices > 0 {
            tracing::warn!("Devis removido junto com a fatura: {} ({})", quote.number, id);
        } else {
            tracing::info!("Devis removido: {} ({})", quote.number, id);
        }
        Ok(())
    }

    /// Converte o devis em fatura: uma única vez, e o devis passa a "accepted".
    pub async fn convert_to_invoice(&self, id: Uuid) -> Result<Invoice, AppError> {
        let mut tx = self.pool.begin().await?;

        let quote = self.lock_quote(&mut tx, id).await?;
        let has_invoice = self.invoice_repo.find_by_quote(&mut *tx, id).await?.is_some();
        let status = lifecycle::ensure_convertible(&quote.number, has_invoice)?;

        let previous = self.invoice_repo.latest_number(&mut *tx).await?;
        let number = next_number(DocumentKind::Invoice, previous.as_deref());

        let today = Utc::now().date_naive();
        let (balance, payment_state, payment_date) = opening_balance(quote.total_ttc, quote.deposit, today);

        let new_invoice = NewInvoice {
            number,
            date: today,
            quote_id: quote.id,
            client_id: quote.client_id,
            amount_ttc: balance.amount_ttc,
            deposit: balance.deposit,
            remaining: balance.remaining,
            payment_state,
            payment_date,
        };

        let invoice = self.invoice_repo
            .insert(&mut *tx, &new_invoice)
            .await
            .map_err(|e| match e {
                AppError::InvoiceAlreadyExists(_) => AppError::InvoiceAlreadyExists(quote.number.clone()),
                other => other,
            })?;
        self.quote_repo.set_status(&mut *tx, quote.id, status).await?;

        tx.commit().await?;

        tracing::info!(
            "Devis {} convertido na fatura {} (TTC {}, restante {})",
            quote.number, invoice.number, invoice.amount_ttc, invoice.remaining
        );
        Ok(invoice)
    }

    // --- Auxiliares ---

    async fn lock_quote(&self, conn: &mut PgConnection, id: Uuid) -> Result<Quote, AppError> {
        self.quote_repo
            .lock_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("devis".into()))
    }

    async fn ensure_client(&self, conn: &mut PgConnection, client_id: Uuid) -> Result<(), AppError> {
        self.client_repo
            .find_by_id(&mut *conn, client_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::ResourceNotFound("client".into()))
    }

    async fn resolve_lines(
        &self,
        conn: &mut PgConnection,
        lines: Vec<QuoteLinePayload>,
    ) -> Result<Vec<NewQuoteLine>, AppError> {
        let mut resolved = Vec::with_capacity(lines.len());
        for line in lines {
            let code = line
                .unit
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty());

            let entry = match (code, line.unit_price_ht) {
                (Some(code), None) => self.catalog_repo.find_active_by_code(&mut *conn, code).await?,
                _ => None,
            };
            resolved.push(resolve_line(line, entry.as_ref()));
        }
        Ok(resolved)
    }

    async fn insert_lines(
        &self,
        conn: &mut PgConnection,
        quote_id: Uuid,
        lines: &[NewQuoteLine],
    ) -> Result<Vec<QuoteLine>, AppError> {
        let mut stored = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            let position = index as i32 + 1;
            stored.push(self.quote_repo.insert_line(&mut *conn, quote_id, position, line).await?);
        }
        Ok(stored)
    }

    // As linhas já vêm na escala das colunas; a remise é arredondada aqui
    fn fields_from(payload: &QuotePayload, lines: &[NewQuoteLine]) -> QuoteFields {
        let discount_percent = round_money(payload.discount_percent);
        let amounts: Vec<LineAmounts> = lines
            .iter()
            .map(|l| LineAmounts::new(l.quantity, l.unit_price_ht, l.vat_percent))
            .collect();
        let totals = compute_totals(&amounts, discount_percent);

        QuoteFields {
            date: payload.date.unwrap_or_else(|| Utc::now().date_naive()),
            client_id: payload.client_id,
            serial_number: blank_to_none(payload.serial_number.clone()),
            inventory: blank_to_none(payload.inventory.clone()),
            status: payload.status.unwrap_or_default(),
            validity_days: payload.validity_days,
            discount_percent,
            deposit: round_money(payload.deposit),
            total_ht: totals.total_ht,
            total_ttc: totals.total_ttc,
        }
    }

    async fn build_detail(
        &self,
        conn: &mut PgConnection,
        quote: Quote,
        lines: Option<Vec<QuoteLine>>,
    ) -> Result<QuoteDetail, AppError> {
        let lines = match lines {
            Some(lines) => lines,
            None => self.quote_repo.list_lines(&mut *conn, quote.id).await?,
        };
        let invoice_id = self.invoice_repo
            .find_by_quote(&mut *conn, quote.id)
            .await?
            .map(|invoice| invoice.id);
        let client_name = self.client_repo
            .find_by_id(&mut *conn, quote.client_id)
            .await?
            .map(|client| client.name)
            .unwrap_or_default();

        Ok(QuoteDetail {
            valid_until: quote.valid_until(),
            editable: lifecycle::is_editable(quote.status, invoice_id.is_some()),
            client_name,
            lines,
            invoice_id,
            quote,
        })
    }
}

impl From<QuoteLine> for NewQuoteLine {
    fn from(line: QuoteLine) -> Self {
        Self {
            task: line.task,
            vehicle: line.vehicle,
            description: line.description,
            quantity: line.quantity,
            unit: line.unit,
            unit_price_ht: line.unit_price_ht,
            vat_percent: line.vat_percent,
            total_ttc: line.total_ttc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::CatalogCategory;

    fn catalog_entry() -> CatalogPrice {
        CatalogPrice {
            id: Uuid::new_v4(),
            code: "T3".into(),
            category: CatalogCategory::TolerieCarrosserie,
            description: Some("Redressage aile avant".into()),
            price: Decimal::new(12000, 2),
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn catalog_fills_price_task_description_and_default_vat() {
        let payload = QuoteLinePayload {
            unit: Some("T3".into()),
            quantity: Some(Decimal::new(2, 0)),
            ..Default::default()
        };

        let line = resolve_line(payload, Some(&catalog_entry()));
        assert_eq!(line.unit_price_ht, Decimal::new(120, 0));
        assert_eq!(line.task.as_deref(), Some("TOLERIE_CARROSSERIE"));
        assert_eq!(line.description.as_deref(), Some("Redressage aile avant"));
        assert_eq!(line.vat_percent, DEFAULT_VAT_PERCENT);
        // 2 x 120 x 1.20
        assert_eq!(line.total_ttc, Decimal::new(288, 0));
    }

    #[test]
    fn typed_values_win_over_the_catalog() {
        let payload = QuoteLinePayload {
            unit: Some("T3".into()),
            description: Some("Aile arrière".into()),
            vat_percent: Some(Decimal::new(10, 0)),
            ..Default::default()
        };

        let line = resolve_line(payload, Some(&catalog_entry()));
        assert_eq!(line.description.as_deref(), Some("Aile arrière"));
        assert_eq!(line.vat_percent, Decimal::new(10, 0));
        assert_eq!(line.quantity, Decimal::ONE);
    }

    #[test]
    fn lines_without_catalog_use_numeric_defaults() {
        let payload = QuoteLinePayload {
            unit: Some("  ".into()),
            description: Some("Main d'oeuvre".into()),
            ..Default::default()
        };

        let line = resolve_line(payload, None);
        assert_eq!(line.unit, None);
        assert_eq!(line.quantity, Decimal::ONE);
        assert_eq!(line.unit_price_ht, Decimal::ZERO);
        assert_eq!(line.vat_percent, Decimal::ZERO);
        assert_eq!(line.total_ttc, Decimal::ZERO);
    }

    fn quote_payload(discount_percent: Decimal) -> QuotePayload {
        QuotePayload {
            client_id: Uuid::new_v4(),
            date: None,
            serial_number: None,
            inventory: None,
            validity_days: 30,
            discount_percent,
            deposit: Decimal::new(100005, 3),
            status: None,
            lines: None,
        }
    }

    #[test]
    fn totals_can_be_recomputed_from_the_stored_lines() {
        let line = resolve_line(
            QuoteLinePayload {
                quantity: Some(Decimal::new(1000, 0)),
                unit_price_ht: Some(Decimal::new(10005, 3)),
                vat_percent: Some(Decimal::new(55, 1)),
                ..Default::default()
            },
            None,
        );
        assert_eq!(line.unit_price_ht, Decimal::new(1001, 2));

        let payload = quote_payload(Decimal::new(12345, 3));
        let fields = QuoteService::fields_from(&payload, std::slice::from_ref(&line));
        assert_eq!(fields.discount_percent, Decimal::new(1235, 2));
        assert_eq!(fields.deposit, Decimal::new(10001, 2));
        assert_eq!(fields.status, QuoteStatus::Draft);

        // Linha relida do banco: NUMERIC(12,3) / NUMERIC(12,2) / NUMERIC(5,2)
        let stored = LineAmounts::new(
            line.quantity.round_dp(3),
            line.unit_price_ht.round_dp(2),
            line.vat_percent.round_dp(2),
        );
        let reloaded = compute_totals(&[stored], fields.discount_percent.round_dp(2));
        assert_eq!(reloaded.total_ht, fields.total_ht);
        assert_eq!(reloaded.total_ttc, fields.total_ttc);

        let undiscounted = QuoteService::fields_from(&quote_payload(Decimal::ZERO), &[line]);
        assert_eq!(undiscounted.total_ht, Decimal::new(1001000, 2));
    }

    #[test]
    fn a_quote_without_lines_has_zero_totals() {
        let fields = QuoteService::fields_from(&quote_payload(Decimal::new(10, 0)), &[]);
        assert_eq!(fields.total_ht, Decimal::ZERO);
        assert_eq!(fields.total_ttc, Decimal::ZERO);
    }
}
