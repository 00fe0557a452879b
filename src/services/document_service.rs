// src/services/document_service.rs

use chrono::NaiveDate;
use genpdf::{elements, style, Alignment, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, InvoiceRepository, QuoteRepository, SettingsRepository},
    models::{
        catalog::CatalogCategory,
        client::Client,
        invoice::{Invoice, PaymentState},
        quote::{Quote, QuoteLine},
        settings::CompanyConfig,
    },
    services::{
        numbering::QUOTE_PREFIX,
        payment::PAID_TOLERANCE,
        pricing::{compute_totals, round_money, LineAmounts},
    },
};

// Limites do formato EPC (QR de transferência SEPA)
const EPC_NAME_MAX: usize = 70;
const EPC_TEXT_MAX: usize = 140;

/// PDF gerado, com o nome de arquivo sugerido para download.
pub struct PdfDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct DocumentService {
    quote_repo: QuoteRepository,
    invoice_repo: InvoiceRepository,
    client_repo: ClientRepository,
    settings_repo: SettingsRepository,
    pool: PgPool,
    fonts_dir: String,
    font_family: String,
}

// =========================================================================
//  FORMATAÇÃO
// =========================================================================

/// "1234.5" -> "1 234,50 €"
pub fn format_eur(value: Decimal) -> String {
    let rounded = round_money(value);
    let raw = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{},{} €", sign, grouped, frac_part)
}

/// "5.50" -> "5,5 %"
pub fn format_percent(value: Decimal) -> String {
    format!("{} %", value.normalize().to_string().replace('.', ","))
}

// Tarefas vindas do catálogo aparecem com o rótulo da categoria
fn task_label(task: Option<&str>) -> String {
    match task {
        Some(task) => CatalogCategory::from_task(task)
            .map(|category| category.label().to_string())
            .unwrap_or_else(|| task.to_string()),
        None => String::new(),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Nome de arquivo ASCII (o "N°" não é aceito em cabeçalhos HTTP).
pub fn pdf_filename(label: &str, number: &str) -> String {
    let cleaned: String = number
        .replace(QUOTE_PREFIX, "")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if cleaned.is_empty() {
        format!("{}.pdf", label)
    } else {
        format!("{}_{}.pdf", label, cleaned)
    }
}

/// Conteúdo do QR code EPC (SEPA Credit Transfer, versão 002).
pub fn epc_payload(bic: Option<&str>, name: &str, iban: &str, amount: Decimal, text: &str) -> String {
    let iban: String = iban.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_uppercase();
    let bic = bic.map(|b| b.trim().to_uppercase()).unwrap_or_default();
    let name: String = name.trim().chars().take(EPC_NAME_MAX).collect();
    let text: String = text.chars().take(EPC_TEXT_MAX).collect();

    format!(
        "BCD\n002\n1\nSCT\n{}\n{}\n{}\nEUR{:.2}\n\n\n{}",
        bic,
        name,
        iban,
        round_money(amount),
        text
    )
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Falha ao gerar o PDF: {}", e))
}

pub fn load_font_family(
    fonts_dir: &str,
    font_family: &str,
) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, AppError> {
    genpdf::fonts::from_files(fonts_dir, font_family, None)
        .map_err(|_| AppError::FontNotFound(format!("{} em {}", font_family, fonts_dir)))
}

// =========================================================================
//  BLOCOS DO DOCUMENTO
// =========================================================================

fn small() -> style::Style {
    style::Style::new().with_font_size(9)
}

fn right(text: impl Into<String>) -> elements::Paragraph {
    let mut paragraph = elements::Paragraph::new(text.into());
    paragraph.set_alignment(Alignment::Right);
    paragraph
}

fn push_company_header(doc: &mut genpdf::Document, company: &CompanyConfig) {
    if let Some(path) = company.logo_path.as_deref() {
        match elements::Image::from_path(path) {
            Ok(logo) => doc.push(logo.with_scale(genpdf::Scale::new(0.5, 0.5))),
            Err(e) => tracing::warn!("Logo não carregado ({}): {}", path, e),
        }
    }

    let name = if company.company_name.is_empty() { "Mon entreprise" } else { company.company_name.as_str() };
    doc.push(elements::Paragraph::new(name).styled(style::Style::new().bold().with_font_size(16)));

    for line in [company.address.clone(), company.locality()].into_iter().flatten() {
        doc.push(elements::Paragraph::new(line).styled(small()));
    }
    if let Some(phone) = &company.phone {
        doc.push(elements::Paragraph::new(format!("Tél : {}", phone)).styled(small()));
    }
    if let Some(email) = &company.email {
        doc.push(elements::Paragraph::new(format!("Email : {}", email)).styled(small()));
    }
    if let Some(siret) = &company.siret {
        doc.push(elements::Paragraph::new(format!("SIRET : {}", siret)).styled(small()));
    }
    if let Some(vat) = &company.vat_number {
        doc.push(elements::Paragraph::new(format!("TVA intracommunautaire : {}", vat)).styled(small()));
    }
}

fn push_client_block(doc: &mut genpdf::Document, client: &Client) {
    doc.push(elements::Paragraph::new("Client").styled(style::Style::new().bold()));
    doc.push(elements::Paragraph::new(client.name.clone()));

    let locality = match (client.postal_code.as_deref(), client.city.as_deref()) {
        (Some(cp), Some(city)) => Some(format!("{} {}", cp, city)),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    };
    for line in [client.company.clone(), client.address.clone(), locality].into_iter().flatten() {
        doc.push(elements::Paragraph::new(line));
    }
}

fn push_vehicle_block(doc: &mut genpdf::Document, quote: &Quote) {
    if let Some(serial) = &quote.serial_number {
        doc.push(elements::Paragraph::new(format!("Immatriculation : {}", serial)));
    }
    if let Some(inventory) = &quote.inventory {
        doc.push(elements::Paragraph::new(format!("Inventaire : {}", inventory)));
    }
}

fn push_lines_table(doc: &mut genpdf::Document, lines: &[QuoteLine]) -> Result<(), AppError> {
    // Tâche, Description, Qté, Unité, P.U. HT, TVA, Total TTC
    let mut table = elements::TableLayout::new(vec![2, 5, 1, 1, 2, 1, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let bold = style::Style::new().bold().with_font_size(9);
    table
        .row()
        .element(elements::Paragraph::new("Tâche").styled(bold))
        .element(elements::Paragraph::new("Description").styled(bold))
        .element(elements::Paragraph::new("Qté").styled(bold))
        .element(elements::Paragraph::new("Unité").styled(bold))
        .element(elements::Paragraph::new("P.U. HT").styled(bold))
        .element(elements::Paragraph::new("TVA").styled(bold))
        .element(elements::Paragraph::new("Total TTC").styled(bold))
        .push()
        .map_err(pdf_error)?;

    for line in lines {
        table
            .row()
            .element(elements::Paragraph::new(task_label(line.task.as_deref())).styled(small()))
            .element(elements::Paragraph::new(line.description.clone().unwrap_or_default()).styled(small()))
            .element(elements::Paragraph::new(line.quantity.normalize().to_string()).styled(small()))
            .element(elements::Paragraph::new(line.unit.clone().unwrap_or_default()).styled(small()))
            .element(right(format_eur(line.unit_price_ht)).styled(small()))
            .element(right(format_percent(line.vat_percent)).styled(small()))
            .element(right(format_eur(line.total_ttc)).styled(small()))
            .push()
            .map_err(pdf_error)?;
    }

    doc.push(table);
    Ok(())
}

fn push_quote_totals(doc: &mut genpdf::Document, quote: &Quote, lines: &[QuoteLine]) {
    let amounts: Vec<LineAmounts> = lines
        .iter()
        .map(|l| LineAmounts::new(l.quantity, l.unit_price_ht, l.vat_percent))
        .collect();
    let totals = compute_totals(&amounts, quote.discount_percent);

    if !quote.discount_percent.is_zero() {
        doc.push(right(format!("Total HT avant remise : {}", format_eur(totals.gross_ht))));
        doc.push(right(format!(
            "Remise {} : -{}",
            format_percent(quote.discount_percent),
            format_eur(totals.discount_amount)
        )));
    }
    doc.push(right(format!("Total HT : {}", format_eur(quote.total_ht))));
    doc.push(right(format!("TVA : {}", format_eur(totals.total_vat))));
    doc.push(right(format!("Total TTC : {}", format_eur(quote.total_ttc))).styled(style::Style::new().bold()));

    if !quote.deposit.is_zero() {
        doc.push(right(format!("Acompte : {}", format_eur(quote.deposit))));
        let due = (quote.total_ttc - quote.deposit).max(Decimal::ZERO);
        doc.push(right(format!("Reste à payer : {}", format_eur(due))).styled(style::Style::new().bold()));
    }
}

fn push_footer(doc: &mut genpdf::Document, company: &CompanyConfig) {
    if let Some(notice) = &company.legal_notice {
        doc.push(elements::Break::new(2));
        doc.push(elements::Paragraph::new(notice.clone()).styled(style::Style::new().italic().with_font_size(8)));
    }
}

fn render(doc: genpdf::Document) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

impl DocumentService {
    pub fn new(
        quote_repo: QuoteRepository,
        invoice_repo: InvoiceRepository,
        client_repo: ClientRepository,
        settings_repo: SettingsRepository,
        pool: PgPool,
        fonts_dir: String,
        font_family: String,
    ) -> Self {
        Self { quote_repo, invoice_repo, client_repo, settings_repo, pool, fonts_dir, font_family }
    }

    fn new_document(&self, title: &str) -> Result<genpdf::Document, AppError> {
        let fonts = load_font_family(&self.fonts_dir, &self.font_family)?;

        let mut doc = genpdf::Document::new(fonts);
        doc.set_title(title);
        doc.set_font_size(10);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }

    async fn load_quote(&self, quote_id: Uuid) -> Result<(Quote, Vec<QuoteLine>, Client), AppError> {
        let mut conn = self.pool.acquire().await?;

        let quote = self.quote_repo
            .find_by_id(&mut *conn, quote_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("devis".into()))?;
        let lines = self.quote_repo.list_lines(&mut *conn, quote_id).await?;
        let client = self.client_repo
            .find_by_id(&mut *conn, quote.client_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("client".into()))?;

        Ok((quote, lines, client))
    }

    pub async fn generate_quote_pdf(&self, quote_id: Uuid) -> Result<PdfDocument, AppError> {
        let (quote, lines, client) = self.load_quote(quote_id).await?;
        let company = self.settings_repo.get_settings().await?;

        let mut doc = self.new_document(&format!("Devis {}", quote.number))?;

        push_company_header(&mut doc, &company);
        doc.push(elements::Break::new(1.5));

        doc.push(elements::Paragraph::new(format!("DEVIS {}", quote.number))
            .styled(style::Style::new().bold().with_font_size(14)));
        doc.push(elements::Paragraph::new(format!("Date : {}", format_date(quote.date))));
        doc.push(elements::Paragraph::new(format!(
            "Valable jusqu'au : {} ({} jours)",
            format_date(quote.valid_until()),
            quote.validity_days
        )));
        doc.push(elements::Break::new(1));

        push_client_block(&mut doc, &client);
        push_vehicle_block(&mut doc, &quote);
        doc.push(elements::Break::new(1.5));

        push_lines_table(&mut doc, &lines)?;
        doc.push(elements::Break::new(1));
        push_quote_totals(&mut doc, &quote, &lines);

        doc.push(elements::Break::new(2));
        doc.push(elements::Paragraph::new("Bon pour accord, date et signature :").styled(small()));

        push_footer(&mut doc, &company);

        Ok(PdfDocument {
            filename: pdf_filename("Devis", &quote.number),
            bytes: render(doc)?,
        })
    }

    pub async fn generate_invoice_pdf(&self, invoice_id: Uuid) -> Result<PdfDocument, AppError> {
        let invoice = self.invoice_repo
            .find_by_id(&self.pool, invoice_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("facture".into()))?;
        let (quote, lines, client) = self.load_quote(invoice.quote_id).await?;
        let company = self.settings_repo.get_settings().await?;

        let mut doc = self.new_document(&format!("Facture {}", invoice.number))?;

        push_company_header(&mut doc, &company);
        doc.push(elements::Break::new(1.5));

        doc.push(elements::Paragraph::new(format!("FACTURE N° {}", invoice.number))
            .styled(style::Style::new().bold().with_font_size(14)));
        doc.push(elements::Paragraph::new(format!("Date : {}", format_date(invoice.date))));
        doc.push(elements::Paragraph::new(format!("Devis d'origine : {}", quote.number)));
        doc.push(elements::Break::new(1));

        push_client_block(&mut doc, &client);
        push_vehicle_block(&mut doc, &quote);
        doc.push(elements::Break::new(1.5));

        push_lines_table(&mut doc, &lines)?;
        doc.push(elements::Break::new(1));

        doc.push(right(format!("Total HT : {}", format_eur(quote.total_ht))));
        doc.push(right(format!("Total TTC : {}", format_eur(invoice.amount_ttc))).styled(style::Style::new().bold()));
        if !invoice.deposit.is_zero() {
            doc.push(right(format!("Déjà réglé : {}", format_eur(invoice.deposit))));
        }
        doc.push(right(format!("Reste à payer : {}", format_eur(invoice.remaining))).styled(style::Style::new().bold()));

        doc.push(elements::Break::new(1));
        self.push_payment_block(&mut doc, &invoice, &company)?;

        push_footer(&mut doc, &company);

        Ok(PdfDocument {
            filename: pdf_filename("Facture", &invoice.number),
            bytes: render(doc)?,
        })
    }

    fn push_payment_block(
        &self,
        doc: &mut genpdf::Document,
        invoice: &Invoice,
        company: &CompanyConfig,
    ) -> Result<(), AppError> {
        doc.push(elements::Paragraph::new(format!("État : {}", invoice.payment_state.label())));

        if invoice.payment_state == PaymentState::Paid {
            if let Some(method) = invoice.payment_method {
                doc.push(elements::Paragraph::new(format!("Mode de paiement : {}", method.label())));
            }
            if let Some(date) = invoice.payment_date {
                doc.push(elements::Paragraph::new(format!("Payée le {}", format_date(date))));
            }
            return Ok(());
        }

        let Some(iban) = company.iban.as_deref() else {
            return Ok(());
        };

        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new("PAIEMENT PAR VIREMENT")
            .styled(style::Style::new().bold().with_font_size(11)));
        if let Some(bank) = &company.bank_name {
            doc.push(elements::Paragraph::new(format!("Banque : {}", bank)));
        }
        doc.push(elements::Paragraph::new(format!("IBAN : {}", iban)));
        if let Some(bic) = &company.bic {
            doc.push(elements::Paragraph::new(format!("BIC : {}", bic)));
        }

        if invoice.remaining > PAID_TOLERANCE {
            let payload = epc_payload(
                company.bic.as_deref(),
                &company.company_name,
                iban,
                invoice.remaining,
                &format!("Facture {}", invoice.number),
            );

            let code = QrCode::new(payload.as_bytes()).map_err(pdf_error)?;
            let image_buffer = code.render::<Luma<u8>>().build();
            let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

            let qr_image = elements::Image::from_dynamic_image(dynamic_image)
                .map_err(pdf_error)?
                .with_scale(genpdf::Scale::new(0.5, 0.5));

            doc.push(elements::Break::new(0.5));
            doc.push(qr_image);
            doc.push(elements::Paragraph::new("Scannez pour payer").styled(small()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_euro_amounts_the_french_way() {
        assert_eq!(format_eur(Decimal::new(26550, 2)), "265,50 €");
        assert_eq!(format_eur(Decimal::new(123456, 2)), "1 234,56 €");
        assert_eq!(format_eur(Decimal::new(1000000, 0)), "1 000 000,00 €");
        assert_eq!(format_eur(Decimal::ZERO), "0,00 €");
        assert_eq!(format_eur(Decimal::new(-2505, 2)), "-25,05 €");
    }

    #[test]
    fn formats_percentages_without_trailing_zeros() {
        assert_eq!(format_percent(Decimal::new(2000, 2)), "20 %");
        assert_eq!(format_percent(Decimal::new(550, 2)), "5,5 %");
    }

    #[test]
    fn catalog_tasks_use_category_labels() {
        assert_eq!(task_label(Some("DEBOSSELAGE")), "Débosselage");
        assert_eq!(task_label(Some("Peinture")), "Peinture");
        assert_eq!(task_label(None), "");
    }

    #[test]
    fn filenames_are_plain_ascii() {
        assert_eq!(pdf_filename("Devis", "N°007"), "Devis_007.pdf");
        assert_eq!(pdf_filename("Facture", "012"), "Facture_012.pdf");
        assert_eq!(pdf_filename("Facture", "°"), "Facture.pdf");
    }

    #[test]
    fn epc_payload_follows_the_sepa_layout() {
        let payload = epc_payload(
            Some("agrifrpp"),
            "MB Carrosserie",
            "FR76 3000 6000 0112 3456 7890 189",
            Decimal::new(16550, 2),
            "Facture 001",
        );

        let fields: Vec<&str> = payload.split('\n').collect();
        assert_eq!(fields.len(), 11);
        assert_eq!(&fields[..4], &["BCD", "002", "1", "SCT"]);
        assert_eq!(fields[4], "AGRIFRPP");
        assert_eq!(fields[5], "MB Carrosserie");
        assert_eq!(fields[6], "FR7630006000011234567890189");
        assert_eq!(fields[7], "EUR165.50");
        assert_eq!(fields[10], "Facture 001");
    }

    #[test]
    fn missing_fonts_are_reported() {
        let err = load_font_family("/nonexistent/fonts", "Roboto").err();
        assert!(matches!(err, Some(AppError::FontNotFound(_))));
    }
}
