// src/models/quote.rs

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};


// --- Enums ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quote_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Refused,
}

impl QuoteStatus {
    pub fn label(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "Brouillon",
            QuoteStatus::Sent => "Envoyé",
            QuoteStatus::Accepted => "Accepté",
            QuoteStatus::Refused => "Refusé",
        }
    }
}

// --- Entidades ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    #[schema(example = "N°003")]
    pub number: String,
    #[schema(value_type = String, format = Date, example = "2025-03-14")]
    pub date: NaiveDate,
    pub client_id: Uuid,
    #[schema(example = "AB-123-CD")]
    pub serial_number: Option<String>,
    pub inventory: Option<String>,
    pub status: QuoteStatus,
    #[schema(example = 30)]
    pub validity_days: i32,
    #[schema(example = "225.00")]
    pub total_ht: Decimal,
    #[schema(example = "265.50")]
    pub total_ttc: Decimal,
    #[schema(example = "10.00")]
    pub discount_percent: Decimal,
    #[schema(example = "0.00")]
    pub deposit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn valid_until(&self) -> NaiveDate {
        let days = u64::try_from(self.validity_days).unwrap_or(0);
        self.date.checked_add_days(Days::new(days)).unwrap_or(self.date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLine {
    pub id: Uuid,
    pub quote_id: Uuid,
    #[schema(example = "TOLERIE_CARROSSERIE")]
    pub task: Option<String>,
    pub vehicle: Option<String>,
    #[schema(example = "Redressage aile avant")]
    pub description: Option<String>,
    #[schema(example = "2")]
    pub quantity: Decimal,
    // Código do catálogo (ex: T3, DS)
    #[schema(example = "T3")]
    pub unit: Option<String>,
    #[schema(example = "100.00")]
    pub unit_price_ht: Decimal,
    #[schema(example = "20")]
    pub vat_percent: Decimal,
    #[schema(example = "240.00")]
    pub total_ttc: Decimal,
    pub position: i32,
}

// Linha da listagem de devis (com o nome do cliente)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub id: Uuid,
    pub number: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub client_id: Uuid,
    pub client_name: String,
    pub status: QuoteStatus,
    pub total_ttc: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub client_name: String,
    pub lines: Vec<QuoteLine>,
    pub invoice_id: Option<Uuid>,
    #[schema(value_type = String, format = Date)]
    pub valid_until: NaiveDate,
    pub editable: bool,
}

// Valores gravados na criação e na edição (totais já calculados)
#[derive(Debug, Clone)]
pub struct QuoteFields {
    pub date: NaiveDate,
    pub client_id: Uuid,
    pub serial_number: Option<String>,
    pub inventory: Option<String>,
    pub status: QuoteStatus,
    pub validity_days: i32,
    pub discount_percent: Decimal,
    pub deposit: Decimal,
    pub total_ht: Decimal,
    pub total_ttc: Decimal,
}

// Linha pronta para inserção (após preenchimento pelo catálogo)
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuoteLine {
    pub task: Option<String>,
    pub vehicle: Option<String>,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub unit_price_ht: Decimal,
    pub vat_percent: Decimal,
    pub total_ttc: Decimal,
}

// --- Payloads ---

fn default_validity_days() -> i32 {
    30
}

fn validate_percent(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("percent_range");
        err.message = Some("La remise doit être entre 0 et 100%".into());
        return Err(err);
    }
    Ok(())
}

// Limites das colunas NUMERIC(12,3) e NUMERIC(12,2)
const MAX_QUANTITY: i64 = 1_000_000_000;
const MAX_AMOUNT: i64 = 10_000_000_000;

fn within(value: &Decimal, max: i64, code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if (value.is_sign_negative() && !value.is_zero()) || *value >= Decimal::from(max) {
        let mut err = ValidationError::new(code);
        err.message = Some(message.into());
        return Err(err);
    }
    Ok(())
}

fn validate_quantity(value: &Decimal) -> Result<(), ValidationError> {
    within(value, MAX_QUANTITY, "quantity_range", "La quantité doit être comprise entre 0 et 999 999 999")
}

fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    within(value, MAX_AMOUNT, "amount_range", "Le montant doit être compris entre 0 et 9 999 999 999,99")
}

fn validate_vat_percent(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("percent_range");
        err.message = Some("La TVA doit être entre 0 et 100%".into());
        return Err(err);
    }
    Ok(())
}

/// Linha enviada pelo formulário. Campos numéricos ausentes recebem
/// valores padrão (quantidade 1, preço 0, TVA 0) no momento do cálculo.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLinePayload {
    #[validate(length(max = 100))]
    pub task: Option<String>,
    #[validate(length(max = 20))]
    pub vehicle: Option<String>,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    #[schema(example = "2")]
    #[validate(custom(function = "validate_quantity"))]
    pub quantity: Option<Decimal>,
    #[schema(example = "T3")]
    #[validate(length(max = 20))]
    pub unit: Option<String>,
    #[schema(example = "100.00")]
    #[validate(custom(function = "validate_amount"))]
    pub unit_price_ht: Option<Decimal>,
    #[schema(example = "20")]
    #[validate(custom(function = "validate_vat_percent"))]
    pub vat_percent: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    pub client_id: Uuid,

    // Padrão: data de hoje
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-14")]
    pub date: Option<NaiveDate>,

    #[validate(length(max = 100))]
    pub serial_number: Option<String>,

    #[validate(length(max = 100))]
    pub inventory: Option<String>,

    #[serde(default = "default_validity_days")]
    #[validate(range(min = 1, message = "La validité doit être au moins 1 jour"))]
    pub validity_days: i32,

    #[serde(default)]
    #[validate(custom(function = "validate_percent"))]
    pub discount_percent: Decimal,

    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub deposit: Decimal,

    // Na edição, `None` mantém o status atual; na criação vale "draft"
    pub status: Option<QuoteStatus>,

    // Na edição, `None` mantém as linhas atuais. Um devis pode não ter linhas.
    #[validate(nested)]
    pub lines: Option<Vec<QuoteLinePayload>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteStatusPayload {
    pub status: QuoteStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct QuoteListQuery {
    /// Busca por número do devis ou nome do cliente
    pub search: Option<String>,
    pub status: Option<QuoteStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> QuotePayload {
        QuotePayload {
            client_id: Uuid::new_v4(),
            date: None,
            serial_number: None,
            inventory: None,
            validity_days: 30,
            discount_percent: Decimal::ZERO,
            deposit: Decimal::ZERO,
            status: None,
            lines: Some(vec![QuoteLinePayload::default()]),
        }
    }

    #[test]
    fn discount_must_stay_between_0_and_100() {
        let mut p = payload();
        p.discount_percent = Decimal::new(10001, 2);
        assert!(p.validate().unwrap_err().field_errors().contains_key("discount_percent"));

        p.discount_percent = Decimal::ONE_HUNDRED;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn accepts_empty_line_lists_but_not_short_validity() {
        let mut p = payload();
        p.lines = Some(vec![]);
        assert!(p.validate().is_ok());

        p.validity_days = 0;
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("validity_days"));
    }

    #[test]
    fn lines_outside_column_limits_are_rejected() {
        let mut p = payload();
        p.lines = Some(vec![QuoteLinePayload {
            quantity: Some(Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0)),
            unit_price_ht: Some(Decimal::from(100_000_000_000i64)),
            ..Default::default()
        }]);
        let errors = p.validate().unwrap_err();
        assert!(errors.errors().contains_key("lines"));

        let line = QuoteLinePayload {
            quantity: Some(Decimal::from(1_000_000_000i64)),
            unit_price_ht: Some(Decimal::new(-1, 2)),
            vat_percent: Some(Decimal::new(101, 0)),
            ..Default::default()
        };
        let errors = line.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("quantity"));
        assert!(fields.contains_key("unit_price_ht"));
        assert!(fields.contains_key("vat_percent"));

        let line = QuoteLinePayload {
            quantity: Some(Decimal::new(999_999_999_999, 3)),
            unit_price_ht: Some(Decimal::new(999_999_999_999, 2)),
            vat_percent: Some(Decimal::ONE_HUNDRED),
            ..Default::default()
        };
        assert!(line.validate().is_ok());
    }

    #[test]
    fn missing_fields_take_form_defaults() {
        let json = format!(r#"{{"clientId":"{}"}}"#, Uuid::new_v4());
        let p: QuotePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(p.validity_days, 30);
        assert_eq!(p.status, None);
        assert!(p.lines.is_none());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn valid_until_adds_the_validity_period() {
        let quote = Quote {
            id: Uuid::new_v4(),
            number: "N°001".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            client_id: Uuid::new_v4(),
            serial_number: None,
            inventory: None,
            status: QuoteStatus::Draft,
            validity_days: 30,
            total_ht: Decimal::ZERO,
            total_ttc: Decimal::ZERO,
            discount_percent: Decimal::ZERO,
            deposit: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(quote.valid_until(), NaiveDate::from_ymd_opt(2025, 2, 14).unwrap());
    }
}
