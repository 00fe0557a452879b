// src/models/invoice.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Pending, // En attente
    Partial, // Paiement partiel
    Paid,    // Payé
}

impl PaymentState {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentState::Pending => "En attente",
            PaymentState::Partial => "Paiement partiel",
            PaymentState::Paid => "Payé",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    Cash,
    Cheque,
    Card,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Paiement par virement",
            PaymentMethod::Cash => "Espèces",
            PaymentMethod::Cheque => "Chèque",
            PaymentMethod::Card => "Carte bancaire",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    #[schema(example = "001")]
    pub number: String,
    #[schema(value_type = String, format = Date, example = "2025-03-20")]
    pub date: NaiveDate,
    pub quote_id: Uuid,
    pub client_id: Uuid,
    #[schema(example = "265.50")]
    pub amount_ttc: Decimal,
    // Acompte: total já recebido
    #[schema(example = "100.00")]
    pub deposit: Decimal,
    #[schema(example = "165.50")]
    pub remaining: Decimal,
    pub payment_state: PaymentState,
    pub payment_method: Option<PaymentMethod>,
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub id: Uuid,
    pub number: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub client_id: Uuid,
    pub client_name: String,
    pub quote_number: String,
    pub amount_ttc: Decimal,
    pub remaining: Decimal,
    pub payment_state: PaymentState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub client_name: String,
    pub quote_number: String,
}

// Parâmetros de inserção, montados pelo serviço na conversão do devis
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub number: String,
    pub date: NaiveDate,
    pub quote_id: Uuid,
    pub client_id: Uuid,
    pub amount_ttc: Decimal,
    pub deposit: Decimal,
    pub remaining: Decimal,
    pub payment_state: PaymentState,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentPayload {
    #[schema(example = "100.00")]
    pub amount: Decimal,
    #[serde(default)]
    pub method: PaymentMethod,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InvoiceListQuery {
    /// Busca por número da fatura ou nome do cliente
    pub search: Option<String>,
    pub state: Option<PaymentState>,
}
