// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::quote::QuoteSummary;

// Página inicial: contadores e últimos devis
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub client_count: i64,
    pub quote_count: i64,
    pub invoice_count: i64,
    pub latest_quotes: Vec<QuoteSummary>,
}
