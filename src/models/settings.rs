// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Dados da empresa impressos nos devis e faturas (registro único)
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyConfig {
    #[schema(example = "MB Carrosserie")]
    pub company_name: String,

    #[schema(example = "5 avenue Jean Jaurès")]
    pub address: Option<String>,

    #[schema(example = "Lyon")]
    pub city: Option<String>,

    #[schema(example = "69007")]
    pub postal_code: Option<String>,

    #[schema(example = "04 78 00 00 00")]
    pub phone: Option<String>,

    #[schema(example = "contact@mb-carrosserie.fr")]
    pub email: Option<String>,

    #[schema(example = "123 456 789 00012")]
    pub siret: Option<String>,

    #[schema(example = "FR12345678901")]
    pub vat_number: Option<String>,

    #[schema(example = "FR7630006000011234567890189")]
    pub iban: Option<String>,

    #[schema(example = "AGRIFRPP")]
    pub bic: Option<String>,

    #[schema(example = "Crédit Agricole")]
    pub bank_name: Option<String>,

    pub legal_notice: Option<String>,

    pub logo_path: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl CompanyConfig {
    /// Linha "code postal + ville" do cabeçalho dos documentos
    pub fn locality(&self) -> Option<String> {
        match (self.postal_code.as_deref(), self.city.as_deref()) {
            (Some(cp), Some(city)) => Some(format!("{} {}", cp, city)),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyConfigRequest {
    #[validate(length(min = 1, max = 200, message = "Le nom de l'entreprise est requis"))]
    #[schema(example = "MB Carrosserie")]
    pub company_name: String,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email(message = "Email invalide"))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub siret: Option<String>,
    #[validate(length(max = 50))]
    pub vat_number: Option<String>,
    #[validate(length(max = 100))]
    pub iban: Option<String>,
    #[validate(length(max = 20))]
    pub bic: Option<String>,
    #[validate(length(max = 100))]
    pub bank_name: Option<String>,
    pub legal_notice: Option<String>,
    #[validate(length(max = 255))]
    pub logo_path: Option<String>,
}
