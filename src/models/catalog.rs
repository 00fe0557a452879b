// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "catalog_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogCategory {
    TolerieCarrosserie,
    Debosselage,
}

impl CatalogCategory {
    /// Valor gravado no campo "task" das linhas de devis
    pub fn as_task(&self) -> &'static str {
        match self {
            CatalogCategory::TolerieCarrosserie => "TOLERIE_CARROSSERIE",
            CatalogCategory::Debosselage => "DEBOSSELAGE",
        }
    }

    pub fn from_task(task: &str) -> Option<Self> {
        match task {
            "TOLERIE_CARROSSERIE" => Some(CatalogCategory::TolerieCarrosserie),
            "DEBOSSELAGE" => Some(CatalogCategory::Debosselage),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CatalogCategory::TolerieCarrosserie => "Tôlerie / Carrosserie",
            CatalogCategory::Debosselage => "Débosselage",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPrice {
    pub id: Uuid,
    #[schema(example = "T1")]
    pub code: String,
    pub category: CatalogCategory,
    #[schema(example = "Redressage aile avant")]
    pub description: Option<String>,
    #[schema(example = "85.00")]
    pub price: Decimal,
    #[schema(example = true)]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("La valeur doit être positive".into());
        return Err(err);
    }
    Ok(())
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPricePayload {
    #[validate(length(min = 1, max = 20, message = "Le code est requis"))]
    #[schema(example = "T1")]
    pub code: String,
    pub category: CatalogCategory,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_non_negative"))]
    #[schema(example = "85.00")]
    pub price: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CatalogListQuery {
    pub category: Option<CatalogCategory>,
    /// Apenas preços ativos (usado no formulário de devis)
    #[serde(default)]
    pub active_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_prices_and_empty_codes() {
        let payload = CatalogPricePayload {
            code: String::new(),
            category: CatalogCategory::Debosselage,
            description: None,
            price: Decimal::new(-500, 2),
            active: true,
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("code"));
        assert!(fields.contains_key("price"));
    }

    #[test]
    fn category_uses_the_catalog_wire_names() {
        let json = serde_json::to_string(&CatalogCategory::TolerieCarrosserie).unwrap();
        assert_eq!(json, "\"TOLERIE_CARROSSERIE\"");
        assert_eq!(CatalogCategory::Debosselage.as_task(), "DEBOSSELAGE");
        assert_eq!(CatalogCategory::from_task("DEBOSSELAGE"), Some(CatalogCategory::Debosselage));
        assert_eq!(CatalogCategory::from_task("Peinture"), None);
    }
}
