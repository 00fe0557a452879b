// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(example = "Jean Dupont")]
    pub name: String,
    #[schema(example = "Garage Dupont SARL")]
    pub company: Option<String>,
    #[schema(example = "12 rue des Lilas")]
    pub address: Option<String>,
    #[schema(example = "Lyon")]
    pub city: Option<String>,
    #[schema(example = "69003")]
    pub postal_code: Option<String>,
    #[schema(example = "04 78 00 00 00")]
    pub phone: Option<String>,
    #[schema(example = "jean.dupont@example.fr")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Usado tanto na criação quanto na edição
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, max = 100, message = "Le nom est requis"))]
    pub name: String,
    #[validate(length(max = 200))]
    pub company: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email(message = "Email invalide"))]
    pub email: Option<String>,
}

impl ClientPayload {
    // Campos opcionais vazios viram NULL
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }
        self.name = self.name.trim().to_string();
        self.company = blank_to_none(self.company);
        self.address = blank_to_none(self.address);
        self.city = blank_to_none(self.city);
        self.postal_code = blank_to_none(self.postal_code);
        self.phone = blank_to_none(self.phone);
        self.email = blank_to_none(self.email);
        self
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClientListQuery {
    /// Busca por nome, empresa ou e-mail
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, email: Option<&str>) -> ClientPayload {
        ClientPayload {
            name: name.to_string(),
            company: Some("  ".to_string()),
            address: None,
            city: Some(" Lyon ".to_string()),
            postal_code: None,
            phone: None,
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn requires_a_name_and_a_valid_email() {
        assert!(payload("Jean", Some("jean@example.fr")).validate().is_ok());

        let errors = payload("", Some("pas-un-email")).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn normalizes_blank_optional_fields() {
        let normalized = payload(" Jean ", None).normalized();
        assert_eq!(normalized.name, "Jean");
        assert_eq!(normalized.company, None);
        assert_eq!(normalized.city.as_deref(), Some("Lyon"));
    }
}
