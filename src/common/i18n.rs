// src/common/i18n.rs

// Catálogo de mensagens exibidas ao usuário final.
// O francês é o idioma padrão da aplicação; o inglês vem via Accept-Language.

pub const DEFAULT_LANG: &str = "fr";
pub const SUPPORTED_LANGS: &[&str] = &["fr", "en"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    ValidationFailed,
    InvalidCredentials,
    InvalidToken,
    ResourceNotFound,
    CatalogCodeAlreadyExists,
    DocumentNumberConflict,
    QuoteLocked,
    InvoiceAlreadyExists,
    InvalidPaymentAmount,
    UniqueConstraintViolation,
    Unexpected,
}

fn template(key: MessageKey, lang: &str) -> &'static str {
    match (key, lang) {
        (MessageKey::ValidationFailed, "en") => "One or more fields are invalid.",
        (MessageKey::ValidationFailed, _) => "Un ou plusieurs champs sont invalides.",

        (MessageKey::InvalidCredentials, "en") => "Invalid username or password.",
        (MessageKey::InvalidCredentials, _) => "Identifiants incorrects. Veuillez réessayer.",

        (MessageKey::InvalidToken, "en") => "Please log in to access this page.",
        (MessageKey::InvalidToken, _) => "Veuillez vous connecter pour accéder à cette page.",

        (MessageKey::ResourceNotFound, "en") => "Not found: {0}.",
        (MessageKey::ResourceNotFound, _) => "Introuvable : {0}.",

        (MessageKey::CatalogCodeAlreadyExists, "en") => "A price with code {0} already exists!",
        (MessageKey::CatalogCodeAlreadyExists, _) => "Un prix avec le code {0} existe déjà !",

        (MessageKey::DocumentNumberConflict, "en") => "Number {0} is already in use, please retry.",
        (MessageKey::DocumentNumberConflict, _) => "Le numéro {0} est déjà utilisé, veuillez réessayer.",

        (MessageKey::QuoteLocked, "en") => {
            "Quote {0} is locked because it was accepted or converted into an invoice."
        }
        (MessageKey::QuoteLocked, _) => {
            "Le devis {0} est verrouillé car il a été accepté ou converti en facture."
        }

        (MessageKey::InvoiceAlreadyExists, "en") => "An invoice already exists for quote {0}!",
        (MessageKey::InvoiceAlreadyExists, _) => "Une facture existe déjà pour le devis {0} !",

        (MessageKey::InvalidPaymentAmount, "en") => "The payment amount must be greater than 0!",
        (MessageKey::InvalidPaymentAmount, _) => "Le montant du paiement doit être supérieur à 0 !",

        (MessageKey::UniqueConstraintViolation, "en") => "Duplicate value: {0}.",
        (MessageKey::UniqueConstraintViolation, _) => "Valeur déjà existante : {0}.",

        (MessageKey::Unexpected, "en") => "An unexpected error occurred.",
        (MessageKey::Unexpected, _) => "Une erreur inattendue s'est produite.",
    }
}

/// Resolve a mensagem no idioma pedido, substituindo `{0}` pelo argumento.
pub fn translate(key: MessageKey, lang: &str, arg: Option<&str>) -> String {
    let text = template(key, lang);
    match arg {
        Some(value) => text.replace("{0}", value),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_french_for_unknown_languages() {
        assert_eq!(
            translate(MessageKey::InvalidPaymentAmount, "de", None),
            "Le montant du paiement doit être supérieur à 0 !"
        );
    }

    #[test]
    fn substitutes_the_argument() {
        assert_eq!(
            translate(MessageKey::InvoiceAlreadyExists, "en", Some("N°004")),
            "An invoice already exists for quote N°004!"
        );
    }
}
