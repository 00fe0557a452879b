// src/services/lifecycle.rs

use crate::{common::error::AppError, models::quote::QuoteStatus};

// Um devis fica bloqueado quando aceito ou quando já virou fatura.
pub fn is_editable(status: QuoteStatus, has_invoice: bool) -> bool {
    status != QuoteStatus::Accepted && !has_invoice
}

/// Guarda avaliada no momento de cada edição (conteúdo ou status).
pub fn ensure_editable(number: &str, status: QuoteStatus, has_invoice: bool) -> Result<(), AppError> {
    if is_editable(status, has_invoice) {
        Ok(())
    } else {
        Err(AppError::QuoteLocked(number.to_string()))
    }
}

/// Status resultante da conversão em fatura: sempre "accepted".
///
/// Só a existência de uma fatura impede a conversão; um devis aceito
/// manualmente ainda pode ser faturado uma vez.
pub fn ensure_convertible(number: &str, has_invoice: bool) -> Result<QuoteStatus, AppError> {
    if has_invoice {
        return Err(AppError::InvoiceAlreadyExists(number.to_string()));
    }
    Ok(QuoteStatus::Accepted)
}

/// Troca explícita de status pelo usuário.
pub fn apply_status_change(
    number: &str,
    current: QuoteStatus,
    has_invoice: bool,
    requested: QuoteStatus,
) -> Result<QuoteStatus, AppError> {
    ensure_editable(number, current, has_invoice)?;
    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unaccepted_quotes_without_invoice_are_editable() {
        assert!(is_editable(QuoteStatus::Draft, false));
        assert!(is_editable(QuoteStatus::Sent, false));
        // Recusado é final por convenção, mas não bloqueia
        assert!(is_editable(QuoteStatus::Refused, false));

        assert!(!is_editable(QuoteStatus::Accepted, false));
        assert!(!is_editable(QuoteStatus::Draft, true));
        assert!(!is_editable(QuoteStatus::Accepted, true));
    }

    #[test]
    fn edits_on_locked_quotes_are_rejected() {
        let err = ensure_editable("N°004", QuoteStatus::Accepted, false).unwrap_err();
        assert!(matches!(err, AppError::QuoteLocked(n) if n == "N°004"));

        let err = apply_status_change("N°004", QuoteStatus::Sent, true, QuoteStatus::Draft).unwrap_err();
        assert!(matches!(err, AppError::QuoteLocked(_)));
    }

    #[test]
    fn status_can_be_set_directly_while_unlocked() {
        let next = apply_status_change("N°001", QuoteStatus::Draft, false, QuoteStatus::Accepted).unwrap();
        assert_eq!(next, QuoteStatus::Accepted);

        let next = apply_status_change("N°001", QuoteStatus::Refused, false, QuoteStatus::Sent).unwrap();
        assert_eq!(next, QuoteStatus::Sent);
    }

    #[test]
    fn conversion_happens_once() {
        assert_eq!(ensure_convertible("N°002", false).unwrap(), QuoteStatus::Accepted);

        let err = ensure_convertible("N°002", true).unwrap_err();
        assert!(matches!(err, AppError::InvoiceAlreadyExists(n) if n == "N°002"));
    }
}
