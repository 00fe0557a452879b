// src/services/payment.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::invoice::{PaymentMethod, PaymentState},
    services::pricing::round_money,
};

/// Saldo abaixo deste valor conta como quitado (0,01 €).
pub const PAID_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceBalance {
    pub amount_ttc: Decimal,
    pub deposit: Decimal,
    pub remaining: Decimal,
}

/// Novo estado da fatura após um pagamento.
///
/// `method` e `paid_on` só são preenchidos quando a fatura fica quitada;
/// num pagamento parcial os valores gravados não mudam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub deposit: Decimal,
    pub remaining: Decimal,
    pub state: PaymentState,
    pub method: Option<PaymentMethod>,
    pub paid_on: Option<NaiveDate>,
}

pub fn ensure_positive(amount: Decimal) -> Result<Decimal, AppError> {
    let amount = round_money(amount);
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidPaymentAmount);
    }
    Ok(amount)
}

pub fn apply_payment(
    balance: InvoiceBalance,
    amount: Decimal,
    method: PaymentMethod,
    today: NaiveDate,
) -> Result<PaymentOutcome, AppError> {
    let amount = ensure_positive(amount)?;

    let deposit = round_money(balance.deposit + amount);
    let remaining = round_money(balance.amount_ttc - deposit);

    if remaining <= PAID_TOLERANCE {
        Ok(PaymentOutcome {
            deposit,
            remaining: Decimal::ZERO,
            state: PaymentState::Paid,
            method: Some(method),
            paid_on: Some(today),
        })
    } else {
        Ok(PaymentOutcome {
            deposit,
            remaining,
            state: PaymentState::Partial,
            method: None,
            paid_on: None,
        })
    }
}

/// Saldo inicial da fatura criada a partir de um devis (o acompte do devis
/// já conta como recebido).
pub fn opening_balance(amount_ttc: Decimal, deposit: Decimal, today: NaiveDate) -> (InvoiceBalance, PaymentState, Option<NaiveDate>) {
    let amount_ttc = round_money(amount_ttc);
    let deposit = round_money(deposit);
    let remaining = round_money(amount_ttc - deposit).max(Decimal::ZERO);

    let balance = InvoiceBalance { amount_ttc, deposit, remaining };
    if remaining <= PAID_TOLERANCE {
        (InvoiceBalance { remaining: Decimal::ZERO, ..balance }, PaymentState::Paid, Some(today))
    } else {
        (balance, PaymentState::Pending, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
    }

    fn fresh_invoice() -> InvoiceBalance {
        InvoiceBalance {
            amount_ttc: Decimal::new(26550, 2),
            deposit: Decimal::ZERO,
            remaining: Decimal::new(26550, 2),
        }
    }

    #[test]
    fn full_payment_marks_invoice_as_paid() {
        let outcome = apply_payment(fresh_invoice(), Decimal::new(26550, 2), PaymentMethod::Cheque, today()).unwrap();

        assert_eq!(outcome.remaining, Decimal::ZERO);
        assert_eq!(outcome.deposit, Decimal::new(26550, 2));
        assert_eq!(outcome.state, PaymentState::Paid);
        assert_eq!(outcome.method, Some(PaymentMethod::Cheque));
        assert_eq!(outcome.paid_on, Some(today()));
    }

    #[test]
    fn partial_then_final_payment() {
        let first = apply_payment(fresh_invoice(), Decimal::new(100, 0), PaymentMethod::Cash, today()).unwrap();
        assert_eq!(first.remaining, Decimal::new(16550, 2));
        assert_eq!(first.state, PaymentState::Partial);
        assert_eq!(first.method, None);
        assert_eq!(first.paid_on, None);

        let balance = InvoiceBalance {
            amount_ttc: Decimal::new(26550, 2),
            deposit: first.deposit,
            remaining: first.remaining,
        };
        let second = apply_payment(balance, Decimal::new(16550, 2), PaymentMethod::BankTransfer, today()).unwrap();
        assert_eq!(second.remaining, Decimal::ZERO);
        assert_eq!(second.state, PaymentState::Paid);
        assert_eq!(second.method, Some(PaymentMethod::BankTransfer));
    }

    #[test]
    fn overpayment_never_leaves_a_negative_balance() {
        let outcome = apply_payment(fresh_invoice(), Decimal::new(300, 0), PaymentMethod::Card, today()).unwrap();
        assert_eq!(outcome.remaining, Decimal::ZERO);
        assert_eq!(outcome.state, PaymentState::Paid);
    }

    #[test]
    fn one_cent_left_counts_as_paid() {
        let outcome = apply_payment(fresh_invoice(), Decimal::new(26549, 2), PaymentMethod::Cash, today()).unwrap();
        assert_eq!(outcome.state, PaymentState::Paid);
        assert_eq!(outcome.remaining, Decimal::ZERO);
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        for amount in [Decimal::ZERO, Decimal::new(-10, 0), Decimal::new(4, 3)] {
            let err = apply_payment(fresh_invoice(), amount, PaymentMethod::Cash, today()).unwrap_err();
            assert!(matches!(err, AppError::InvalidPaymentAmount), "amount {}", amount);
        }
    }

    #[test]
    fn opening_balance_carries_the_quote_deposit() {
        let (balance, state, paid_on) = opening_balance(Decimal::new(26550, 2), Decimal::new(50, 0), today());
        assert_eq!(balance.remaining, Decimal::new(21550, 2));
        assert_eq!(balance.deposit, Decimal::new(50, 0));
        assert_eq!(state, PaymentState::Pending);
        assert_eq!(paid_on, None);

        let (balance, state, paid_on) = opening_balance(Decimal::new(26550, 2), Decimal::new(300, 0), today());
        assert_eq!(balance.remaining, Decimal::ZERO);
        assert_eq!(state, PaymentState::Paid);
        assert_eq!(paid_on, Some(today()));
    }
}
