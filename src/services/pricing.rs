// src/services/pricing.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Arredondamento monetário: 2 casas, meio para longe do zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantidades são gravadas com 3 casas.
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}

/// Valores de uma linha que entram no cálculo dos totais.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    pub quantity: Decimal,
    pub unit_price_ht: Decimal,
    pub vat_percent: Decimal,
}

impl LineAmounts {
    pub fn new(quantity: Decimal, unit_price_ht: Decimal, vat_percent: Decimal) -> Self {
        Self { quantity, unit_price_ht, vat_percent }
    }

    /// Campos ausentes: quantidade 1, preço 0, TVA 0. Os valores já saem
    /// na escala das colunas, para que os totais possam ser refeitos a
    /// partir das linhas gravadas.
    pub fn from_optional(
        quantity: Option<Decimal>,
        unit_price_ht: Option<Decimal>,
        vat_percent: Option<Decimal>,
    ) -> Self {
        Self::new(
            round_quantity(quantity.unwrap_or(Decimal::ONE)),
            round_money(unit_price_ht.unwrap_or(Decimal::ZERO)),
            round_money(vat_percent.unwrap_or(Decimal::ZERO)),
        )
    }

    pub fn raw_ht(&self) -> Decimal {
        self.quantity * self.unit_price_ht
    }

    /// TTC da linha antes da remise do devis (valor exibido na linha).
    pub fn total_ttc(&self) -> Decimal {
        round_money(self.raw_ht() * (Decimal::ONE + self.vat_percent / Decimal::ONE_HUNDRED))
    }

    // HT com remise + TVA calculada sobre esse HT
    fn discounted_ttc(&self, keep_rate: Decimal) -> Decimal {
        let discounted_ht = self.raw_ht() * keep_rate;
        discounted_ht + discounted_ht * self.vat_percent / Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteTotals {
    pub gross_ht: Decimal,
    pub discount_amount: Decimal,
    pub total_ht: Decimal,
    pub total_vat: Decimal,
    pub total_ttc: Decimal,
}

/// Calcula os totais HT e TTC de um devis.
///
/// A remise é aplicada a cada linha antes do cálculo da TVA dessa linha,
/// de modo que a TVA incide sempre sobre a base já descontada. Os cálculos
/// são feitos em precisão total e só os resultados são arredondados.
pub fn compute_totals(lines: &[LineAmounts], discount_percent: Decimal) -> QuoteTotals {
    let discount_rate = discount_percent / Decimal::ONE_HUNDRED;
    let keep_rate = Decimal::ONE - discount_rate;

    let gross_ht: Decimal = lines.iter().map(LineAmounts::raw_ht).sum();
    let discount_amount = gross_ht * discount_rate;
    let total_ht = gross_ht - discount_amount;
    let total_ttc: Decimal = lines.iter().map(|line| line.discounted_ttc(keep_rate)).sum();

    QuoteTotals {
        gross_ht: round_money(gross_ht),
        discount_amount: round_money(discount_amount),
        total_ht: round_money(total_ht),
        total_vat: round_money(total_ttc - total_ht),
        total_ttc: round_money(total_ttc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    fn sample_lines() -> Vec<LineAmounts> {
        vec![
            LineAmounts::new(dec(2, 0), dec(100, 0), dec(20, 0)),
            LineAmounts::new(dec(1, 0), dec(50, 0), dec(10, 0)),
        ]
    }

    #[test]
    fn two_lines_with_ten_percent_discount() {
        let totals = compute_totals(&sample_lines(), dec(10, 0));

        assert_eq!(totals.gross_ht, dec(250, 0));
        assert_eq!(totals.discount_amount, dec(25, 0));
        assert_eq!(totals.total_ht, dec(225, 0));
        assert_eq!(totals.total_ttc, dec(2655, 1));
        assert_eq!(totals.total_vat, dec(405, 1));
    }

    #[test]
    fn discount_is_applied_before_each_line_tax() {
        let lines = sample_lines();
        let keep = Decimal::ONE - dec(10, 0) / Decimal::ONE_HUNDRED;
        assert_eq!(lines[0].discounted_ttc(keep), dec(216, 0));
        assert_eq!(lines[1].discounted_ttc(keep), dec(495, 1));
    }

    #[test]
    fn without_discount_ttc_is_the_sum_of_taxed_lines() {
        let lines = vec![
            LineAmounts::new(dec(3, 0), dec(1999, 2), dec(20, 0)),
            LineAmounts::new(dec(15, 1), dec(4250, 2), dec(55, 1)),
            LineAmounts::new(dec(1, 0), dec(80, 0), Decimal::ZERO),
        ];
        let expected: Decimal = lines
            .iter()
            .map(|l| l.quantity * l.unit_price_ht * (Decimal::ONE + l.vat_percent / Decimal::ONE_HUNDRED))
            .sum();

        let totals = compute_totals(&lines, Decimal::ZERO);
        assert_eq!(totals.total_ttc, round_money(expected));
        assert_eq!(totals.discount_amount, Decimal::ZERO);
    }

    #[test]
    fn total_ht_scales_with_discount_over_the_whole_range() {
        let lines = sample_lines();
        let gross: Decimal = lines.iter().map(LineAmounts::raw_ht).sum();

        for d in (0..=100).step_by(5) {
            let discount = Decimal::from(d);
            let totals = compute_totals(&lines, discount);
            let expected = (Decimal::ONE - discount / Decimal::ONE_HUNDRED) * gross;
            assert_eq!(totals.total_ht, round_money(expected), "discount {}%", d);
        }
    }

    #[test]
    fn full_discount_zeroes_everything() {
        let totals = compute_totals(&sample_lines(), Decimal::ONE_HUNDRED);
        assert_eq!(totals.total_ht, Decimal::ZERO);
        assert_eq!(totals.total_ttc, Decimal::ZERO);
    }

    #[test]
    fn empty_quote_has_zero_totals() {
        assert_eq!(compute_totals(&[], dec(10, 0)), QuoteTotals::default());
    }

    #[test]
    fn missing_line_fields_use_defaults() {
        let line = LineAmounts::from_optional(None, None, None);
        assert_eq!(line.quantity, Decimal::ONE);
        assert_eq!(line.unit_price_ht, Decimal::ZERO);
        assert_eq!(line.total_ttc(), Decimal::ZERO);

        let line = LineAmounts::from_optional(None, Some(dec(50, 0)), Some(dec(20, 0)));
        assert_eq!(line.total_ttc(), dec(60, 0));
    }

    #[test]
    fn line_inputs_take_the_stored_scale() {
        let line = LineAmounts::from_optional(Some(dec(12345, 4)), Some(dec(10005, 3)), Some(dec(5555, 3)));
        assert_eq!(line.quantity, dec(1235, 3));
        assert_eq!(line.unit_price_ht, dec(1001, 2));
        assert_eq!(line.vat_percent, dec(556, 2));
    }

    #[test]
    fn line_total_is_rounded_to_cents() {
        let line = LineAmounts::new(dec(3, 0), dec(333, 2), dec(55, 1));
        // 9.99 * 1.055 = 10.53945
        assert_eq!(line.total_ttc(), dec(1054, 2));
    }
}
