//! Offer line items and their per-item arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{checked_add, checked_mul, percent_of, Money, Percent};
use crate::LeasingResult;

/// One equipment line of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Display label (e.g. "MacBook Pro 14")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Unit purchase price
    pub purchase_price: Money,
    pub quantity: u32,
    /// Markup on the purchase price, in percent
    pub margin: Percent,
    /// Negotiated monthly payment per unit, overriding the rate table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
}

impl Equipment {
    pub fn new(purchase_price: Money, quantity: u32, margin: Percent) -> Self {
        Equipment {
            title: None,
            purchase_price,
            quantity,
            margin,
            monthly_payment: None,
        }
    }

    pub fn with_monthly_payment(mut self, monthly_payment: Money) -> Self {
        self.monthly_payment = Some(monthly_payment);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// `purchase_price * quantity`
    pub fn purchase_total(&self) -> LeasingResult<Money> {
        checked_mul(
            self.purchase_price,
            Decimal::from(self.quantity),
            "purchase_price * quantity",
        )
    }

    /// `purchase_price * quantity * margin / 100`
    pub fn margin_amount(&self) -> LeasingResult<Money> {
        percent_of(self.purchase_total()?, self.margin, "line margin amount")
    }
}

/// Amount the leaser finances for one line:
/// `purchase_price * quantity * (1 + margin / 100)`.
///
/// Negative prices or margins are not rejected; they flow through the
/// arithmetic and are flagged by the offer analysis instead. Amounts too
/// large for a `Decimal` fail with `Overflow`.
pub fn calculate_financed_amount_for_equipment(equipment: &Equipment) -> LeasingResult<Money> {
    let markup = checked_add(
        Decimal::ONE,
        equipment.margin / Decimal::ONE_HUNDRED,
        "1 + margin / 100",
    )?;
    checked_mul(equipment.purchase_total()?, markup, "line financed amount")
}

/// `financed_amount * coefficient / 100`
pub fn monthly_payment_from_coefficient(
    financed_amount: Money,
    coefficient: Percent,
) -> LeasingResult<Money> {
    percent_of(financed_amount, coefficient, "financed_amount * coefficient")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LeasingError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_financed_amount() {
        let e = Equipment::new(dec!(1000), 2, dec!(15));
        assert_eq!(calculate_financed_amount_for_equipment(&e).unwrap(), dec!(2300));
    }

    #[test]
    fn test_zero_margin_finances_purchase_price() {
        let e = Equipment::new(dec!(749.99), 3, dec!(0));
        assert_eq!(calculate_financed_amount_for_equipment(&e).unwrap(), dec!(2249.97));
    }

    #[test]
    fn test_negative_margin_propagates() {
        let e = Equipment::new(dec!(1000), 1, dec!(-10));
        assert_eq!(calculate_financed_amount_for_equipment(&e).unwrap(), dec!(900));
        assert_eq!(e.margin_amount().unwrap(), dec!(-100));
    }

    #[test]
    fn test_monthly_payment_from_coefficient() {
        assert_eq!(
            monthly_payment_from_coefficient(dec!(1100), dec!(3)).unwrap(),
            dec!(33)
        );
    }

    #[test]
    fn test_oversized_line_overflows_without_panicking() {
        let e = Equipment::new(Decimal::MAX, 2, dec!(10));
        assert!(matches!(e.purchase_total(), Err(LeasingError::Overflow { .. })));
        assert!(matches!(
            calculate_financed_amount_for_equipment(&e),
            Err(LeasingError::Overflow { .. })
        ));

        // Fits as a purchase total, overflows once the margin is applied
        let e = Equipment::new(Decimal::MAX, 1, dec!(10));
        assert_eq!(e.purchase_total().unwrap(), Decimal::MAX);
        assert!(matches!(
            calculate_financed_amount_for_equipment(&e),
            Err(LeasingError::Overflow { .. })
        ));
    }
}
