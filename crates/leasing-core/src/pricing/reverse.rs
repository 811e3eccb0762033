//! Reverse pricing: from a target monthly payment back to the financed
//! amount, and from a financed amount back to the margin.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{CalculatorConfig, RangePolicy};
use crate::error::LeasingError;
use crate::leaser::coefficient::{resolve_leaser, CoefficientSource};
use crate::leaser::rate_table::Leaser;
use crate::types::{checked_div, checked_mul, checked_sub, percentage_or_zero, Money, Percent};
use crate::LeasingResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancedAmountFromMonthly {
    pub monthly_payment: Money,
    pub financed_amount: Money,
    pub coefficient: Percent,
    pub source: CoefficientSource,
    pub leaser_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginFromFinanced {
    pub purchase_price: Money,
    pub financed_amount: Money,
    pub margin_amount: Money,
    pub margin_percentage: Percent,
}

/// Financed amount that a leaser would amortize into `monthly_payment`.
///
/// The coefficient depends on the financed amount, which is the unknown, so
/// each bracket is tried in order and the first whose candidate
/// `monthly * 100 / coefficient` lands inside that same bracket wins.
/// Brackets with a zero coefficient are skipped.
pub fn financed_amount_from_monthly_payment(
    monthly_payment: Money,
    leaser: Option<&Leaser>,
    config: &CalculatorConfig,
) -> LeasingResult<FinancedAmountFromMonthly> {
    if monthly_payment.is_sign_negative() {
        return Err(LeasingError::InvalidInput {
            field: "monthly_payment".into(),
            reason: "Monthly payment cannot be negative.".into(),
        });
    }

    let (table, _) = resolve_leaser(leaser, config);

    for (range_index, r) in table.ranges.iter().enumerate() {
        if r.coefficient.is_zero() {
            continue;
        }
        let candidate = amortized_amount(monthly_payment, r.coefficient)?;
        if r.min <= candidate && candidate <= r.max {
            return Ok(FinancedAmountFromMonthly {
                monthly_payment,
                financed_amount: candidate,
                coefficient: r.coefficient,
                source: CoefficientSource::Matched { range_index },
                leaser_name: table.name.clone(),
            });
        }
    }

    let first = table.ranges.first().ok_or_else(|| {
        LeasingError::EmptyRateTable(format!("leaser '{}' has no ranges", table.name))
    })?;

    match config.range_policy {
        RangePolicy::Strict => Err(LeasingError::InvalidInput {
            field: "monthly_payment".into(),
            reason: format!(
                "Monthly payment {} is not reachable from any range of '{}'.",
                monthly_payment, table.name
            ),
        }),
        RangePolicy::FallbackToFirst => {
            if first.coefficient.is_zero() {
                return Err(LeasingError::ZeroCoefficient {
                    context: format!("first range of '{}'", table.name),
                });
            }
            Ok(FinancedAmountFromMonthly {
                monthly_payment,
                financed_amount: amortized_amount(monthly_payment, first.coefficient)?,
                coefficient: first.coefficient,
                source: CoefficientSource::FallbackFirstRange,
                leaser_name: table.name.clone(),
            })
        }
    }
}

/// `monthly * 100 / coefficient`
fn amortized_amount(monthly_payment: Money, coefficient: Percent) -> LeasingResult<Money> {
    let scaled = checked_mul(monthly_payment, Decimal::ONE_HUNDRED, "monthly_payment * 100")?;
    checked_div(scaled, coefficient, "monthly_payment * 100 / coefficient")
}

/// Margin earned when `purchase_price` is financed as `financed_amount`.
pub fn margin_from_financed_amount(
    purchase_price: Money,
    financed_amount: Money,
) -> LeasingResult<MarginFromFinanced> {
    let margin_amount = checked_sub(financed_amount, purchase_price, "financed - purchase")?;
    Ok(MarginFromFinanced {
        purchase_price,
        financed_amount,
        margin_amount,
        margin_percentage: percentage_or_zero(margin_amount, purchase_price, "margin percentage")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaser::rate_table::LeaserRange;
    use rust_decimal_macros::dec;

    fn leaser() -> Leaser {
        Leaser {
            name: "Reverse".into(),
            logo_url: None,
            ranges: vec![
                LeaserRange {
                    min: dec!(0),
                    max: dec!(2000),
                    coefficient: dec!(4),
                },
                LeaserRange {
                    min: dec!(2000.01),
                    max: dec!(10000),
                    coefficient: dec!(2.5),
                },
            ],
        }
    }

    #[test]
    fn test_self_consistent_bracket_selected() {
        // 100 / 4% = 2500, outside [0, 2000]; 100 / 2.5% = 4000, inside.
        let out =
            financed_amount_from_monthly_payment(dec!(100), Some(&leaser()), &CalculatorConfig::default())
                .unwrap();
        assert_eq!(out.financed_amount, dec!(4000));
        assert_eq!(out.coefficient, dec!(2.5));
        assert_eq!(out.source, CoefficientSource::Matched { range_index: 1 });
    }

    #[test]
    fn test_unreachable_payment_falls_back() {
        let out =
            financed_amount_from_monthly_payment(dec!(1000), Some(&leaser()), &CalculatorConfig::default())
                .unwrap();
        assert_eq!(out.source, CoefficientSource::FallbackFirstRange);
        assert_eq!(out.financed_amount, dec!(25000));
    }

    #[test]
    fn test_strict_rejects_unreachable_payment() {
        let err = financed_amount_from_monthly_payment(dec!(1000), Some(&leaser()), &CalculatorConfig::strict())
            .unwrap_err();
        match err {
            LeasingError::InvalidInput { field, reason } => {
                assert_eq!(field, "monthly_payment");
                assert!(reason.contains("not reachable"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_oversized_payment_overflows_without_panicking() {
        let err = financed_amount_from_monthly_payment(Decimal::MAX, Some(&leaser()), &CalculatorConfig::default())
            .unwrap_err();
        assert!(matches!(err, LeasingError::Overflow { .. }));

        let err = margin_from_financed_amount(Decimal::MIN, Decimal::MAX).unwrap_err();
        assert!(matches!(err, LeasingError::Overflow { .. }));
    }

    #[test]
    fn test_negative_payment_rejected() {
        let err = financed_amount_from_monthly_payment(dec!(-1), None, &CalculatorConfig::default())
            .unwrap_err();
        assert!(matches!(err, LeasingError::InvalidInput { .. }));
    }

    #[test]
    fn test_margin_from_financed() {
        let m = margin_from_financed_amount(dec!(1000), dec!(1150)).unwrap();
        assert_eq!(m.margin_amount, dec!(150));
        assert_eq!(m.margin_percentage, dec!(15));

        let zero = margin_from_financed_amount(dec!(0), dec!(50)).unwrap();
        assert_eq!(zero.margin_percentage, Decimal::ZERO);
    }
}
