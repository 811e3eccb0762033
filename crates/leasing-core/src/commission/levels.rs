//! Ambassador commission levels.
//!
//! Ambassadors (partners who bring in clients) are paid a percentage of the
//! financed amount of each offer they originate. The percentage depends on
//! the ambassador's commission level, itself a bracket table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::brackets::{find_bracket, Bracket};
use crate::error::LeasingError;
use crate::types::{percent_of, with_metadata, ComputationOutput, Money, Percent};
use crate::LeasingResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate {
    pub min: Money,
    pub max: Money,
    /// Commission as a percent of the financed amount
    pub rate: Percent,
}

impl Bracket for CommissionRate {
    fn min(&self) -> Money {
        self.min
    }

    fn max(&self) -> Money {
        self.max
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionLevel {
    pub name: String,
    pub rates: Vec<CommissionRate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionInput {
    pub financed_amount: Money,
    pub level: CommissionLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionOutput {
    pub level: String,
    pub financed_amount: Money,
    pub rate: Percent,
    pub commission_amount: Money,
    /// Index of the bracket applied; `None` when the amount matched nothing
    pub bracket_index: Option<usize>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Commission owed for an offer financed at `input.financed_amount`.
///
/// An amount outside every bracket earns nothing rather than failing; the
/// envelope carries a warning so the dashboard can flag it.
pub fn calculate_commission(
    input: &CommissionInput,
) -> LeasingResult<ComputationOutput<CommissionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.level.rates.is_empty() {
        return Err(LeasingError::EmptyRateTable(format!(
            "commission level '{}' has no rates",
            input.level.name
        )));
    }
    if input.financed_amount.is_sign_negative() {
        return Err(LeasingError::InvalidInput {
            field: "financed_amount".into(),
            reason: "Financed amount cannot be negative.".into(),
        });
    }

    let (rate, bracket_index) = match find_bracket(&input.level.rates, input.financed_amount) {
        Some((i, r)) => (r.rate, Some(i)),
        None => {
            warnings.push(format!(
                "Financed amount {} is outside every bracket of level '{}'; no commission.",
                input.financed_amount, input.level.name
            ));
            (Decimal::ZERO, None)
        }
    };

    let output = CommissionOutput {
        level: input.level.name.clone(),
        financed_amount: input.financed_amount,
        rate,
        commission_amount: percent_of(input.financed_amount, rate, "financed_amount * rate")?,
        bracket_index,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "commission": "financed_amount * rate / 100",
        "unmatched_amount": "zero commission",
    });

    Ok(with_metadata(
        "Ambassador commission by financed-amount bracket",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn silver() -> CommissionLevel {
        CommissionLevel {
            name: "Silver".into(),
            rates: vec![
                CommissionRate {
                    min: dec!(500),
                    max: dec!(2500),
                    rate: dec!(10),
                },
                CommissionRate {
                    min: dec!(2500.01),
                    max: dec!(25000),
                    rate: dec!(8),
                },
            ],
        }
    }

    #[test]
    fn test_commission_in_bracket() {
        let out = calculate_commission(&CommissionInput {
            financed_amount: dec!(5000),
            level: silver(),
        })
        .unwrap();
        assert_eq!(out.result.rate, dec!(8));
        assert_eq!(out.result.commission_amount, dec!(400));
        assert_eq!(out.result.bracket_index, Some(1));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_commission_below_first_bracket_is_zero() {
        let out = calculate_commission(&CommissionInput {
            financed_amount: dec!(100),
            level: silver(),
        })
        .unwrap();
        assert_eq!(out.result.commission_amount, Decimal::ZERO);
        assert_eq!(out.result.bracket_index, None);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_empty_level_rejected() {
        let err = calculate_commission(&CommissionInput {
            financed_amount: dec!(1000),
            level: CommissionLevel {
                name: "None".into(),
                rates: vec![],
            },
        })
        .unwrap_err();
        assert!(matches!(err, LeasingError::EmptyRateTable(_)));
    }

    #[test]
    fn test_oversized_amount_overflows_without_panicking() {
        let err = calculate_commission(&CommissionInput {
            financed_amount: Decimal::MAX,
            level: CommissionLevel {
                name: "Open".into(),
                rates: vec![CommissionRate {
                    min: dec!(0),
                    max: Decimal::MAX,
                    rate: dec!(10),
                }],
            },
        })
        .unwrap_err();
        assert!(matches!(err, LeasingError::Overflow { .. }));
    }
}
