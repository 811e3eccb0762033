use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LeasingError, LeasingResult};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percent numbers as entered by sales staff (3.5 = 3.5%). Never fractions.
pub type Percent = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Checked arithmetic
// ---------------------------------------------------------------------------
//
// Decimal operators panic on overflow. Everything fed by caller-supplied
// amounts goes through these instead.

fn overflow(context: &str) -> LeasingError {
    LeasingError::Overflow {
        context: context.to_string(),
    }
}

pub(crate) fn checked_add(a: Decimal, b: Decimal, context: &str) -> LeasingResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(context))
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal, context: &str) -> LeasingResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(context))
}

pub(crate) fn checked_mul(a: Decimal, b: Decimal, context: &str) -> LeasingResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

/// Fails on a zero divisor as well as on overflow.
pub(crate) fn checked_div(a: Decimal, b: Decimal, context: &str) -> LeasingResult<Decimal> {
    if b.is_zero() {
        return Err(LeasingError::DivisionByZero {
            context: context.to_string(),
        });
    }
    a.checked_div(b).ok_or_else(|| overflow(context))
}

/// Sum of `values`, failing on overflow.
pub(crate) fn checked_sum<I>(values: I, context: &str) -> LeasingResult<Decimal>
where
    I: IntoIterator<Item = LeasingResult<Decimal>>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| checked_add(acc, v?, context))
}

/// `amount * pct / 100`
pub(crate) fn percent_of(amount: Money, pct: Percent, context: &str) -> LeasingResult<Money> {
    Ok(checked_mul(amount, pct, context)? / Decimal::ONE_HUNDRED)
}

/// `part / whole * 100`, or zero when `whole` is zero.
pub(crate) fn percentage_or_zero(part: Money, whole: Money, context: &str) -> LeasingResult<Percent> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    checked_mul(checked_div(part, whole, context)?, Decimal::ONE_HUNDRED, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_helpers() {
        assert_eq!(percent_of(dec!(1100), dec!(3), "t").unwrap(), dec!(33));
        assert_eq!(percentage_or_zero(dec!(100), dec!(1000), "t").unwrap(), dec!(10));
        assert_eq!(percentage_or_zero(dec!(100), dec!(0), "t").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_reported_with_context() {
        let err = checked_mul(Decimal::MAX, dec!(2), "line total").unwrap_err();
        assert!(matches!(err, LeasingError::Overflow { ref context } if context == "line total"));
        assert!(checked_sum([Ok(Decimal::MAX), Ok(Decimal::ONE)], "sum").is_err());
        assert!(matches!(
            checked_div(dec!(1), dec!(0), "ratio"),
            Err(LeasingError::DivisionByZero { .. })
        ));
    }
}
