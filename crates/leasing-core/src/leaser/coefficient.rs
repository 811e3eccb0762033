//! Coefficient lookup against a leaser's rate table.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::brackets::find_bracket;
use crate::config::{CalculatorConfig, RangePolicy};
use crate::error::LeasingError;
use crate::leaser::rate_table::Leaser;
use crate::types::{Money, Percent};
use crate::LeasingResult;

/// Why a coefficient was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoefficientSource {
    /// The amount fell inside the bracket at `range_index`
    Matched { range_index: usize },
    /// No bracket contained the amount; the first bracket was used
    FallbackFirstRange,
}

/// A coefficient together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoefficientLookup {
    pub coefficient: Percent,
    pub source: CoefficientSource,
    /// Leaser whose table was actually searched
    pub leaser_name: String,
    /// True when the configured default leaser stood in for the requested one
    pub used_default_leaser: bool,
}

impl CoefficientLookup {
    pub fn is_fallback(&self) -> bool {
        self.source == CoefficientSource::FallbackFirstRange
    }

    /// Human-readable notes for the output envelope. Empty for a clean match.
    pub fn warnings(&self, amount: Money) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.used_default_leaser {
            warnings.push(format!(
                "No rate table supplied; using default leaser '{}'.",
                self.leaser_name
            ));
        }
        if self.is_fallback() {
            warnings.push(format!(
                "Amount {} is outside every range of '{}'; fell back to the first range (coefficient {}).",
                amount, self.leaser_name, self.coefficient
            ));
        }
        warnings
    }
}

/// The leaser whose table applies: the requested one when it has ranges,
/// otherwise the configured default. The flag is true for the default.
pub fn resolve_leaser<'a>(
    leaser: Option<&'a Leaser>,
    config: &'a CalculatorConfig,
) -> (&'a Leaser, bool) {
    match leaser {
        Some(l) if l.has_ranges() => (l, false),
        _ => (&config.default_leaser, true),
    }
}

/// Coefficient of the first bracket containing `amount`.
///
/// A missing leaser, or one without ranges, is replaced by the configured
/// default. When no bracket matches, [`RangePolicy::FallbackToFirst`] returns
/// the first bracket's coefficient and [`RangePolicy::Strict`] fails.
pub fn find_coefficient_for_amount(
    amount: Money,
    leaser: Option<&Leaser>,
    config: &CalculatorConfig,
) -> LeasingResult<CoefficientLookup> {
    let (table, used_default_leaser) = resolve_leaser(leaser, config);

    if let Some((range_index, r)) = find_bracket(&table.ranges, amount) {
        return Ok(CoefficientLookup {
            coefficient: r.coefficient,
            source: CoefficientSource::Matched { range_index },
            leaser_name: table.name.clone(),
            used_default_leaser,
        });
    }

    let first = table.ranges.first().ok_or_else(|| {
        LeasingError::EmptyRateTable(format!("leaser '{}' has no ranges", table.name))
    })?;

    match config.range_policy {
        RangePolicy::Strict => Err(LeasingError::NoMatchingRange { amount }),
        RangePolicy::FallbackToFirst => {
            debug!(%amount, leaser = %table.name, coefficient = %first.coefficient, "no matching range, using first");
            Ok(CoefficientLookup {
                coefficient: first.coefficient,
                source: CoefficientSource::FallbackFirstRange,
                leaser_name: table.name.clone(),
                used_default_leaser,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaser::rate_table::LeaserRange;
    use rust_decimal_macros::dec;

    fn two_band_leaser() -> Leaser {
        Leaser {
            name: "Two Band".into(),
            logo_url: None,
            ranges: vec![
                LeaserRange {
                    min: dec!(0),
                    max: dec!(1000),
                    coefficient: dec!(3.5),
                },
                LeaserRange {
                    min: dec!(1000.01),
                    max: dec!(5000),
                    coefficient: dec!(3.1),
                },
            ],
        }
    }

    #[test]
    fn test_matches_bracket() {
        let l = two_band_leaser();
        let lookup =
            find_coefficient_for_amount(dec!(2500), Some(&l), &CalculatorConfig::default())
                .unwrap();
        assert_eq!(lookup.coefficient, dec!(3.1));
        assert_eq!(lookup.source, CoefficientSource::Matched { range_index: 1 });
        assert!(!lookup.used_default_leaser);
        assert!(lookup.warnings(dec!(2500)).is_empty());
    }

    #[test]
    fn test_out_of_range_falls_back_to_first() {
        let l = two_band_leaser();
        let lookup =
            find_coefficient_for_amount(dec!(9000), Some(&l), &CalculatorConfig::default())
                .unwrap();
        assert_eq!(lookup.coefficient, dec!(3.5));
        assert!(lookup.is_fallback());
        assert_eq!(lookup.warnings(dec!(9000)).len(), 1);
    }

    #[test]
    fn test_strict_policy_rejects_out_of_range() {
        let l = two_band_leaser();
        let err = find_coefficient_for_amount(dec!(9000), Some(&l), &CalculatorConfig::strict())
            .unwrap_err();
        assert!(matches!(err, LeasingError::NoMatchingRange { amount } if amount == dec!(9000)));
    }

    #[test]
    fn test_missing_leaser_uses_default() {
        let config = CalculatorConfig::default();
        let lookup = find_coefficient_for_amount(dec!(3000), None, &config).unwrap();
        assert!(lookup.used_default_leaser);
        assert_eq!(lookup.leaser_name, config.default_leaser.name);
        assert_eq!(lookup.coefficient, dec!(3.27));
    }

    #[test]
    fn test_empty_default_is_an_error() {
        let config = CalculatorConfig::default().with_default_leaser(Leaser {
            name: "Nothing".into(),
            logo_url: None,
            ranges: vec![],
        });
        let err = find_coefficient_for_amount(dec!(100), None, &config).unwrap_err();
        assert!(matches!(err, LeasingError::EmptyRateTable(_)));
    }
}
