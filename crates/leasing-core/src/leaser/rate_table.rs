//! Leaser rate tables.
//!
//! A leaser (financing provider) publishes a table of financed-amount
//! brackets, each carrying the coefficient that turns a financed amount into
//! a monthly payment. Tables come from configuration and are not guaranteed
//! to be well formed, so [`audit_rate_table`] reports what is wrong with one
//! instead of refusing it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::brackets::Bracket;
use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Brackets are entered to the cent (`2500` then `2500.01`); anything wider
/// is a hole in the table.
const GAP_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One bracket of a leaser's rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaserRange {
    /// Inclusive lower bound of the financed amount
    pub min: Money,
    /// Inclusive upper bound of the financed amount
    pub max: Money,
    /// Monthly payment as a percent of the financed amount (3.5 = 3.5%)
    pub coefficient: Percent,
}

impl Bracket for LeaserRange {
    fn min(&self) -> Money {
        self.min
    }

    fn max(&self) -> Money {
        self.max
    }
}

/// A financing provider and its rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaser {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub ranges: Vec<LeaserRange>,
}

impl Leaser {
    /// Rate table used when an offer has no leaser, or its leaser has no
    /// ranges configured.
    pub fn standard() -> Self {
        Leaser {
            name: "Grenke Lease".to_string(),
            logo_url: None,
            ranges: vec![
                range(dec!(500), dec!(2500), dec!(3.55)),
                range(dec!(2500.01), dec!(5000), dec!(3.27)),
                range(dec!(5000.01), dec!(12500), dec!(3.18)),
                range(dec!(12500.01), dec!(25000), dec!(3.17)),
                range(dec!(25000.01), dec!(50000), dec!(3.16)),
            ],
        }
    }

    pub fn has_ranges(&self) -> bool {
        !self.ranges.is_empty()
    }
}

fn range(min: Money, max: Money, coefficient: Percent) -> LeaserRange {
    LeaserRange {
        min,
        max,
        coefficient,
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// A structural problem found in a rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum RangeIssue {
    /// The table has no brackets at all
    Empty,
    /// `min > max`
    InvertedRange { index: usize, min: Money, max: Money },
    /// A zero coefficient makes the inverse pricing step undefined
    ZeroCoefficient { index: usize },
    NegativeCoefficient { index: usize, coefficient: Percent },
    /// Amounts strictly between `after` and `before` match no bracket
    Gap { after: Money, before: Money },
    /// Two brackets both cover `[from, to]`; the earlier one wins on lookup
    Overlap { from: Money, to: Money },
}

impl std::fmt::Display for RangeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeIssue::Empty => write!(f, "rate table has no ranges"),
            RangeIssue::InvertedRange { index, min, max } => {
                write!(f, "range {index} is inverted (min {min} > max {max})")
            }
            RangeIssue::ZeroCoefficient { index } => {
                write!(f, "range {index} has a zero coefficient")
            }
            RangeIssue::NegativeCoefficient { index, coefficient } => {
                write!(f, "range {index} has a negative coefficient ({coefficient})")
            }
            RangeIssue::Gap { after, before } => {
                write!(f, "no range covers amounts between {after} and {before}")
            }
            RangeIssue::Overlap { from, to } => {
                write!(f, "ranges overlap between {from} and {to}")
            }
        }
    }
}

/// Report every structural issue in a leaser's rate table.
///
/// Gap and overlap detection works on the brackets sorted by `min`, so a
/// table entered out of order is still checked as a partition of the amount
/// axis. Inverted brackets are left out of the partition check.
pub fn audit_rate_table(leaser: &Leaser) -> Vec<RangeIssue> {
    let mut issues = Vec::new();

    if leaser.ranges.is_empty() {
        issues.push(RangeIssue::Empty);
        return issues;
    }

    for (index, r) in leaser.ranges.iter().enumerate() {
        if r.min > r.max {
            issues.push(RangeIssue::InvertedRange {
                index,
                min: r.min,
                max: r.max,
            });
        }
        if r.coefficient.is_zero() {
            issues.push(RangeIssue::ZeroCoefficient { index });
        } else if r.coefficient.is_sign_negative() {
            issues.push(RangeIssue::NegativeCoefficient {
                index,
                coefficient: r.coefficient,
            });
        }
    }

    let mut ordered: Vec<&LeaserRange> = leaser.ranges.iter().filter(|r| r.min <= r.max).collect();
    ordered.sort_by(|a, b| a.min.cmp(&b.min));

    let mut covered_to: Option<Money> = None;
    for r in ordered {
        if let Some(prev_max) = covered_to {
            if r.min <= prev_max {
                issues.push(RangeIssue::Overlap {
                    from: r.min,
                    to: prev_max.min(r.max),
                });
            } else if r.min.checked_sub(prev_max).map_or(true, |d| d > GAP_TOLERANCE) {
                issues.push(RangeIssue::Gap {
                    after: prev_max,
                    before: r.min,
                });
            }
        }
        covered_to = Some(covered_to.map_or(r.max, |m| m.max(r.max)));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaser(ranges: Vec<LeaserRange>) -> Leaser {
        Leaser {
            name: "Test".into(),
            logo_url: None,
            ranges,
        }
    }

    #[test]
    fn test_standard_table_is_clean() {
        assert_eq!(audit_rate_table(&Leaser::standard()), vec![]);
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(audit_rate_table(&leaser(vec![])), vec![RangeIssue::Empty]);
    }

    #[test]
    fn test_cent_step_is_not_a_gap() {
        let l = leaser(vec![
            range(dec!(0), dec!(1000), dec!(3.2)),
            range(dec!(1000.01), dec!(2000), dec!(3.1)),
        ]);
        assert!(audit_rate_table(&l).is_empty());
    }

    #[test]
    fn test_gap_detected() {
        let l = leaser(vec![
            range(dec!(0), dec!(1000), dec!(3.2)),
            range(dec!(1500), dec!(2000), dec!(3.1)),
        ]);
        assert_eq!(
            audit_rate_table(&l),
            vec![RangeIssue::Gap {
                after: dec!(1000),
                before: dec!(1500)
            }]
        );
    }

    #[test]
    fn test_overlap_detected_out_of_order() {
        let l = leaser(vec![
            range(dec!(900), dec!(2000), dec!(3.1)),
            range(dec!(0), dec!(1000), dec!(3.2)),
        ]);
        assert_eq!(
            audit_rate_table(&l),
            vec![RangeIssue::Overlap {
                from: dec!(900),
                to: dec!(1000)
            }]
        );
    }

    #[test]
    fn test_bad_coefficients_and_inverted_range() {
        let l = leaser(vec![
            range(dec!(0), dec!(1000), dec!(0)),
            range(dec!(3000), dec!(2000), dec!(-1)),
        ]);
        let issues = audit_rate_table(&l);
        assert!(issues.contains(&RangeIssue::ZeroCoefficient { index: 0 }));
        assert!(issues.contains(&RangeIssue::InvertedRange {
            index: 1,
            min: dec!(3000),
            max: dec!(2000)
        }));
        assert!(issues.contains(&RangeIssue::NegativeCoefficient {
            index: 1,
            coefficient: dec!(-1)
        }));
    }

    #[test]
    fn test_leaser_deserializes_without_ranges() {
        let l: Leaser = serde_json::from_str(r#"{"name":"Bare"}"#).unwrap();
        assert!(!l.has_ranges());
        assert!(l.logo_url.is_none());
    }
}
