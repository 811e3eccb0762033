//! Inclusive amount brackets shared by leaser rate tables and ambassador
//! commission levels.

use crate::types::Money;

/// A `[min, max]` bracket on the financed-amount axis.
pub trait Bracket {
    fn min(&self) -> Money;
    fn max(&self) -> Money;

    fn contains(&self, amount: Money) -> bool {
        self.min() <= amount && amount <= self.max()
    }
}

/// First bracket (in table order) containing `amount`, with its index.
pub fn find_bracket<B: Bracket>(brackets: &[B], amount: Money) -> Option<(usize, &B)> {
    brackets
        .iter()
        .enumerate()
        .find(|(_, b)| b.contains(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct Band(Money, Money);

    impl Bracket for Band {
        fn min(&self) -> Money {
            self.0
        }
        fn max(&self) -> Money {
            self.1
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bands = [Band(dec!(0), dec!(100)), Band(dec!(100.01), dec!(200))];
        assert_eq!(find_bracket(&bands, dec!(0)).map(|(i, _)| i), Some(0));
        assert_eq!(find_bracket(&bands, dec!(100)).map(|(i, _)| i), Some(0));
        assert_eq!(find_bracket(&bands, dec!(200)).map(|(i, _)| i), Some(1));
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let bands = [Band(dec!(0), dec!(150)), Band(dec!(100), dec!(200))];
        assert_eq!(find_bracket(&bands, dec!(120)).map(|(i, _)| i), Some(0));
    }

    #[test]
    fn test_gap_has_no_match() {
        let bands = [Band(dec!(0), dec!(100)), Band(dec!(100.01), dec!(200))];
        assert!(find_bracket(&bands, dec!(100.005)).is_none());
        assert!(find_bracket(&bands, dec!(-1)).is_none());
    }
}
