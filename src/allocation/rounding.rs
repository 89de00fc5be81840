//! Integer division helpers for splitting minor-unit amounts.
//!
//! All products are formed in `i128` so `amount * weight` cannot overflow
//! for any pair of `i64` inputs. Callers guarantee `total_weight > 0`.

use crate::models::Cents;

/// Returns `floor(amount * weight / total_weight)`.
///
/// # Examples
///
/// ```
/// use receipt_split::allocation::floor_share;
///
/// assert_eq!(floor_share(800, 1, 3), 266);
/// assert_eq!(floor_share(1200, 1, 2), 600);
/// ```
pub fn floor_share(amount: Cents, weight: i128, total_weight: i128) -> Cents {
    debug_assert!(total_weight > 0);
    (i128::from(amount) * weight).div_euclid(total_weight) as Cents
}

/// Returns `amount * weight / total_weight` rounded half away from zero.
///
/// # Examples
///
/// ```
/// use receipt_split::allocation::rounded_share;
///
/// // 380 * 1800 / 3800 = 180 exactly
/// assert_eq!(rounded_share(380, 1800, 3800), 180);
/// // 5 * 1 / 2 = 2.5 rounds up to 3
/// assert_eq!(rounded_share(5, 1, 2), 3);
/// // -5 * 1 / 2 = -2.5 rounds down to -3
/// assert_eq!(rounded_share(-5, 1, 2), -3);
/// ```
pub fn rounded_share(amount: Cents, weight: i128, total_weight: i128) -> Cents {
    debug_assert!(total_weight > 0);
    let numerator = i128::from(amount) * weight;
    let magnitude = (2 * numerator.abs() + total_weight) / (2 * total_weight);
    (numerator.signum() * magnitude) as Cents
}

/// Splits `amount` into `count` near-equal parts.
///
/// Every part gets `floor(amount / count)`; the first `amount mod count`
/// parts get one extra unit.
///
/// # Examples
///
/// ```
/// use receipt_split::allocation::split_evenly;
///
/// assert_eq!(split_evenly(100, 3), vec![34, 33, 33]);
/// assert!(split_evenly(100, 0).is_empty());
/// ```
pub fn split_evenly(amount: Cents, count: usize) -> Vec<Cents> {
    if count == 0 {
        return Vec::new();
    }
    let count_i = count as i64;
    let base = amount.div_euclid(count_i);
    let remainder = amount - base * count_i;
    (0..count_i)
        .map(|i| base + if i < remainder { 1 } else { 0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_share_truncates_towards_negative_infinity() {
        assert_eq!(floor_share(10, 1, 3), 3);
        assert_eq!(floor_share(-10, 1, 3), -4);
    }

    #[test]
    fn test_floor_share_handles_large_products() {
        let amount = i64::MAX / 2;
        assert_eq!(floor_share(amount, 4, 4), amount);
    }

    #[test]
    fn test_rounded_share_rounds_below_half_down() {
        // 100 * 1 / 3 = 33.33
        assert_eq!(rounded_share(100, 1, 3), 33);
    }

    #[test]
    fn test_rounded_share_rounds_above_half_up() {
        // 100 * 2 / 3 = 66.67
        assert_eq!(rounded_share(100, 2, 3), 67);
    }

    #[test]
    fn test_rounded_share_exact_half_goes_away_from_zero() {
        // 1 * 1 / 2 = 0.5
        assert_eq!(rounded_share(1, 1, 2), 1);
        // 3 * 1 / 2 = 1.5
        assert_eq!(rounded_share(3, 1, 2), 2);
    }

    #[test]
    fn test_rounded_share_of_zero_is_zero() {
        assert_eq!(rounded_share(0, 5, 7), 0);
    }

    #[test]
    fn test_split_evenly_exact_division() {
        assert_eq!(split_evenly(90, 3), vec![30, 30, 30]);
    }

    #[test]
    fn test_split_evenly_fewer_units_than_parts() {
        assert_eq!(split_evenly(2, 4), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_split_evenly_conserves_amount() {
        for amount in [1, 7, 99, 100, 101, 12_345] {
            for count in 1..=7 {
                let parts = split_evenly(amount, count);
                assert_eq!(parts.iter().sum::<i64>(), amount);
                assert_eq!(parts.len(), count);
            }
        }
    }
}
