//! Lock validation
//!
//! At most two fields may be locked. The one recognized exception is locking
//! dough weight, hydration and starter together while the starter is given as
//! a percentage of flour: the starter then scales with the flour, so the
//! system still has exactly one free unknown.

use crate::settings::{LockedFields, StarterUnit};

/// Check whether a candidate lock set leaves the formula solvable.
///
/// # Example
/// ```
/// use dough_core::engine::is_valid_lock_combination;
/// use dough_core::settings::{LockedFields, StarterUnit};
///
/// let three = LockedFields { dough_weight: true, hydration: true, starter: true, flour_weight: false };
/// assert!(is_valid_lock_combination(&three, StarterUnit::Percentage));
/// assert!(!is_valid_lock_combination(&three, StarterUnit::Grams));
/// ```
pub fn is_valid_lock_combination(locked: &LockedFields, starter_unit: StarterUnit) -> bool {
    match locked.count() {
        0..=2 => true,
        3 => {
            locked.dough_weight
                && locked.hydration
                && locked.starter
                && starter_unit == StarterUnit::Percentage
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LockableField;

    fn locks(fields: &[LockableField]) -> LockedFields {
        fields
            .iter()
            .fold(LockedFields::default(), |acc, f| acc.with(*f, true))
    }

    #[test]
    fn test_up_to_two_always_valid() {
        use LockableField::*;
        for unit in [StarterUnit::Grams, StarterUnit::Percentage] {
            assert!(is_valid_lock_combination(&locks(&[]), unit));
            for a in LockableField::ALL {
                assert!(is_valid_lock_combination(&locks(&[a]), unit));
                for b in LockableField::ALL {
                    assert!(is_valid_lock_combination(&locks(&[a, b]), unit));
                }
            }
            assert!(is_valid_lock_combination(&locks(&[FlourWeight, Hydration]), unit));
        }
    }

    #[test]
    fn test_three_lock_exception() {
        use LockableField::*;
        let exception = locks(&[DoughWeight, Hydration, Starter]);
        assert!(is_valid_lock_combination(&exception, StarterUnit::Percentage));
        assert!(!is_valid_lock_combination(&exception, StarterUnit::Grams));

        let other = locks(&[FlourWeight, Hydration, Starter]);
        assert!(!is_valid_lock_combination(&other, StarterUnit::Percentage));
        let other = locks(&[DoughWeight, FlourWeight, Hydration]);
        assert!(!is_valid_lock_combination(&other, StarterUnit::Percentage));
    }

    #[test]
    fn test_four_locks_invalid() {
        let all = locks(&LockableField::ALL);
        assert!(!is_valid_lock_combination(&all, StarterUnit::Percentage));
        assert!(!is_valid_lock_combination(&all, StarterUnit::Grams));
    }
}
