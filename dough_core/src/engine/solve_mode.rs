//! Solve-mode selection
//!
//! Which closed-form path the engine takes is a pure function of the lock
//! flags (and, for the first mode, the starter unit). Modes are checked in
//! [`SolveMode::PRIORITY`] order and the first match wins.

use serde::{Deserialize, Serialize};

use crate::settings::{LockedFields, StarterUnit};

/// The solver branch chosen for a set of locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveMode {
    /// Dough weight + hydration locked, with the starter locked or percentage-based
    DoughWeightAndHydration,
    /// Flour weight + hydration + starter locked
    FlourHydrationAndStarter,
    /// Flour weight + dough weight locked
    FlourAndDoughWeight,
    /// Flour weight + hydration locked
    FlourAndHydration,
    /// Dough weight + starter locked
    DoughWeightAndStarter,
    /// Flour weight is the only anchor
    FlourWeight,
    /// Dough weight is the only anchor
    DoughWeight,
    /// Hydration is the only anchor
    Hydration,
    /// Starter is the only anchor
    Starter,
    /// Nothing locked; solved like `FlourWeight`
    Unanchored,
}

impl SolveMode {
    /// Modes in dispatch priority order
    pub const PRIORITY: [SolveMode; 10] = [
        SolveMode::DoughWeightAndHydration,
        SolveMode::FlourHydrationAndStarter,
        SolveMode::FlourAndDoughWeight,
        SolveMode::FlourAndHydration,
        SolveMode::DoughWeightAndStarter,
        SolveMode::FlourWeight,
        SolveMode::DoughWeight,
        SolveMode::Hydration,
        SolveMode::Starter,
        SolveMode::Unanchored,
    ];

    /// Pick the solve mode for a lock set.
    ///
    /// # Example
    /// ```
    /// use dough_core::engine::SolveMode;
    /// use dough_core::settings::{LockedFields, StarterUnit};
    ///
    /// let locks = LockedFields { flour_weight: true, hydration: true, ..Default::default() };
    /// assert_eq!(SolveMode::from_locks(&locks, StarterUnit::Grams), SolveMode::FlourAndHydration);
    /// assert_eq!(SolveMode::from_locks(&LockedFields::default(), StarterUnit::Grams), SolveMode::Unanchored);
    /// ```
    pub fn from_locks(locked: &LockedFields, starter_unit: StarterUnit) -> SolveMode {
        SolveMode::PRIORITY
            .iter()
            .copied()
            .find(|mode| mode.matches(locked, starter_unit))
            .unwrap_or(SolveMode::Unanchored)
    }

    /// Whether this mode's lock condition holds.
    pub fn matches(&self, locked: &LockedFields, starter_unit: StarterUnit) -> bool {
        match self {
            SolveMode::DoughWeightAndHydration => {
                locked.dough_weight
                    && locked.hydration
                    && (locked.starter || starter_unit == StarterUnit::Percentage)
            }
            SolveMode::FlourHydrationAndStarter => {
                locked.flour_weight && locked.hydration && locked.starter
            }
            SolveMode::FlourAndDoughWeight => locked.flour_weight && locked.dough_weight,
            SolveMode::FlourAndHydration => locked.flour_weight && locked.hydration,
            SolveMode::DoughWeightAndStarter => locked.dough_weight && locked.starter,
            SolveMode::FlourWeight => locked.flour_weight,
            SolveMode::DoughWeight => locked.dough_weight,
            SolveMode::Hydration => locked.hydration,
            SolveMode::Starter => locked.starter,
            SolveMode::Unanchored => true,
        }
    }

    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            SolveMode::DoughWeightAndHydration => "dough weight and hydration",
            SolveMode::FlourHydrationAndStarter => "flour weight, hydration and starter",
            SolveMode::FlourAndDoughWeight => "flour weight and dough weight",
            SolveMode::FlourAndHydration => "flour weight and hydration",
            SolveMode::DoughWeightAndStarter => "dough weight and starter",
            SolveMode::FlourWeight => "flour weight",
            SolveMode::DoughWeight => "dough weight",
            SolveMode::Hydration => "hydration",
            SolveMode::Starter => "starter",
            SolveMode::Unanchored => "nothing locked",
        }
    }
}

impl std::fmt::Display for SolveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locks(dough: bool, flour: bool, hydration: bool, starter: bool) -> LockedFields {
        LockedFields {
            dough_weight: dough,
            flour_weight: flour,
            hydration,
            starter,
        }
    }

    #[test]
    fn test_dough_and_hydration_needs_starter_anchor() {
        let grams = StarterUnit::Grams;
        let pct = StarterUnit::Percentage;

        // Percentage starter anchors itself
        assert_eq!(
            SolveMode::from_locks(&locks(true, false, true, false), pct),
            SolveMode::DoughWeightAndHydration
        );
        // Gram starter without a lock falls through to the dough-only mode
        assert_eq!(
            SolveMode::from_locks(&locks(true, false, true, false), grams),
            SolveMode::DoughWeight
        );
        assert_eq!(
            SolveMode::from_locks(&locks(true, false, true, true), grams),
            SolveMode::DoughWeightAndHydration
        );
    }

    #[test]
    fn test_pairs() {
        let g = StarterUnit::Grams;
        assert_eq!(SolveMode::from_locks(&locks(true, true, false, false), g), SolveMode::FlourAndDoughWeight);
        assert_eq!(SolveMode::from_locks(&locks(false, true, true, false), g), SolveMode::FlourAndHydration);
        assert_eq!(SolveMode::from_locks(&locks(true, false, false, true), g), SolveMode::DoughWeightAndStarter);
        // Flour + starter has no dedicated mode
        assert_eq!(SolveMode::from_locks(&locks(false, true, false, true), g), SolveMode::FlourWeight);
        // Hydration + starter has none either
        assert_eq!(SolveMode::from_locks(&locks(false, false, true, true), g), SolveMode::Hydration);
    }

    #[test]
    fn test_singles_and_default() {
        let g = StarterUnit::Grams;
        assert_eq!(SolveMode::from_locks(&locks(false, true, false, false), g), SolveMode::FlourWeight);
        assert_eq!(SolveMode::from_locks(&locks(true, false, false, false), g), SolveMode::DoughWeight);
        assert_eq!(SolveMode::from_locks(&locks(false, false, true, false), g), SolveMode::Hydration);
        assert_eq!(SolveMode::from_locks(&locks(false, false, false, true), g), SolveMode::Starter);
        assert_eq!(SolveMode::from_locks(&locks(false, false, false, false), g), SolveMode::Unanchored);
    }

    #[test]
    fn test_priority_is_first_match() {
        // Flour + hydration + starter outranks flour + hydration
        let all_three = locks(false, true, true, true);
        assert_eq!(
            SolveMode::from_locks(&all_three, StarterUnit::Grams),
            SolveMode::FlourHydrationAndStarter
        );
        // Every lock set matches at least one mode, and the chosen one is the
        // earliest match in priority order.
        for bits in 0..16u8 {
            let l = locks(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
            for unit in [StarterUnit::Grams, StarterUnit::Percentage] {
                let chosen = SolveMode::from_locks(&l, unit);
                let first = SolveMode::PRIORITY.iter().position(|m| m.matches(&l, unit)).unwrap();
                assert_eq!(SolveMode::PRIORITY[first], chosen);
            }
        }
    }
}
