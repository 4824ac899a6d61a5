//! # Solver Branches
//!
//! One pure function per [`SolveMode`]. Each takes the current settings and
//! the starter components resolved against the provisional flour, and returns
//! total flour, total water, the final starter split, and the settings values
//! it derived (`flour_weight`, `dough_weight`, `hydration`).
//!
//! Hydration and salt are percentages of **total** flour, starter flour
//! included.
//!
//! ## Known approximations
//!
//! - The base-flour solve used when the starter is fixed in grams
//!   ([`base_flour_solve`]) substitutes a first-pass flour estimate into the
//!   salt term once instead of solving the implicit equation. The error is a
//!   fraction of a gram for ordinary formulas.
//! - `FlourAndHydration` writes the dough weight unrounded while the other
//!   modes round it to whole grams.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::solve_mode::SolveMode;
use super::starter::StarterComponents;
use crate::recipe::{round_half_up, round_tenth};
use crate::settings::{Settings, StarterUnit};

/// Flour mass assumed when a percentage starter has nothing to scale against.
pub const BOOTSTRAP_FLOUR_G: f64 = 1000.0;

/// Output of one solver branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub mode: SolveMode,
    pub total_flour: f64,
    pub total_water: f64,
    pub starter: StarterComponents,
    /// Derived flour weight to store back into settings
    pub flour_weight: Option<f64>,
    /// Derived dough weight to store back into settings
    pub dough_weight: Option<f64>,
    /// Derived hydration to store back into settings
    pub hydration: Option<f64>,
}

impl Solution {
    fn new(mode: SolveMode, total_flour: f64, total_water: f64, starter: StarterComponents) -> Self {
        Solution {
            mode,
            total_flour,
            total_water,
            starter,
            flour_weight: None,
            dough_weight: None,
            hydration: None,
        }
    }

    fn with_flour_weight(mut self, grams: f64) -> Self {
        self.flour_weight = Some(grams);
        self
    }

    fn with_dough_weight(mut self, grams: f64) -> Self {
        self.dough_weight = Some(grams);
        self
    }

    fn with_hydration(mut self, percent: f64) -> Self {
        self.hydration = Some(percent);
        self
    }
}

/// Run the solver for `mode`.
///
/// `initial` is the starter resolved against the provisional flour at the
/// start of the recalculation; branches that know the final flour resolve it
/// again.
pub fn solve(mode: SolveMode, settings: &Settings, initial: StarterComponents) -> Solution {
    let solution = match mode {
        SolveMode::DoughWeightAndHydration => dough_weight_and_hydration(settings, initial),
        SolveMode::FlourHydrationAndStarter => flour_hydration_and_starter(settings, initial),
        SolveMode::FlourAndDoughWeight => flour_and_dough_weight(settings, initial),
        SolveMode::FlourAndHydration => flour_and_hydration(settings),
        SolveMode::DoughWeightAndStarter => dough_weight_and_starter(settings, initial),
        SolveMode::FlourWeight => flour_weight(settings, SolveMode::FlourWeight),
        SolveMode::DoughWeight => dough_weight(settings),
        SolveMode::Hydration => hydration(settings),
        SolveMode::Starter => starter(settings),
        SolveMode::Unanchored => flour_weight(settings, SolveMode::Unanchored),
    };

    debug!(
        mode = %solution.mode,
        total_flour = solution.total_flour,
        total_water = solution.total_water,
        starter_g = solution.starter.amount,
        starter_flour = solution.starter.flour,
        starter_water = solution.starter.water,
        "solved formula"
    );
    solution
}

fn pct(value: f64) -> f64 {
    value / 100.0
}

/// Flour and water when the starter is a fixed mass and dough weight is the target.
///
/// Returns `(total_flour, total_water)`. The flour added on top of the starter
/// is solved from `dough = base + base·h + starter + salt`, with the salt
/// term taken from the first-pass estimate `dough / (1 + h + s)`.
fn base_flour_solve(settings: &Settings, starter: &StarterComponents) -> (f64, f64) {
    let h = pct(settings.hydration);
    let s = pct(settings.salt);

    let first_pass = settings.dough_weight / (1.0 + h + s);
    let base_flour = (settings.dough_weight - starter.amount - first_pass * s) / (1.0 + h);
    debug!(first_pass, base_flour, "base flour solve");

    (base_flour + starter.flour, base_flour * h + starter.water)
}

fn dough_weight_and_hydration(settings: &Settings, initial: StarterComponents) -> Solution {
    let mode = SolveMode::DoughWeightAndHydration;
    let h = pct(settings.hydration);
    let s = pct(settings.salt);

    if settings.starter.unit == StarterUnit::Percentage {
        let ratio = pct(settings.starter.amount);
        let flour_factor = 1.0 / (1.0 + pct(settings.starter.hydration));
        let water_factor = 1.0 - flour_factor;

        let total_flour =
            settings.dough_weight / (1.0 + h + s + ratio * (water_factor - h * flour_factor));
        let starter = StarterComponents::resolve(&settings.starter, total_flour);

        Solution::new(mode, total_flour, total_flour * h, starter)
            .with_flour_weight(round_half_up(total_flour))
    } else {
        let (total_flour, total_water) = base_flour_solve(settings, &initial);
        Solution::new(mode, total_flour, total_water, initial)
            .with_flour_weight(round_half_up(total_flour))
    }
}

fn flour_hydration_and_starter(settings: &Settings, initial: StarterComponents) -> Solution {
    let total_flour = settings.flour_weight;
    let total_water = total_flour * pct(settings.hydration);
    let dough = total_flour + total_water + total_flour * pct(settings.salt);

    Solution::new(SolveMode::FlourHydrationAndStarter, total_flour, total_water, initial)
        .with_dough_weight(round_half_up(dough))
}

fn flour_and_dough_weight(settings: &Settings, initial: StarterComponents) -> Solution {
    let total_flour = settings.flour_weight;
    let starter = match settings.starter.unit {
        StarterUnit::Percentage => StarterComponents::resolve(&settings.starter, total_flour),
        StarterUnit::Grams => initial,
    };
    let total_water = settings.dough_weight - total_flour - total_flour * pct(settings.salt);

    Solution::new(SolveMode::FlourAndDoughWeight, total_flour, total_water, starter)
        .with_hydration(round_half_up(total_water / total_flour * 100.0))
}

fn flour_and_hydration(settings: &Settings) -> Solution {
    let mode = SolveMode::FlourAndHydration;
    let total_flour = settings.flour_weight;
    let starter = StarterComponents::resolve(&settings.starter, total_flour);
    let salt = total_flour * pct(settings.salt);

    if settings.locked.dough_weight {
        // Dispatch never lands here with dough locked: FlourAndDoughWeight matches first.
        let total_water = settings.dough_weight - total_flour - salt;
        return Solution::new(mode, total_flour, total_water, starter);
    }

    // Target water already includes what the starter brings.
    let total_water = total_flour * pct(settings.hydration);
    debug!(water_to_add = total_water - starter.water, "flour and hydration");

    Solution::new(mode, total_flour, total_water, starter)
        .with_dough_weight(total_flour + total_water + salt)
}

fn dough_weight_and_starter(settings: &Settings, initial: StarterComponents) -> Solution {
    let (total_flour, total_water) = base_flour_solve(settings, &initial);
    Solution::new(SolveMode::DoughWeightAndStarter, total_flour, total_water, initial)
        .with_flour_weight(round_half_up(total_flour))
}

fn flour_weight(settings: &Settings, mode: SolveMode) -> Solution {
    let total_flour = settings.flour_weight;
    let starter = StarterComponents::resolve(&settings.starter, total_flour);
    let salt = total_flour * pct(settings.salt);

    let mut derived_hydration = None;
    let total_water = if settings.locked.hydration {
        total_flour * pct(settings.hydration)
    } else if settings.locked.dough_weight {
        let water = settings.dough_weight - total_flour - salt;
        derived_hydration = Some(water / total_flour * 100.0);
        water
    } else {
        total_flour * pct(settings.hydration)
    };

    let mut solution = Solution::new(mode, total_flour, total_water, starter)
        .with_dough_weight(round_half_up(total_flour + total_water + salt));
    solution.hydration = derived_hydration;
    solution
}

fn dough_weight(settings: &Settings) -> Solution {
    let h = pct(settings.hydration);
    let s = pct(settings.salt);

    let (total_flour, total_water, derived_hydration) = if settings.locked.flour_weight {
        let flour = settings.flour_weight;
        let water = settings.dough_weight - flour - flour * s;
        (flour, water, Some(water / flour * 100.0))
    } else {
        // Locked or not, the current hydration is the one to honour.
        let flour = settings.dough_weight / (1.0 + h + s);
        (flour, flour * h, None)
    };

    let starter = StarterComponents::resolve(&settings.starter, total_flour);
    let mut solution = Solution::new(SolveMode::DoughWeight, total_flour, total_water, starter)
        .with_flour_weight(round_half_up(total_flour));
    solution.hydration = derived_hydration;
    solution
}

fn hydration(settings: &Settings) -> Solution {
    // Solve against the whole-gram flour that is written back.
    let total_flour = round_half_up(settings.flour_weight);
    let starter = StarterComponents::resolve(&settings.starter, total_flour);
    let total_water = total_flour * pct(settings.hydration);
    let salt = round_tenth(total_flour * pct(settings.salt));

    Solution::new(SolveMode::Hydration, total_flour, total_water, starter)
        .with_flour_weight(round_half_up(total_flour))
        .with_dough_weight(round_half_up(total_flour + total_water + salt))
}

fn starter(settings: &Settings) -> Solution {
    let h = pct(settings.hydration);
    let s = pct(settings.salt);
    let locked = &settings.locked;

    let total_flour = if locked.flour_weight {
        settings.flour_weight
    } else if locked.dough_weight {
        let bootstrap = StarterComponents::resolve(&settings.starter, BOOTSTRAP_FLOUR_G);
        (settings.dough_weight - bootstrap.amount) / (1.0 + h + s)
    } else {
        match settings.starter.unit {
            StarterUnit::Percentage => BOOTSTRAP_FLOUR_G,
            StarterUnit::Grams => settings.flour_weight,
        }
    };

    let starter = StarterComponents::resolve(&settings.starter, total_flour);
    let total_water = total_flour * h;

    Solution::new(SolveMode::Starter, total_flour, total_water, starter)
        .with_dough_weight(round_half_up(total_flour + total_water + total_flour * s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{LockedFields, StarterSettings};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    fn settings_with(locked: LockedFields) -> Settings {
        Settings {
            locked,
            ..Settings::default()
        }
    }

    fn pct_starter(amount: f64) -> StarterSettings {
        StarterSettings {
            amount,
            unit: StarterUnit::Percentage,
            hydration: 100.0,
        }
    }

    fn run(mode: SolveMode, settings: &Settings) -> Solution {
        let initial = StarterComponents::resolve(&settings.starter, settings.flour_weight);
        solve(mode, settings, initial)
    }

    #[test]
    fn test_dough_and_hydration_gram_starter() {
        let mut s = settings_with(LockedFields {
            dough_weight: true,
            hydration: true,
            starter: true,
            ..Default::default()
        });
        s.dough_weight = 1770.0;

        let sol = run(SolveMode::DoughWeightAndHydration, &s);
        // base = (1770 - 200 - 1000 * 0.02) / 1.75 = 885.714
        assert!(close(sol.total_flour, 985.714));
        assert!(close(sol.total_water, 885.714 * 0.75 + 100.0));
        assert_eq!(sol.flour_weight, Some(986.0));
        assert_eq!(sol.starter.amount, 200.0);
    }

    #[test]
    fn test_dough_and_hydration_percentage_starter() {
        let mut s = settings_with(LockedFields {
            dough_weight: true,
            hydration: true,
            ..Default::default()
        });
        s.dough_weight = 1770.0;
        s.starter = pct_starter(20.0);

        let sol = run(SolveMode::DoughWeightAndHydration, &s);
        // denominator = 1.77 + 0.2 * (0.5 - 0.75 * 0.5) = 1.795
        let expected = 1770.0 / 1.795;
        assert!(close(sol.total_flour, expected));
        assert!(close(sol.starter.amount, expected * 0.2));
        assert!(close(sol.total_water, expected * 0.75));
        assert_eq!(sol.flour_weight, Some(986.0));
    }

    #[test]
    fn test_flour_hydration_and_starter() {
        let s = settings_with(LockedFields {
            flour_weight: true,
            hydration: true,
            starter: true,
            ..Default::default()
        });
        let sol = run(SolveMode::FlourHydrationAndStarter, &s);
        assert_eq!(sol.total_flour, 1000.0);
        assert_eq!(sol.total_water, 750.0);
        assert_eq!(sol.dough_weight, Some(1770.0));
    }

    #[test]
    fn test_flour_and_dough_weight_derives_hydration() {
        let mut s = settings_with(LockedFields {
            flour_weight: true,
            dough_weight: true,
            ..Default::default()
        });
        s.dough_weight = 1800.0;
        let sol = run(SolveMode::FlourAndDoughWeight, &s);
        assert_eq!(sol.total_water, 780.0);
        assert_eq!(sol.hydration, Some(78.0));
        assert_eq!(sol.flour_weight, None);
    }

    #[test]
    fn test_flour_and_hydration_unrounded_dough() {
        let mut s = settings_with(LockedFields {
            flour_weight: true,
            hydration: true,
            ..Default::default()
        });
        s.flour_weight = 1000.5;
        let sol = run(SolveMode::FlourAndHydration, &s);
        let expected = 1000.5 * (1.0 + 0.75 + 0.02);
        assert!((sol.dough_weight.unwrap() - expected).abs() < 1e-9);
        assert_ne!(sol.dough_weight.unwrap(), sol.dough_weight.unwrap().round());
    }

    #[test]
    fn test_flour_and_hydration_with_dough_locked() {
        let mut s = settings_with(LockedFields {
            flour_weight: true,
            hydration: true,
            dough_weight: true,
            ..Default::default()
        });
        s.dough_weight = 1800.0;
        let sol = run(SolveMode::FlourAndHydration, &s);
        assert_eq!(sol.total_water, 780.0);
        assert_eq!(sol.dough_weight, None);
    }

    #[test]
    fn test_dough_weight_and_starter() {
        let mut s = settings_with(LockedFields {
            dough_weight: true,
            starter: true,
            ..Default::default()
        });
        s.dough_weight = 1770.0;
        let sol = run(SolveMode::DoughWeightAndStarter, &s);
        assert!(close(sol.total_flour, 985.714));
        assert_eq!(sol.flour_weight, Some(986.0));
    }

    #[test]
    fn test_flour_weight_water_sources() {
        // Hydration locked
        let s = settings_with(LockedFields {
            flour_weight: true,
            hydration: true,
            ..Default::default()
        });
        assert_eq!(run(SolveMode::FlourWeight, &s).total_water, 750.0);

        // Dough weight locked: hydration back-solved, unrounded
        let mut s = settings_with(LockedFields {
            flour_weight: true,
            dough_weight: true,
            ..Default::default()
        });
        s.dough_weight = 1785.5;
        let sol = run(SolveMode::FlourWeight, &s);
        assert!(close(sol.total_water, 765.5));
        assert!(close(sol.hydration.unwrap(), 76.55));

        // Neither: current hydration, dough weight rounded
        let s = Settings::default();
        let sol = run(SolveMode::FlourWeight, &s);
        assert_eq!(sol.total_water, 750.0);
        assert_eq!(sol.dough_weight, Some(1770.0));
        assert_eq!(sol.hydration, None);
    }

    #[test]
    fn test_dough_weight_only() {
        let mut s = settings_with(LockedFields {
            dough_weight: true,
            ..Default::default()
        });
        s.dough_weight = 1770.0;
        let sol = run(SolveMode::DoughWeight, &s);
        assert!(close(sol.total_flour, 1000.0));
        assert!(close(sol.total_water, 750.0));
        assert_eq!(sol.flour_weight, Some(1000.0));

        s.starter = pct_starter(10.0);
        let sol = run(SolveMode::DoughWeight, &s);
        assert!(close(sol.starter.amount, 100.0));
    }

    #[test]
    fn test_hydration_only() {
        let mut s = settings_with(LockedFields {
            hydration: true,
            ..Default::default()
        });
        s.hydration = 80.0;
        let sol = run(SolveMode::Hydration, &s);
        assert!(close(sol.total_water, 800.0));
        assert_eq!(sol.flour_weight, Some(1000.0));
        assert_eq!(sol.dough_weight, Some(1820.0));

        s.flour_weight = 1000.5;
        let sol = run(SolveMode::Hydration, &s);
        assert_eq!(sol.total_flour, 1001.0);
        assert_eq!(sol.flour_weight, Some(1001.0));
        assert!(close(sol.total_water, 800.8));
    }

    #[test]
    fn test_starter_only() {
        let s = settings_with(LockedFields {
            starter: true,
            ..Default::default()
        });
        let sol = run(SolveMode::Starter, &s);
        assert_eq!(sol.total_flour, 1000.0);
        assert_eq!(sol.dough_weight, Some(1770.0));

        // Percentage starter with nothing to scale against bootstraps from 1000 g
        let mut s = s;
        s.flour_weight = 500.0;
        s.starter = pct_starter(25.0);
        let sol = run(SolveMode::Starter, &s);
        assert_eq!(sol.total_flour, BOOTSTRAP_FLOUR_G);
        assert_eq!(sol.starter.amount, 250.0);
    }

    #[test]
    fn test_starter_with_dough_refines_once() {
        let mut s = settings_with(LockedFields {
            starter: true,
            dough_weight: true,
            ..Default::default()
        });
        s.dough_weight = 1970.0;
        s.starter = pct_starter(20.0);
        let sol = run(SolveMode::Starter, &s);
        // bootstrap starter 200 g, then (1970 - 200) / 1.77 = 1000
        assert!(close(sol.total_flour, 1000.0));
        assert!(close(sol.starter.amount, 200.0));
    }

    #[test]
    fn test_unanchored_matches_flour_weight() {
        let s = Settings::default();
        let a = run(SolveMode::Unanchored, &s);
        let b = run(SolveMode::FlourWeight, &s);
        assert_eq!(a.mode, SolveMode::Unanchored);
        assert_eq!((a.total_flour, a.total_water, a.dough_weight), (b.total_flour, b.total_water, b.dough_weight));
    }
}
