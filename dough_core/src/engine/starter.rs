//! Starter component resolution
//!
//! Splits the starter mass into the flour and water it carries, using the
//! starter's own hydration.

use serde::{Deserialize, Serialize};

use crate::settings::{StarterSettings, StarterUnit};

/// Mass of the starter and the flour/water it contributes, in grams.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StarterComponents {
    pub amount: f64,
    pub flour: f64,
    pub water: f64,
}

impl StarterComponents {
    /// Split a starter mass by its hydration.
    ///
    /// # Example
    /// ```
    /// use dough_core::engine::StarterComponents;
    ///
    /// // 100% hydration: equal parts flour and water
    /// let s = StarterComponents::from_amount(200.0, 100.0);
    /// assert_eq!(s.flour, 100.0);
    /// assert_eq!(s.water, 100.0);
    /// ```
    pub fn from_amount(amount: f64, starter_hydration: f64) -> Self {
        let flour = amount / (1.0 + starter_hydration / 100.0);
        StarterComponents {
            amount,
            flour,
            water: amount - flour,
        }
    }

    /// Resolve the starter against a total flour mass.
    ///
    /// Gram starters ignore `total_flour`; percentage starters take
    /// `amount` percent of it.
    pub fn resolve(starter: &StarterSettings, total_flour: f64) -> Self {
        let amount = match starter.unit {
            StarterUnit::Percentage => total_flour * (starter.amount / 100.0),
            StarterUnit::Grams => starter.amount,
        };
        StarterComponents::from_amount(amount, starter.hydration)
    }
}

/// Flour mass to resolve the starter against before any branch runs.
///
/// The previous recipe's total flour is preferred once it is known; a fresh
/// engine (or a zero/NaN total) falls back to the flour weight setting.
pub fn provisional_flour(previous_total_flour: f64, flour_weight: f64) -> f64 {
    if previous_total_flour != 0.0 && !previous_total_flour.is_nan() {
        previous_total_flour
    } else {
        flour_weight
    }
}
