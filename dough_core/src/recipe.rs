//! # Derived Recipe
//!
//! The quantities the engine solves for. A `Recipe` is never edited directly;
//! it is rebuilt from [`Settings`](crate::settings::Settings) after every
//! mutation.

use serde::{Deserialize, Serialize};

use crate::flour::FlourType;
use crate::settings::Settings;

/// Round half up to a whole number (`floor(x + 0.5)`).
///
/// Differs from [`f64::round`] for negative halves: `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round half up to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Grams of one flour in the blend, computed over the flour to add.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlourAmount {
    #[serde(rename = "type")]
    pub flour_type: FlourType,
    pub amount: f64,
    pub percentage: f64,
}

/// Fully solved formula.
///
/// `total_flour` and `total_water` include what the starter contributes;
/// `flour_to_add` and `water_to_add` exclude it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub total_flour: f64,
    pub total_water: f64,
    pub starter_amount: f64,
    pub starter_flour: f64,
    pub starter_water: f64,
    pub flour_breakdown: Vec<FlourAmount>,
    /// Salt mass in grams, one decimal
    pub salt: f64,
    /// Water over flour in percent, one decimal
    pub actual_hydration: f64,
    pub total_dough_weight: f64,
    pub flour_to_add: f64,
    pub water_to_add: f64,
}

impl Recipe {
    /// Starter mass as a percent of total flour (baker's percentage).
    pub fn starter_percentage(&self) -> f64 {
        if self.total_flour == 0.0 {
            return 0.0;
        }
        self.starter_amount / self.total_flour * 100.0
    }

    /// Plain-text formula card suitable for pasting into notes.
    ///
    /// # Example
    /// ```
    /// use dough_core::engine::RecipeEngine;
    ///
    /// let engine = RecipeEngine::new();
    /// let card = engine.recipe().formula_card(engine.settings());
    /// assert!(card.contains("Total Dough Weight: 1770g"));
    /// assert!(card.contains("Bread Flour: 810g (90%)"));
    /// ```
    pub fn formula_card(&self, settings: &Settings) -> String {
        let mut out = String::from("=== DOUGH FORMULA ===\n\n");

        out.push_str(&format!(
            "Total Dough Weight: {}g\n",
            round_half_up(self.total_dough_weight)
        ));
        out.push_str(&format!("Hydration: {}%\n\n", self.actual_hydration));

        out.push_str("INGREDIENTS:\n");
        out.push_str(&format!("Total Flour: {}g\n", round_half_up(self.total_flour)));
        out.push_str(&format!("Flour to add: {}g\n", round_half_up(self.flour_to_add)));
        out.push_str(&format!("Total Water: {}g\n", round_half_up(self.total_water)));
        out.push_str(&format!("Water to add: {}g\n", round_half_up(self.water_to_add)));
        out.push_str(&format!(
            "Starter: {}g ({}% hydration)\n",
            round_half_up(self.starter_amount),
            settings.starter.hydration
        ));
        out.push_str(&format!(
            "  - Contains: {}g flour, {}g water\n",
            round_half_up(self.starter_flour),
            round_half_up(self.starter_water)
        ));
        out.push_str(&format!("Salt: {}g\n\n", self.salt));

        out.push_str("FLOUR BREAKDOWN:\n");
        for flour in &self.flour_breakdown {
            out.push_str(&format!(
                "{}: {}g ({}%)\n",
                flour.flour_type.display_name(),
                round_half_up(flour.amount),
                round_tenth(flour.percentage)
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(1769.4), 1769.0);
        assert_eq!(round_tenth(19.714), 19.7);
        assert_eq!(round_tenth(0.25), 0.3);
    }

    #[test]
    fn test_recipe_json_keys() {
        let recipe = Recipe {
            total_flour: 1000.0,
            flour_breakdown: vec![FlourAmount {
                flour_type: FlourType::Rye,
                amount: 900.0,
                percentage: 100.0,
            }],
            ..Recipe::default()
        };
        let json = serde_json::to_string(&recipe).unwrap();
        assert!(json.contains("\"totalFlour\":1000"));
        assert!(json.contains("\"flourToAdd\""));
        assert!(json.contains("\"type\":\"rye\""));
    }

    #[test]
    fn test_starter_percentage() {
        let recipe = Recipe {
            total_flour: 1000.0,
            starter_amount: 200.0,
            ..Recipe::default()
        };
        assert_eq!(recipe.starter_percentage(), 20.0);
        assert_eq!(Recipe::default().starter_percentage(), 0.0);
    }
}
