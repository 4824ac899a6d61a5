//! Finishing computations
//!
//! Turns a solver [`Solution`] into the user-facing [`Recipe`]: flour
//! breakdown, salt, actual hydration, dough weight, and the flour/water still
//! to be added on top of the starter. Runs after every branch.

use super::solvers::Solution;
use crate::recipe::{round_half_up, round_tenth, FlourAmount, Recipe};
use crate::settings::Settings;

/// Build the recipe for a solution.
///
/// The flour breakdown is computed over flour-to-add, not total flour: the
/// starter's flour is already in the starter.
pub fn finish(settings: &Settings, solution: &Solution) -> Recipe {
    let total_flour = solution.total_flour;
    let total_water = solution.total_water;
    let starter = solution.starter;
    let added_flour = total_flour - starter.flour;

    let flour_breakdown = settings
        .flour_blend
        .iter()
        .map(|flour| FlourAmount {
            flour_type: flour.flour_type,
            amount: round_tenth(added_flour * (flour.percentage / 100.0)),
            percentage: flour.percentage,
        })
        .collect();

    let salt = round_tenth(total_flour * (settings.salt / 100.0));

    Recipe {
        total_flour,
        total_water,
        starter_amount: starter.amount,
        starter_flour: starter.flour,
        starter_water: starter.water,
        flour_breakdown,
        salt,
        actual_hydration: round_half_up(total_water / total_flour * 1000.0) / 10.0,
        total_dough_weight: total_flour + total_water + salt,
        flour_to_add: round_tenth(added_flour),
        water_to_add: round_tenth(total_water - starter.water),
    }
}
