//! # Recipe Engine
//!
//! Holds the live [`Settings`] and the [`Recipe`] derived from them. Every
//! mutation goes through a [`Command`] (or `lock_value`), is validated against
//! a scratch copy, and is followed by one full recalculation, so callers only
//! ever observe a consistent recipe.
//!
//! ## Recalculation pipeline
//!
//! 1. Resolve the starter against the provisional flour
//!    ([`starter::provisional_flour`]).
//! 2. Pick a [`SolveMode`] from the locks.
//! 3. Run the mode's solver ([`solvers::solve`]).
//! 4. Write derived values back into unlocked settings.
//! 5. Build the recipe ([`finish::finish`]).
//!
//! ## Example
//!
//! ```rust
//! use dough_core::engine::{Command, RecipeEngine};
//! use dough_core::settings::LockableField;
//!
//! let mut engine = RecipeEngine::new();
//! engine.lock_value(LockableField::FlourWeight, true).unwrap();
//! engine.lock_value(LockableField::Hydration, true).unwrap();
//!
//! let recipe = engine.apply(Command::SetHydration(80.0)).unwrap();
//! assert_eq!(recipe.total_water, 800.0);
//! assert_eq!(recipe.water_to_add, 700.0);
//!
//! // A third lock outside the recognized exception is rejected
//! assert!(engine.lock_value(LockableField::DoughWeight, true).is_err());
//! ```

pub mod finish;
pub mod locks;
pub mod solve_mode;
pub mod solvers;
pub mod starter;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use locks::is_valid_lock_combination;
pub use solve_mode::SolveMode;
pub use solvers::Solution;
pub use starter::StarterComponents;

use crate::errors::{DoughError, DoughResult};
use crate::flour::{normalize_blend, FlourBlendEntry};
use crate::library::SavedFormula;
use crate::recipe::{round_half_up, Recipe};
use crate::settings::{LockableField, LockedFields, Settings, StarterUnit};
use crate::timeline::TimelineStep;

/// A single settings mutation.
///
/// Serializes as `{"command": "SetHydration", "value": 78}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value")]
pub enum Command {
    SetDoughWeight(f64),
    SetFlourWeight(f64),
    SetHydration(f64),
    SetSalt(f64),
    SetStarterAmount(f64),
    SetStarterUnit(StarterUnit),
    SetStarterHydration(f64),
    SetFlourBlend(Vec<FlourBlendEntry>),
    SetLock(LockableField, bool),
}

impl Command {
    /// Parse a `key = value` pair using the saved-formula key names.
    ///
    /// Nested starter fields use dotted keys (`starter.amount`,
    /// `starter.unit`, `starter.hydration`).
    ///
    /// # Example
    /// ```
    /// use dough_core::engine::Command;
    /// use dough_core::settings::StarterUnit;
    ///
    /// assert_eq!(Command::from_key_value("starter.amount", "20").unwrap(), Command::SetStarterAmount(20.0));
    /// assert_eq!(Command::from_key_value("starter.unit", "percentage").unwrap(), Command::SetStarterUnit(StarterUnit::Percentage));
    /// assert!(Command::from_key_value("yeast", "7").is_err());
    /// ```
    pub fn from_key_value(key: &str, value: &str) -> DoughResult<Command> {
        let number = || {
            value.trim().parse::<f64>().map_err(|_| {
                DoughError::invalid_input(key, value, "Expected a number")
            })
        };

        match key {
            "doughWeight" => Ok(Command::SetDoughWeight(number()?)),
            "flourWeight" => Ok(Command::SetFlourWeight(number()?)),
            "hydration" => Ok(Command::SetHydration(number()?)),
            "salt" => Ok(Command::SetSalt(number()?)),
            "starter.amount" => Ok(Command::SetStarterAmount(number()?)),
            "starter.unit" => Ok(Command::SetStarterUnit(value.trim().parse()?)),
            "starter.hydration" => Ok(Command::SetStarterHydration(number()?)),
            _ => Err(DoughError::invalid_input(key, value, "Unknown setting")),
        }
    }

    /// Apply this command to a settings value.
    ///
    /// Numeric inputs are validated here; lock validity is checked by the
    /// engine once the whole batch has been applied.
    fn apply_to(self, settings: &mut Settings) -> DoughResult<()> {
        match self {
            Command::SetDoughWeight(v) => settings.dough_weight = positive("doughWeight", v)?,
            Command::SetFlourWeight(v) => settings.flour_weight = positive("flourWeight", v)?,
            Command::SetHydration(v) => settings.hydration = non_negative("hydration", v)?,
            Command::SetSalt(v) => settings.salt = non_negative("salt", v)?,
            Command::SetStarterAmount(v) => {
                settings.starter.amount = non_negative("starter.amount", v)?
            }
            Command::SetStarterUnit(unit) => settings.starter.unit = unit,
            Command::SetStarterHydration(v) => {
                settings.starter.hydration = non_negative("starter.hydration", v)?
            }
            Command::SetFlourBlend(blend) => settings.flour_blend = normalize_blend(blend)?,
            Command::SetLock(field, locked) => settings.locked = settings.locked.with(field, locked),
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> DoughResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DoughError::invalid_input(field, value.to_string(), "Must be a positive number"));
    }
    Ok(value)
}

fn non_negative(field: &str, value: f64) -> DoughResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DoughError::invalid_input(
            field,
            value.to_string(),
            "Must be zero or a positive number",
        ));
    }
    Ok(value)
}

/// The lock-aware formula engine.
///
/// Owned by its caller; there is no shared global instance.
#[derive(Debug, Clone)]
pub struct RecipeEngine {
    settings: Settings,
    recipe: Recipe,
    mode: SolveMode,
}

impl Default for RecipeEngine {
    fn default() -> Self {
        RecipeEngine::new()
    }
}

impl RecipeEngine {
    /// Engine with the built-in default formula, already calculated.
    pub fn new() -> Self {
        let mut engine = RecipeEngine {
            settings: Settings::default(),
            recipe: Recipe::default(),
            mode: SolveMode::Unanchored,
        };
        engine.calculate();
        engine
    }

    /// Engine starting from the given settings.
    pub fn with_settings(settings: Settings) -> DoughResult<Self> {
        let mut engine = RecipeEngine::new();
        engine.load_settings(settings)?;
        Ok(engine)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Solve mode used by the last recalculation
    pub fn solve_mode(&self) -> SolveMode {
        self.mode
    }

    /// Recompute the recipe from the current settings.
    ///
    /// Derived values are written back into settings fields that are not
    /// locked.
    pub fn calculate(&mut self) -> &Recipe {
        let reference = starter::provisional_flour(self.recipe.total_flour, self.settings.flour_weight);
        let initial = StarterComponents::resolve(&self.settings.starter, reference);

        let mode = SolveMode::from_locks(&self.settings.locked, self.settings.starter.unit);
        debug!(%mode, provisional_flour = reference, "recalculating");

        let solution = solvers::solve(mode, &self.settings, initial);
        self.write_back(&solution);

        self.recipe = finish::finish(&self.settings, &solution);
        self.mode = mode;
        &self.recipe
    }

    fn write_back(&mut self, solution: &Solution) {
        let locked = self.settings.locked;
        if let Some(grams) = solution.flour_weight.filter(|_| !locked.flour_weight) {
            self.settings.flour_weight = grams;
        }
        if let Some(grams) = solution.dough_weight.filter(|_| !locked.dough_weight) {
            self.settings.dough_weight = grams;
        }
        if let Some(percent) = solution.hydration.filter(|_| !locked.hydration) {
            self.settings.hydration = percent;
        }
    }

    /// Apply one command and recalculate.
    pub fn apply(&mut self, command: Command) -> DoughResult<&Recipe> {
        self.apply_all([command])
    }

    /// Apply a batch of commands atomically, then recalculate once.
    ///
    /// If any command fails, or the resulting locks are over-constrained,
    /// nothing is changed.
    pub fn apply_all(&mut self, commands: impl IntoIterator<Item = Command>) -> DoughResult<&Recipe> {
        let mut candidate = self.settings.clone();
        for command in commands {
            command.apply_to(&mut candidate)?;
        }

        let locks_changed = candidate.locked != self.settings.locked
            || candidate.starter.unit != self.settings.starter.unit;
        if locks_changed && !is_valid_lock_combination(&candidate.locked, candidate.starter.unit) {
            return Err(DoughError::too_many_locks());
        }

        self.settings = candidate;
        Ok(self.calculate())
    }

    /// Lock or unlock a field and recalculate.
    ///
    /// Locking fails with `InvalidLockCombination` when it would
    /// over-constrain the formula; the locks are left unchanged. Unlocking is
    /// always allowed, so a loaded over-constrained set can be relaxed one
    /// field at a time.
    pub fn lock_value(&mut self, field: LockableField, locked: bool) -> DoughResult<LockedFields> {
        let candidate = self.settings.locked.with(field, locked);
        if locked && !is_valid_lock_combination(&candidate, self.settings.starter.unit) {
            return Err(DoughError::too_many_locks());
        }

        self.settings.locked = candidate;
        self.calculate();
        Ok(self.settings.locked)
    }

    /// Lock or unlock a field by name (`"doughWeight"`, `"hydration"`, ...).
    pub fn lock_value_by_name(&mut self, field: &str, locked: bool) -> DoughResult<LockedFields> {
        let field: LockableField = field.parse()?;
        self.lock_value(field, locked)
    }

    /// Replace the flour blend (normalized to 100%) and recalculate.
    pub fn update_flour_blend(&mut self, blend: Vec<FlourBlendEntry>) -> DoughResult<&Recipe> {
        self.apply(Command::SetFlourBlend(blend))
    }

    /// Switch the starter between grams and percent of flour, converting the
    /// amount against the current total flour.
    ///
    /// Grams are rounded to whole grams. Percentages keep full precision so
    /// converting back with the same flour lands within a gram.
    pub fn convert_starter_unit(&mut self, unit: StarterUnit) -> DoughResult<&Recipe> {
        let current = self.settings.starter;
        if current.unit == unit {
            return Ok(&self.recipe);
        }

        let total_flour = self.recipe.total_flour;
        let amount = match unit {
            StarterUnit::Percentage => current.amount / total_flour * 100.0,
            StarterUnit::Grams => round_half_up(total_flour * (current.amount / 100.0)),
        };
        debug!(from = %current.unit, to = %unit, amount, total_flour, "converting starter unit");

        self.apply_all([Command::SetStarterAmount(amount), Command::SetStarterUnit(unit)])
    }

    /// Replace all settings and recalculate.
    ///
    /// The blend is normalized and numeric fields validated. Lock sets are
    /// taken as saved, even over-constrained ones, so older formulas still
    /// load; a warning is logged for those.
    pub fn load_settings(&mut self, mut settings: Settings) -> DoughResult<&Recipe> {
        settings.validate()?;
        settings.flour_blend = normalize_blend(settings.flour_blend)?;
        if !is_valid_lock_combination(&settings.locked, settings.starter.unit) {
            warn!(locked = ?settings.locked.locked_fields(), "loaded formula has an over-constrained lock set");
        }

        self.settings = settings;
        self.recipe = Recipe::default();
        Ok(self.calculate())
    }

    /// Load a saved formula's settings.
    pub fn load_recipe(&mut self, saved: &SavedFormula) -> DoughResult<&Recipe> {
        self.load_settings(saved.settings.clone())
    }

    /// Restore the built-in default formula.
    pub fn reset(&mut self) -> &Recipe {
        self.settings = Settings::default();
        self.recipe = Recipe::default();
        self.calculate()
    }

    /// Current state as a saveable formula.
    pub fn snapshot(&self, timeline: Vec<TimelineStep>) -> SavedFormula {
        SavedFormula {
            settings: self.settings.clone(),
            recipe: self.recipe.clone(),
            timeline,
        }
    }
}
