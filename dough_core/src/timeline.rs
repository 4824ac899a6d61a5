//! # Baking Timeline
//!
//! Builds a step-by-step baking schedule for a recipe: autolyse, mixing,
//! stretch-and-folds, bulk fermentation, shaping, an overnight cold proof and
//! the bake. Durations are scaled for room temperature, and bulk fermentation
//! also for the starter percentage and whole-grain content of the blend.
//!
//! ## Example
//!
//! ```rust
//! use chrono::DateTime;
//! use dough_core::engine::RecipeEngine;
//! use dough_core::timeline::{generate, TimelineMode, TimelineSettings};
//!
//! let engine = RecipeEngine::new();
//! let start = DateTime::parse_from_rfc3339("2024-03-01T08:00:00+00:00").unwrap();
//! let settings = TimelineSettings::new(start);
//!
//! let steps = generate(engine.recipe(), &engine.settings().flour_blend, &settings).unwrap();
//! assert_eq!(steps[0].step, "Autolyse");
//! assert_eq!(steps[0].time, "08:00 AM");
//! assert_eq!(steps.last().unwrap().step, "Enjoy!");
//! ```

use chrono::{DateTime, Duration, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{DoughError, DoughResult};
use crate::flour::{whole_grain_percentage, FlourBlendEntry};
use crate::recipe::{round_half_up, Recipe};

/// Room temperature at which base durations apply, in °C
pub const REFERENCE_TEMP_C: f64 = 22.0;

/// Fractional change in duration per °C away from the reference
const TEMP_SENSITIVITY: f64 = 0.05;

/// Room temperatures the duration model is trusted for, in °C
pub const MIN_ROOM_TEMP_C: f64 = 0.0;
pub const MAX_ROOM_TEMP_C: f64 = 40.0;

/// Whether `start_time` is when baking starts or when the bread should be ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineMode {
    #[default]
    Start,
    End,
}

/// Inputs for timeline generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSettings {
    pub start_time: DateTime<FixedOffset>,
    pub mode: TimelineMode,
    pub room_temp_c: f64,
    /// A fed starter skips the feeding step and its rise
    pub starter_fed: bool,
}

impl TimelineSettings {
    /// Forward schedule from `start_time` at reference temperature with a fed starter.
    pub fn new(start_time: DateTime<FixedOffset>) -> Self {
        TimelineSettings {
            start_time,
            mode: TimelineMode::Start,
            room_temp_c: REFERENCE_TEMP_C,
            starter_fed: true,
        }
    }

    /// Reject room temperatures outside [`MIN_ROOM_TEMP_C`]..=[`MAX_ROOM_TEMP_C`].
    ///
    /// Past 42 °C the temperature factor turns negative and steps would run
    /// backwards.
    pub fn validate(&self) -> DoughResult<()> {
        if !(MIN_ROOM_TEMP_C..=MAX_ROOM_TEMP_C).contains(&self.room_temp_c) {
            return Err(DoughError::invalid_input(
                "roomTempC",
                self.room_temp_c.to_string(),
                format!("Must be between {MIN_ROOM_TEMP_C} and {MAX_ROOM_TEMP_C} °C"),
            ));
        }
        Ok(())
    }
}

impl Default for TimelineSettings {
    fn default() -> Self {
        TimelineSettings::new(Local::now().fixed_offset())
    }
}

/// One scheduled step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStep {
    pub step: String,
    pub description: String,
    /// `HH:MM AM/PM`
    pub time: String,
    /// `MM/DD/YYYY`
    pub date: String,
    /// RFC 3339 timestamp
    pub iso_time: String,
}

impl TimelineStep {
    fn at(step: impl Into<String>, description: impl Into<String>, when: DateTime<FixedOffset>) -> Self {
        TimelineStep {
            step: step.into(),
            description: description.into(),
            time: when.format("%I:%M %p").to_string(),
            date: when.format("%m/%d/%Y").to_string(),
            iso_time: when.to_rfc3339(),
        }
    }

    /// Parsed `iso_time`, if well formed
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.iso_time).ok()
    }
}

/// Scale a base duration (hours at 22 °C) for room temperature.
///
/// Warmer rooms shorten fermentation by 5% per degree, cooler rooms lengthen it.
///
/// # Example
/// ```
/// use dough_core::timeline::adjust_for_temperature;
///
/// assert_eq!(adjust_for_temperature(4.0, 22.0), 4.0);
/// assert!((adjust_for_temperature(4.0, 26.0) - 3.2).abs() < 1e-9);
/// assert!((adjust_for_temperature(4.0, 18.0) - 4.8).abs() < 1e-9);
/// ```
pub fn adjust_for_temperature(base_hours: f64, room_temp_c: f64) -> f64 {
    base_hours * (1.0 - (room_temp_c - REFERENCE_TEMP_C) * TEMP_SENSITIVITY)
}

/// Bulk fermentation length in hours.
pub fn bulk_fermentation_hours(recipe: &Recipe, blend: &[FlourBlendEntry], room_temp_c: f64) -> f64 {
    let mut hours = adjust_for_temperature(4.0, room_temp_c);

    let starter_pct = recipe.starter_percentage();
    if starter_pct > 20.0 {
        hours *= 0.8;
    } else if starter_pct < 10.0 {
        hours *= 1.2;
    }

    if whole_grain_percentage(blend) > 30.0 {
        hours *= 0.85;
    }
    hours
}

fn hours(h: f64) -> Duration {
    Duration::milliseconds((h * 3_600_000.0).round() as i64)
}

fn minutes(m: i64) -> Duration {
    Duration::minutes(m)
}

/// Generate the schedule.
///
/// In [`TimelineMode::End`] the schedule is shifted so the final step lands
/// on `settings.start_time`. Fails with `InvalidInput` when the room
/// temperature is out of range.
pub fn generate(
    recipe: &Recipe,
    blend: &[FlourBlendEntry],
    settings: &TimelineSettings,
) -> DoughResult<Vec<TimelineStep>> {
    settings.validate()?;
    let steps = match settings.mode {
        TimelineMode::Start => forward(recipe, blend, settings, settings.start_time),
        TimelineMode::End => {
            let draft = forward(recipe, blend, settings, settings.start_time);
            let span = match (draft.first().and_then(TimelineStep::timestamp), draft.last().and_then(TimelineStep::timestamp)) {
                (Some(first), Some(last)) => last - first,
                _ => Duration::zero(),
            };
            debug!(span_minutes = span.num_minutes(), "scheduling backwards from end time");
            forward(recipe, blend, settings, settings.start_time - span)
        }
    };
    Ok(steps)
}

fn forward(
    recipe: &Recipe,
    blend: &[FlourBlendEntry],
    settings: &TimelineSettings,
    start: DateTime<FixedOffset>,
) -> Vec<TimelineStep> {
    let mut steps = Vec::with_capacity(15);
    let mut now = start;

    if !settings.starter_fed {
        steps.push(TimelineStep::at(
            "Feed Starter",
            "Feed your starter with equal parts flour and water by weight.",
            now,
        ));
        now += hours(adjust_for_temperature(5.0, settings.room_temp_c));
    }

    steps.push(TimelineStep::at(
        "Autolyse",
        format!(
            "Mix {}g flour with {}g water. Let rest.",
            round_half_up(recipe.total_flour - recipe.starter_flour),
            round_half_up(recipe.total_water - recipe.starter_water)
        ),
        now,
    ));

    now += minutes(45);
    steps.push(TimelineStep::at(
        "Mix Starter & Salt",
        format!(
            "Add {}g starter and {}g salt to the autolyse. Mix thoroughly.",
            round_half_up(recipe.starter_amount),
            recipe.salt
        ),
        now,
    ));

    now += minutes(30);
    steps.push(TimelineStep::at(
        "First Fold",
        "Perform first set of stretch and folds to build dough strength.",
        now,
    ));
    for fold in 2..=4 {
        now += minutes(30);
        steps.push(TimelineStep::at(
            format!("Fold #{fold}"),
            "Perform another set of stretch and folds to continue building strength.",
            now,
        ));
    }

    let bulk = bulk_fermentation_hours(recipe, blend, settings.room_temp_c);
    debug!(bulk_hours = bulk, room_temp_c = settings.room_temp_c, "bulk fermentation");
    now += hours(bulk);
    steps.push(TimelineStep::at(
        "End Bulk Fermentation",
        "Dough should have risen by about 30-50% and feel airy. Gently turn out onto work surface.",
        now,
    ));

    now += minutes(5);
    steps.push(TimelineStep::at("Pre-shape", "Gently pre-shape the dough and let it rest.", now));

    now += minutes(20);
    steps.push(TimelineStep::at(
        "Final Shape",
        "Shape the dough and place in proofing basket or container.",
        now,
    ));

    now += minutes(30);
    steps.push(TimelineStep::at(
        "Refrigerate",
        "Place the shaped dough in the refrigerator for cold fermentation (8-14 hours).",
        now,
    ));

    now += hours(12.0);
    steps.push(TimelineStep::at(
        "Preheat Oven",
        "Preheat oven with Dutch oven or baking stone to 500°F/260°C.",
        now,
    ));

    now += minutes(45);
    steps.push(TimelineStep::at(
        "Bake",
        "Score and bake at high heat with steam for 20 minutes, then reduce to 450°F/230°C for 20-25 minutes more.",
        now,
    ));

    now += minutes(45);
    steps.push(TimelineStep::at(
        "Cool",
        "Remove bread from oven and let cool for at least 1 hour before slicing.",
        now,
    ));

    now += hours(1.0);
    steps.push(TimelineStep::at(
        "Enjoy!",
        "Your sourdough bread is ready to slice and enjoy!",
        now,
    ));

    steps
}
