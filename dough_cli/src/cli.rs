//! Clap definitions for the `dough` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dough_core::flour::FlourBlendEntry;
use dough_core::settings::{LockableField, StarterUnit};

/// dough -- sourdough formula calculator.
///
/// Lock the values you care about (dough weight, flour weight, hydration,
/// starter) and the rest of the formula is solved for you.
#[derive(Parser, Debug)]
#[command(name = "dough", about = "Sourdough formula calculator", version, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file.
    #[arg(long, global = true, env = "DOUGH_CONFIG", default_value = "dough.toml")]
    pub config: PathBuf,

    /// Formula book file (overrides the config's book_path).
    #[arg(long, global = true, env = "DOUGH_BOOK")]
    pub book: Option<PathBuf>,

    /// Enable debug logging on stderr.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve a formula and print it.
    Calc(CalcArgs),

    /// Print a baking schedule for a formula.
    Timeline(TimelineArgs),

    /// Save a formula to the book.
    Save(SaveArgs),

    /// List saved formulas.
    List(ListArgs),

    /// Show a saved formula.
    Show(ShowArgs),

    /// Delete a saved formula.
    Delete(IdArgs),

    /// Export saved formulas as JSON.
    Export(ExportArgs),

    /// Import formulas from an exported JSON file.
    Import(ImportArgs),

    /// Manage flour blend presets.
    Blend {
        #[command(subcommand)]
        command: BlendCommands,
    },
}

/// Formula inputs shared by `calc`, `timeline` and `save`.
///
/// Values not given keep the defaults (1000 g flour, 75% hydration, 200 g
/// starter, 2% salt, 90/10 bread/whole wheat). Unlocked values may be
/// recomputed.
#[derive(Args, Debug, Clone, Default)]
pub struct FormulaArgs {
    /// Target dough weight in grams.
    #[arg(long)]
    pub dough_weight: Option<f64>,

    /// Total flour in grams, including the starter's flour.
    #[arg(long)]
    pub flour_weight: Option<f64>,

    /// Water as percent of total flour.
    #[arg(long)]
    pub hydration: Option<f64>,

    /// Salt as percent of total flour.
    #[arg(long)]
    pub salt: Option<f64>,

    /// Starter amount, in grams or percent of flour depending on --starter-unit.
    #[arg(long)]
    pub starter_amount: Option<f64>,

    /// `grams` or `percentage`.
    #[arg(long)]
    pub starter_unit: Option<StarterUnit>,

    /// The starter's own hydration in percent.
    #[arg(long)]
    pub starter_hydration: Option<f64>,

    /// Flour in the blend as type=percent (repeatable), e.g. --flour bread=80 --flour rye=20.
    #[arg(long = "flour", value_name = "TYPE=PCT")]
    pub flour: Vec<FlourBlendEntry>,

    /// Apply a saved blend preset by id.
    #[arg(long, conflicts_with = "flour")]
    pub blend: Option<String>,

    /// Lock a field (repeatable): dough-weight, flour-weight, hydration, starter.
    #[arg(long = "lock", value_name = "FIELD")]
    pub lock: Vec<LockableField>,
}

#[derive(Args, Debug)]
pub struct CalcArgs {
    #[command(flatten)]
    pub formula: FormulaArgs,

    /// Output JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub formula: FormulaArgs,

    /// Start time (RFC 3339); defaults to now.
    #[arg(long, value_name = "TIME")]
    pub start: Option<String>,

    /// Treat --start as the time the bread should be ready.
    #[arg(long)]
    pub end: bool,

    /// Room temperature in °C.
    #[arg(long, allow_negative_numbers = true)]
    pub room_temp: Option<f64>,

    /// The starter still needs feeding.
    #[arg(long)]
    pub starter_unfed: bool,

    /// Output JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Formula name.
    #[arg(long)]
    pub name: String,

    /// Free-form notes.
    #[arg(long, default_value = "")]
    pub notes: String,

    #[command(flatten)]
    pub formula: FormulaArgs,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Formula id.
    pub id: String,

    /// Output JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write to a file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Exported JSON file.
    pub file: PathBuf,

    /// Replace the book's formulas instead of merging.
    #[arg(long)]
    pub replace: bool,
}

#[derive(Subcommand, Debug)]
pub enum BlendCommands {
    /// Save a blend preset.
    Save(BlendSaveArgs),

    /// List blend presets.
    List(ListArgs),

    /// Delete a blend preset.
    Delete(IdArgs),
}

#[derive(Args, Debug)]
pub struct BlendSaveArgs {
    /// Preset name.
    #[arg(long)]
    pub name: String,

    /// Flour as type=percent (repeatable).
    #[arg(long = "flour", value_name = "TYPE=PCT", required = true)]
    pub flour: Vec<FlourBlendEntry>,
}
