//! # dough_core - Sourdough Formula Engine
//!
//! Baker's-percentage math for sourdough with lockable fields: pin any
//! combination of dough weight, flour weight, hydration and starter, and the
//! engine solves for everything else.
//!
//! ## Design
//!
//! - **Owned engine**: [`RecipeEngine`] holds settings and the derived recipe;
//!   every mutation recalculates before returning
//! - **JSON-first**: settings, recipes, timelines and the formula book all
//!   implement Serialize/Deserialize
//! - **Structured errors**: see [`errors::DoughError`]
//!
//! ## Quick Start
//!
//! ```rust
//! use dough_core::{Command, RecipeEngine};
//!
//! let mut engine = RecipeEngine::new();
//! let recipe = engine.apply(Command::SetHydration(80.0)).unwrap();
//! assert_eq!(recipe.total_water, 800.0);
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - Lock validation, solve modes and the recipe engine
//! - [`settings`] - User inputs and lock flags
//! - [`recipe`] - Solved quantities and the formula card
//! - [`flour`] - Flour types and blend normalization
//! - [`timeline`] - Baking schedule generation
//! - [`library`] - Saved formulas and blend presets
//! - [`file_io`] - Formula book files with atomic saves and locking
//! - [`config`] - TOML configuration
//! - [`errors`] - Structured error types

pub mod config;
pub mod engine;
pub mod errors;
pub mod file_io;
pub mod flour;
pub mod library;
pub mod recipe;
pub mod settings;
pub mod timeline;

pub use engine::{Command, RecipeEngine, SolveMode};
pub use errors::{DoughError, DoughResult};
pub use library::{RecipeBook, SavedFormula};
pub use recipe::Recipe;
pub use settings::{LockableField, LockedFields, Settings, StarterUnit};
