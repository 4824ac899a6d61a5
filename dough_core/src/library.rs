//! # Formula Book
//!
//! Named formulas and flour blend presets, persisted together as one JSON
//! document (see [`file_io`](crate::file_io) for atomic saves and locking).
//!
//! ## Structure
//!
//! ```text
//! RecipeBook
//! ├── meta: BookMetadata (schema version, timestamps)
//! ├── recipes: BTreeMap<String, RecipeRecord> ("recipe_<uuid>")
//! └── blends: BTreeMap<String, BlendPreset> ("blend_<uuid>")
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dough_core::engine::RecipeEngine;
//! use dough_core::library::RecipeBook;
//!
//! let engine = RecipeEngine::new();
//! let mut book = RecipeBook::new();
//!
//! let id = book.save_recipe("Country Loaf", "Tartine basic", engine.snapshot(vec![]));
//! assert!(id.starts_with("recipe_"));
//! assert_eq!(book.get_recipe(&id).unwrap().name, "Country Loaf");
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{DoughError, DoughResult};
use crate::flour::{normalize_blend, FlourBlendEntry};
use crate::recipe::Recipe;
use crate::settings::Settings;
use crate::timeline::TimelineStep;

/// Current schema version for formula book files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Snapshot of an engine: the settings that reproduce it plus what they
/// produced at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFormula {
    pub settings: Settings,
    #[serde(default)]
    pub recipe: Recipe,
    #[serde(default)]
    pub timeline: Vec<TimelineStep>,
}

/// A named formula in the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Backfilled from the book key on import
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    /// Last saved
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
    pub recipe: SavedFormula,
}

/// A named flour blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendPreset {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
    pub blend: Vec<FlourBlendEntry>,
}

/// Book metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Root container for saved formulas and blend presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeBook {
    pub meta: BookMetadata,
    #[serde(default)]
    pub recipes: BTreeMap<String, RecipeRecord>,
    #[serde(default)]
    pub blends: BTreeMap<String, BlendPreset>,
}

impl Default for RecipeBook {
    fn default() -> Self {
        RecipeBook::new()
    }
}

impl RecipeBook {
    /// Create an empty book.
    pub fn new() -> Self {
        let now = Utc::now();
        RecipeBook {
            meta: BookMetadata {
                version: SCHEMA_VERSION.to_string(),
                created: now,
                modified: now,
            },
            recipes: BTreeMap::new(),
            blends: BTreeMap::new(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Save a formula under a new id and return the id.
    pub fn save_recipe(&mut self, name: impl Into<String>, notes: impl Into<String>, formula: SavedFormula) -> String {
        let id = format!("recipe_{}", Uuid::new_v4().simple());
        let record = RecipeRecord {
            id: id.clone(),
            name: name.into(),
            notes: notes.into(),
            date: Utc::now(),
            recipe: formula,
        };
        info!(id = %id, name = %record.name, "saved recipe");
        self.recipes.insert(id.clone(), record);
        self.touch();
        id
    }

    /// Replace an existing formula's name, notes and contents.
    pub fn update_recipe(
        &mut self,
        id: &str,
        name: impl Into<String>,
        notes: impl Into<String>,
        formula: SavedFormula,
    ) -> DoughResult<()> {
        let record = self
            .recipes
            .get_mut(id)
            .ok_or_else(|| DoughError::not_found("Recipe", id))?;
        record.name = name.into();
        record.notes = notes.into();
        record.date = Utc::now();
        record.recipe = formula;
        info!(id, "updated recipe");
        self.touch();
        Ok(())
    }

    pub fn get_recipe(&self, id: &str) -> Option<&RecipeRecord> {
        self.recipes.get(id)
    }

    /// Remove a formula by id.
    ///
    /// Returns the removed record if it existed.
    pub fn delete_recipe(&mut self, id: &str) -> Option<RecipeRecord> {
        let record = self.recipes.remove(id);
        if record.is_some() {
            self.touch();
        }
        record
    }

    /// Formulas, most recently saved first.
    pub fn recipes_by_date(&self) -> Vec<&RecipeRecord> {
        let mut records: Vec<_> = self.recipes.values().collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records
    }

    /// All formulas as a pretty-printed JSON object keyed by id.
    pub fn export_recipes(&self) -> DoughResult<String> {
        serde_json::to_string_pretty(&self.recipes).map_err(DoughError::serialization)
    }

    /// Import formulas from an exported JSON object.
    ///
    /// Entries keep their ids and overwrite existing ones. With `merge =
    /// false` the current formulas are dropped first. Entries without a
    /// non-empty `name` and a `recipe`, or that fail to decode, are skipped.
    /// A missing `id` comes from the key and a missing `date` is now.
    /// Returns the number imported.
    pub fn import_recipes(&mut self, json: &str, merge: bool) -> DoughResult<usize> {
        let imported = import_entries::<RecipeRecord>(json, "recipe")?;
        if !merge {
            self.recipes.clear();
        }
        let count = imported.len();
        for (id, mut record) in imported {
            record.id = id.clone();
            self.recipes.insert(id, record);
        }
        info!(count, merge, "imported recipes");
        self.touch();
        Ok(count)
    }

    /// Save a blend preset under a new id and return the id.
    ///
    /// The blend is normalized to 100%.
    pub fn save_blend(&mut self, name: impl Into<String>, blend: Vec<FlourBlendEntry>) -> DoughResult<String> {
        let blend = normalize_blend(blend)?;
        let id = format!("blend_{}", Uuid::new_v4().simple());
        let preset = BlendPreset {
            id: id.clone(),
            name: name.into(),
            date: Utc::now(),
            blend,
        };
        info!(id = %id, name = %preset.name, "saved blend preset");
        self.blends.insert(id.clone(), preset);
        self.touch();
        Ok(id)
    }

    pub fn get_blend(&self, id: &str) -> Option<&BlendPreset> {
        self.blends.get(id)
    }

    pub fn delete_blend(&mut self, id: &str) -> Option<BlendPreset> {
        let preset = self.blends.remove(id);
        if preset.is_some() {
            self.touch();
        }
        preset
    }

    pub fn export_blends(&self) -> DoughResult<String> {
        serde_json::to_string_pretty(&self.blends).map_err(DoughError::serialization)
    }

    /// Import blend presets; same rules as [`RecipeBook::import_recipes`]
    /// with `blend` as the required payload.
    pub fn import_blends(&mut self, json: &str, merge: bool) -> DoughResult<usize> {
        let imported = import_entries::<BlendPreset>(json, "blend")?;
        if !merge {
            self.blends.clear();
        }
        let count = imported.len();
        for (id, mut preset) in imported {
            preset.id = id.clone();
            self.blends.insert(id, preset);
        }
        info!(count, merge, "imported blend presets");
        self.touch();
        Ok(count)
    }

    /// Remove every formula and blend preset.
    pub fn clear_all(&mut self) {
        self.recipes.clear();
        self.blends.clear();
        warn!("cleared formula book");
        self.touch();
    }
}

/// Decode the well-formed entries of an id-keyed JSON object.
fn import_entries<T: DeserializeOwned>(json: &str, payload: &str) -> DoughResult<Vec<(String, T)>> {
    let document: Value = serde_json::from_str(json).map_err(DoughError::serialization)?;
    let Value::Object(entries) = document else {
        return Err(DoughError::serialization("Expected a JSON object keyed by id"));
    };

    let mut decoded = Vec::with_capacity(entries.len());
    for (id, entry) in entries {
        let has_name = entry
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.is_empty());
        let has_payload = entry.get(payload).is_some_and(|v| !v.is_null());
        if !has_name || !has_payload {
            warn!(id = %id, "skipping entry without a name or {payload}");
            continue;
        }

        match serde_json::from_value::<T>(entry) {
            Ok(item) => decoded.push((id, item)),
            Err(e) => warn!(id = %id, error = %e, "skipping malformed entry"),
        }
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecipeEngine;
    use crate::flour::FlourType;

    fn formula() -> SavedFormula {
        RecipeEngine::new().snapshot(vec![])
    }

    #[test]
    fn test_book_creation() {
        let book = RecipeBook::new();
        assert_eq!(book.meta.version, SCHEMA_VERSION);
        assert!(book.recipes.is_empty());
        assert!(book.blends.is_empty());
    }

    #[test]
    fn test_save_update_delete() {
        let mut book = RecipeBook::new();
        let id = book.save_recipe("Country", "", formula());
        assert_eq!(book.recipes.len(), 1);

        book.update_recipe(&id, "Country 80%", "wetter", formula()).unwrap();
        let record = book.get_recipe(&id).unwrap();
        assert_eq!(record.name, "Country 80%");
        assert_eq!(record.notes, "wetter");
        assert_eq!(record.id, id);

        let err = book.update_recipe("recipe_missing", "x", "", formula()).unwrap_err();
        assert_eq!(err, DoughError::not_found("Recipe", "recipe_missing"));

        assert!(book.delete_recipe(&id).is_some());
        assert!(book.delete_recipe(&id).is_none());
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut book = RecipeBook::new();
        let id = book.save_recipe("Country", "notes", formula());
        let json = book.export_recipes().unwrap();

        let mut other = RecipeBook::new();
        assert_eq!(other.import_recipes(&json, true).unwrap(), 1);
        assert_eq!(other.get_recipe(&id), book.get_recipe(&id));
    }

    #[test]
    fn test_import_skips_malformed() {
        let mut book = RecipeBook::new();
        let good = serde_json::to_value(RecipeRecord {
            id: "recipe_1".to_string(),
            name: "Good".to_string(),
            notes: String::new(),
            date: Utc::now(),
            recipe: formula(),
        })
        .unwrap();
        let doc = serde_json::json!({
            "recipe_1": good,
            "recipe_2": { "id": "recipe_2", "name": "", "recipe": {} },
            "recipe_3": { "id": "recipe_3", "name": "No payload" },
            "recipe_4": { "id": "recipe_4", "name": "Bad payload", "date": "2024-01-01T00:00:00Z", "recipe": { "settings": 5 } }
        });

        let count = book.import_recipes(&doc.to_string(), true).unwrap();
        assert_eq!(count, 1);
        assert!(book.get_recipe("recipe_1").is_some());
        assert!(book.get_recipe("recipe_4").is_none());
    }

    #[test]
    fn test_import_replace_and_non_object() {
        let mut book = RecipeBook::new();
        book.save_recipe("Old", "", formula());
        let count = book.import_recipes("{}", false).unwrap();
        assert_eq!(count, 0);
        assert!(book.recipes.is_empty());

        let err = book.import_recipes("[1, 2]", true).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_import_legacy_record_without_locks() {
        let json = r#"{
            "recipe_1700000000000": {
                "id": "recipe_1700000000000",
                "name": "Old loaf",
                "notes": "",
                "date": "2023-11-14T22:13:20.000Z",
                "recipe": {
                    "settings": {
                        "doughWeight": 900, "flourWeight": 500, "hydration": 70,
                        "starter": {"amount": 100, "unit": "grams", "hydration": 100},
                        "salt": 2,
                        "flourBlend": [{"type": "bread", "percentage": 100}]
                    }
                }
            }
        }"#;
        let mut book = RecipeBook::new();
        assert_eq!(book.import_recipes(json, true).unwrap(), 1);
        let record = book.get_recipe("recipe_1700000000000").unwrap();
        assert!(record.recipe.settings.locked.flour_weight);
        assert!(record.recipe.timeline.is_empty());
    }

    #[test]
    fn test_import_record_without_id_or_date() {
        let json = r#"{
            "recipe_1": {
                "name": "Loaf",
                "recipe": {
                    "settings": {
                        "doughWeight": 1400, "flourWeight": 800, "hydration": 72,
                        "starter": {"amount": 160, "unit": "grams", "hydration": 100},
                        "salt": 2,
                        "flourBlend": [{"type": "bread", "percentage": 100}]
                    }
                }
            }
        }"#;
        let before = Utc::now();
        let mut book = RecipeBook::new();
        assert_eq!(book.import_recipes(json, true).unwrap(), 1);

        let record = book.get_recipe("recipe_1").unwrap();
        assert_eq!(record.id, "recipe_1");
        assert_eq!(record.name, "Loaf");
        assert!(record.date >= before);
        assert_eq!(record.recipe.settings.flour_weight, 800.0);

        let blends = r#"{"blend_1": {"name": "Rye", "blend": [{"type": "rye", "percentage": 100}]}}"#;
        assert_eq!(book.import_blends(blends, true).unwrap(), 1);
        assert_eq!(book.get_blend("blend_1").unwrap().id, "blend_1");
    }

    #[test]
    fn test_blend_presets() {
        let mut book = RecipeBook::new();
        let id = book
            .save_blend(
                "Rye mix",
                vec![
                    FlourBlendEntry::new(FlourType::Bread, 3.0),
                    FlourBlendEntry::new(FlourType::Rye, 1.0),
                ],
            )
            .unwrap();
        assert!(id.starts_with("blend_"));
        assert_eq!(book.get_blend(&id).unwrap().blend[0].percentage, 75.0);

        assert_eq!(book.save_blend("Empty", vec![]).unwrap_err().error_code(), "INVALID_BLEND");

        let json = book.export_blends().unwrap();
        let mut other = RecipeBook::new();
        assert_eq!(other.import_blends(&json, true).unwrap(), 1);

        let skipped = r#"{"blend_x": {"id": "blend_x", "name": "No blend", "date": "2024-01-01T00:00:00Z"}}"#;
        assert_eq!(other.import_blends(skipped, true).unwrap(), 0);

        assert!(book.delete_blend(&id).is_some());
        assert!(book.blends.is_empty());
    }

    #[test]
    fn test_clear_all() {
        let mut book = RecipeBook::new();
        book.save_recipe("A", "", formula());
        book.save_blend("B", vec![FlourBlendEntry::new(FlourType::Spelt, 100.0)]).unwrap();
        book.clear_all();
        assert!(book.recipes.is_empty());
        assert!(book.blends.is_empty());
    }
}
