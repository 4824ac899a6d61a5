//! # Formula Settings
//!
//! The user-controlled inputs of a formula: target weights, hydration, salt,
//! the starter, the flour blend, and which fields are locked.
//!
//! Settings serialize with the camelCase keys used by saved formula files:
//!
//! ```json
//! {
//!   "doughWeight": 1220,
//!   "flourWeight": 1000,
//!   "hydration": 75,
//!   "starter": { "amount": 200, "unit": "grams", "hydration": 100 },
//!   "salt": 2,
//!   "flourBlend": [
//!     { "type": "bread", "percentage": 90 },
//!     { "type": "wholeWheat", "percentage": 10 }
//!   ],
//!   "locked": { "doughWeight": false, "flourWeight": false, "hydration": false, "starter": false }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{DoughError, DoughResult};
use crate::flour::{FlourBlendEntry, FlourType};

/// How `StarterSettings::amount` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StarterUnit {
    /// Fixed mass in grams
    #[default]
    Grams,
    /// Percent of total flour weight
    Percentage,
}

impl StarterUnit {
    pub fn id(&self) -> &'static str {
        match self {
            StarterUnit::Grams => "grams",
            StarterUnit::Percentage => "percentage",
        }
    }
}

impl std::fmt::Display for StarterUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for StarterUnit {
    type Err = DoughError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grams" | "g" => Ok(StarterUnit::Grams),
            "percentage" | "percent" | "%" => Ok(StarterUnit::Percentage),
            _ => Err(DoughError::invalid_input(
                "starter.unit",
                s,
                "Expected 'grams' or 'percentage'",
            )),
        }
    }
}

/// Starter (levain) settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarterSettings {
    /// Grams, or percent of total flour when `unit` is `Percentage`
    pub amount: f64,
    pub unit: StarterUnit,
    /// The starter's own water-to-flour ratio in percent (100 = equal parts)
    pub hydration: f64,
}

impl Default for StarterSettings {
    fn default() -> Self {
        StarterSettings {
            amount: 200.0,
            unit: StarterUnit::Grams,
            hydration: 100.0,
        }
    }
}

/// A field the user can pin as an independent variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LockableField {
    DoughWeight,
    FlourWeight,
    Hydration,
    Starter,
}

impl LockableField {
    pub const ALL: [LockableField; 4] = [
        LockableField::DoughWeight,
        LockableField::FlourWeight,
        LockableField::Hydration,
        LockableField::Starter,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            LockableField::DoughWeight => "doughWeight",
            LockableField::FlourWeight => "flourWeight",
            LockableField::Hydration => "hydration",
            LockableField::Starter => "starter",
        }
    }
}

impl std::fmt::Display for LockableField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for LockableField {
    type Err = DoughError;

    /// Accepts the camelCase ids plus kebab/snake spellings (`dough-weight`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        LockableField::ALL
            .iter()
            .copied()
            .find(|f| f.id().to_ascii_lowercase() == key)
            .ok_or_else(|| DoughError::unlockable_field(s))
    }
}

/// Lock flags for the four lockable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedFields {
    #[serde(default)]
    pub dough_weight: bool,
    #[serde(default)]
    pub flour_weight: bool,
    #[serde(default)]
    pub hydration: bool,
    #[serde(default)]
    pub starter: bool,
}

impl LockedFields {
    /// Locks assumed for formulas saved before locking existed.
    pub fn legacy_default() -> Self {
        LockedFields {
            flour_weight: true,
            ..LockedFields::default()
        }
    }

    pub fn is_locked(&self, field: LockableField) -> bool {
        match field {
            LockableField::DoughWeight => self.dough_weight,
            LockableField::FlourWeight => self.flour_weight,
            LockableField::Hydration => self.hydration,
            LockableField::Starter => self.starter,
        }
    }

    /// Copy of these locks with one flag changed.
    pub fn with(mut self, field: LockableField, locked: bool) -> Self {
        match field {
            LockableField::DoughWeight => self.dough_weight = locked,
            LockableField::FlourWeight => self.flour_weight = locked,
            LockableField::Hydration => self.hydration = locked,
            LockableField::Starter => self.starter = locked,
        }
        self
    }

    pub fn count(&self) -> usize {
        LockableField::ALL
            .iter()
            .filter(|f| self.is_locked(**f))
            .count()
    }

    /// Locked fields in canonical order
    pub fn locked_fields(&self) -> Vec<LockableField> {
        LockableField::ALL
            .iter()
            .copied()
            .filter(|f| self.is_locked(*f))
            .collect()
    }
}

/// All user-controlled inputs of a formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Target dough weight in grams
    pub dough_weight: f64,
    /// Total flour in grams, including the starter's flour
    pub flour_weight: f64,
    /// Water as percent of total flour
    pub hydration: f64,
    pub starter: StarterSettings,
    /// Salt as percent of total flour
    pub salt: f64,
    pub flour_blend: Vec<FlourBlendEntry>,
    #[serde(default = "LockedFields::legacy_default")]
    pub locked: LockedFields,
}

impl Default for Settings {
    /// Tartine-style country loaf: 1000 g flour (900 bread, 100 whole wheat),
    /// 75% hydration, 200 g levain, 2% salt.
    fn default() -> Self {
        Settings {
            dough_weight: 1220.0,
            flour_weight: 1000.0,
            hydration: 75.0,
            starter: StarterSettings::default(),
            salt: 2.0,
            flour_blend: vec![
                FlourBlendEntry::new(FlourType::Bread, 90.0),
                FlourBlendEntry::new(FlourType::WholeWheat, 10.0),
            ],
            locked: LockedFields::default(),
        }
    }
}

impl Settings {
    /// Validate numeric inputs.
    ///
    /// Weights must be positive; percentages and the starter amount must be
    /// non-negative; everything must be finite.
    pub fn validate(&self) -> DoughResult<()> {
        check_positive("doughWeight", self.dough_weight)?;
        check_positive("flourWeight", self.flour_weight)?;
        check_non_negative("hydration", self.hydration)?;
        check_non_negative("salt", self.salt)?;
        check_non_negative("starter.amount", self.starter.amount)?;
        check_non_negative("starter.hydration", self.starter.hydration)?;
        Ok(())
    }
}

fn check_positive(field: &str, value: f64) -> DoughResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DoughError::invalid_input(
            field,
            value.to_string(),
            "Must be a positive number",
        ));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> DoughResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DoughError::invalid_input(
            field,
            value.to_string(),
            "Must be zero or a positive number",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_tartine() {
        let s = Settings::default();
        assert_eq!(s.dough_weight, 1220.0);
        assert_eq!(s.flour_weight, 1000.0);
        assert_eq!(s.hydration, 75.0);
        assert_eq!(s.starter.amount, 200.0);
        assert_eq!(s.starter.unit, StarterUnit::Grams);
        assert_eq!(s.salt, 2.0);
        assert_eq!(s.flour_blend.len(), 2);
        assert_eq!(s.locked.count(), 0);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_settings_json_keys() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(json.contains("\"doughWeight\":1220"));
        assert!(json.contains("\"flourBlend\""));
        assert!(json.contains("\"unit\":\"grams\""));
        assert!(json.contains("\"wholeWheat\""));
    }

    #[test]
    fn test_missing_locks_backfilled() {
        let json = r#"{
            "doughWeight": 900, "flourWeight": 500, "hydration": 70,
            "starter": {"amount": 20, "unit": "percentage", "hydration": 100},
            "salt": 2.2,
            "flourBlend": [{"type": "bread", "percentage": 100}]
        }"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.locked, LockedFields::legacy_default());
        assert!(s.locked.flour_weight);
        assert_eq!(s.locked.count(), 1);
    }

    #[test]
    fn test_salt_lock_key_ignored() {
        let locks: LockedFields = serde_json::from_str(
            r#"{"doughWeight": true, "flourWeight": false, "hydration": true, "starter": false, "salt": false}"#,
        )
        .unwrap();
        assert_eq!(
            locks.locked_fields(),
            vec![LockableField::DoughWeight, LockableField::Hydration]
        );
    }

    #[test]
    fn test_parse_lockable_field() {
        assert_eq!("doughWeight".parse::<LockableField>().unwrap(), LockableField::DoughWeight);
        assert_eq!("flour-weight".parse::<LockableField>().unwrap(), LockableField::FlourWeight);
        assert_eq!("starter".parse::<LockableField>().unwrap(), LockableField::Starter);

        let err = "salt".parse::<LockableField>().unwrap_err();
        assert_eq!(err, DoughError::unlockable_field("salt"));
    }

    #[test]
    fn test_with_and_count() {
        let locks = LockedFields::default()
            .with(LockableField::Hydration, true)
            .with(LockableField::Starter, true);
        assert_eq!(locks.count(), 2);
        assert!(locks.is_locked(LockableField::Hydration));
        assert_eq!(locks.with(LockableField::Starter, false).count(), 1);
    }

    #[test]
    fn test_validation() {
        let mut s = Settings::default();
        s.flour_weight = 0.0;
        assert_eq!(s.validate().unwrap_err().error_code(), "INVALID_INPUT");

        let mut s = Settings::default();
        s.hydration = f64::NAN;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.salt = 0.0;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_starter_unit_parse() {
        assert_eq!("percentage".parse::<StarterUnit>().unwrap(), StarterUnit::Percentage);
        assert_eq!("G".parse::<StarterUnit>().unwrap(), StarterUnit::Grams);
        assert!("cups".parse::<StarterUnit>().is_err());
    }
}
