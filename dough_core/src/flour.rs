//! Flour types and blend normalization
//!
//! A flour blend is an ordered list of flour types with the share of the
//! added flour each one makes up. Shares always sum to 100 once stored.

use serde::{Deserialize, Serialize};

use crate::errors::{DoughError, DoughResult};

/// Flour types known to the formulator.
///
/// Serialized with the short ids used in saved formulas (`"bread"`,
/// `"wholeWheat"`, ...).
///
/// # Example
/// ```
/// use dough_core::flour::FlourType;
///
/// assert_eq!(FlourType::WholeWheat.display_name(), "Whole Wheat Flour");
/// assert!(FlourType::Rye.is_whole_grain());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlourType {
    Bread,
    AllPurpose,
    WholeWheat,
    Rye,
    Spelt,
    Semolina,
}

impl FlourType {
    /// All flour types in menu order
    pub const ALL: [FlourType; 6] = [
        FlourType::Bread,
        FlourType::AllPurpose,
        FlourType::WholeWheat,
        FlourType::Rye,
        FlourType::Spelt,
        FlourType::Semolina,
    ];

    /// Short id used in saved formulas and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            FlourType::Bread => "bread",
            FlourType::AllPurpose => "allPurpose",
            FlourType::WholeWheat => "wholeWheat",
            FlourType::Rye => "rye",
            FlourType::Spelt => "spelt",
            FlourType::Semolina => "semolina",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            FlourType::Bread => "Bread Flour",
            FlourType::AllPurpose => "All Purpose Flour",
            FlourType::WholeWheat => "Whole Wheat Flour",
            FlourType::Rye => "Rye Flour",
            FlourType::Spelt => "Spelt Flour",
            FlourType::Semolina => "Semolina Flour",
        }
    }

    /// Whole grains ferment faster; the timeline shortens bulk for them.
    pub fn is_whole_grain(&self) -> bool {
        matches!(self, FlourType::WholeWheat | FlourType::Rye)
    }
}

impl std::fmt::Display for FlourType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for FlourType {
    type Err = DoughError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlourType::ALL
            .iter()
            .copied()
            .find(|t| t.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| DoughError::invalid_input("flourType", s, "Unknown flour type"))
    }
}

/// One entry of a flour blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlourBlendEntry {
    #[serde(rename = "type")]
    pub flour_type: FlourType,
    /// Share of the added flour, in percent
    pub percentage: f64,
}

impl FlourBlendEntry {
    pub fn new(flour_type: FlourType, percentage: f64) -> Self {
        FlourBlendEntry {
            flour_type,
            percentage,
        }
    }
}

impl std::str::FromStr for FlourBlendEntry {
    type Err = DoughError;

    /// Parse `type=percentage`, e.g. `rye=20`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (flour, pct) = s.split_once('=').ok_or_else(|| {
            DoughError::invalid_input("flourBlend", s, "Expected <type>=<percentage>")
        })?;
        let percentage: f64 = pct
            .trim()
            .parse()
            .map_err(|_| DoughError::invalid_input("flourBlend", s, "Percentage is not a number"))?;
        Ok(FlourBlendEntry::new(flour.trim().parse()?, percentage))
    }
}

/// Rescale a blend so its percentages sum to exactly 100.
///
/// A blend that already sums to 100 (exact comparison) is returned as is.
/// Empty and zero-sum blends are rejected, since every flour breakdown would
/// divide by their total.
///
/// # Example
/// ```
/// use dough_core::flour::{normalize_blend, FlourBlendEntry, FlourType};
///
/// let blend = normalize_blend(vec![
///     FlourBlendEntry::new(FlourType::Bread, 60.0),
///     FlourBlendEntry::new(FlourType::Rye, 20.0),
/// ]).unwrap();
/// assert_eq!(blend[0].percentage, 75.0);
/// assert_eq!(blend[1].percentage, 25.0);
/// ```
pub fn normalize_blend(blend: Vec<FlourBlendEntry>) -> DoughResult<Vec<FlourBlendEntry>> {
    if blend.is_empty() {
        return Err(DoughError::invalid_blend("Blend must contain at least one flour"));
    }
    if let Some(bad) = blend.iter().find(|f| !f.percentage.is_finite() || f.percentage < 0.0) {
        return Err(DoughError::invalid_blend(format!(
            "Percentage for {} must be a non-negative number, got {}",
            bad.flour_type, bad.percentage
        )));
    }

    let total: f64 = blend.iter().map(|f| f.percentage).sum();
    if total == 0.0 {
        return Err(DoughError::invalid_blend("Blend percentages sum to zero"));
    }
    if total == 100.0 {
        return Ok(blend);
    }

    Ok(blend
        .into_iter()
        .map(|f| FlourBlendEntry::new(f.flour_type, f.percentage / total * 100.0))
        .collect())
}

/// Sum of the percentages of whole-grain flours in a blend
pub fn whole_grain_percentage(blend: &[FlourBlendEntry]) -> f64 {
    blend
        .iter()
        .filter(|f| f.flour_type.is_whole_grain())
        .map(|f| f.percentage)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_partial_blend() {
        let blend = normalize_blend(vec![
            FlourBlendEntry::new(FlourType::Bread, 60.0),
            FlourBlendEntry::new(FlourType::Rye, 20.0),
        ])
        .unwrap();

        assert_eq!(blend[0].flour_type, FlourType::Bread);
        assert!((blend[0].percentage - 75.0).abs() < 1e-9);
        assert!((blend[1].percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_blend_untouched() {
        let input = vec![
            FlourBlendEntry::new(FlourType::Bread, 90.0),
            FlourBlendEntry::new(FlourType::WholeWheat, 10.0),
        ];
        assert_eq!(normalize_blend(input.clone()).unwrap(), input);
    }

    #[test]
    fn test_degenerate_blends_rejected() {
        assert_eq!(normalize_blend(vec![]).unwrap_err().error_code(), "INVALID_BLEND");
        let zero = vec![FlourBlendEntry::new(FlourType::Bread, 0.0)];
        assert_eq!(normalize_blend(zero).unwrap_err().error_code(), "INVALID_BLEND");
        let negative = vec![FlourBlendEntry::new(FlourType::Bread, -10.0)];
        assert!(normalize_blend(negative).is_err());
    }

    #[test]
    fn test_flour_type_serialization() {
        let json = serde_json::to_string(&FlourType::WholeWheat).unwrap();
        assert_eq!(json, "\"wholeWheat\"");

        let entry: FlourBlendEntry =
            serde_json::from_str(r#"{"type":"allPurpose","percentage":30}"#).unwrap();
        assert_eq!(entry.flour_type, FlourType::AllPurpose);
        assert_eq!(entry.percentage, 30.0);
    }

    #[test]
    fn test_parse_blend_entry() {
        let entry: FlourBlendEntry = "rye=20".parse().unwrap();
        assert_eq!(entry, FlourBlendEntry::new(FlourType::Rye, 20.0));
        assert!("rye".parse::<FlourBlendEntry>().is_err());
        assert!("barley=20".parse::<FlourBlendEntry>().is_err());
    }

    #[test]
    fn test_whole_grain_share() {
        let blend = [
            FlourBlendEntry::new(FlourType::Bread, 60.0),
            FlourBlendEntry::new(FlourType::WholeWheat, 25.0),
            FlourBlendEntry::new(FlourType::Rye, 15.0),
        ];
        assert_eq!(whole_grain_percentage(&blend), 40.0);
    }
}
