//! Scroll definitions and the catalog they are loaded from.
use serde::{Deserialize, Serialize};

use crate::numbers::sanitize_probability;

const STANDARD_CATALOG_JSON: &str = include_str!("../data/scrolls.json");

/// A named enhancement operation applied to one slot of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScrollRecord")]
pub struct ScrollDefinition {
    name: String,
    success_rate: f64,
    can_destroy_on_failure: bool,
    ability_value_on_success: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ScrollRecord {
    name: String,
    success_rate: f64,
    #[serde(default)]
    can_destroy_on_failure: bool,
    #[serde(default)]
    ability_value_on_success: u32,
}

impl From<ScrollRecord> for ScrollDefinition {
    fn from(record: ScrollRecord) -> Self {
        Self::new(
            record.name,
            record.success_rate,
            record.can_destroy_on_failure,
            record.ability_value_on_success,
        )
    }
}

impl ScrollDefinition {
    /// Create a scroll. The success rate is clamped into [0, 1]; NaN becomes 0.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        success_rate: f64,
        can_destroy_on_failure: bool,
        ability_value_on_success: u32,
    ) -> Self {
        Self {
            name: name.into(),
            success_rate: sanitize_probability(success_rate),
            can_destroy_on_failure,
            ability_value_on_success,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn success_rate(&self) -> f64 {
        self.success_rate
    }

    #[must_use]
    pub const fn can_destroy_on_failure(&self) -> bool {
        self.can_destroy_on_failure
    }

    #[must_use]
    pub const fn ability_value_on_success(&self) -> u32 {
        self.ability_value_on_success
    }
}

/// Ordered collection of scroll definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScrollCatalog {
    scrolls: Vec<ScrollDefinition>,
}

impl ScrollCatalog {
    /// The five scrolls offered by the enhancement table: 10%, 30%, 60%, 70% and 100%.
    ///
    /// # Panics
    ///
    /// Panics if the embedded catalog data is malformed.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_json(STANDARD_CATALOG_JSON).expect("embedded scroll catalog is valid")
    }

    /// Load a catalog from JSON of the form `{ "scrolls": [ ... ] }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into scroll definitions.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn from_scrolls(scrolls: Vec<ScrollDefinition>) -> Self {
        Self { scrolls }
    }

    /// Look up a scroll by name, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScrollDefinition> {
        let wanted = name.trim();
        self.scrolls
            .iter()
            .find(|scroll| scroll.name.eq_ignore_ascii_case(wanted))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScrollDefinition> {
        self.scrolls.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scrolls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scrolls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_matches_enhancement_table() {
        let catalog = ScrollCatalog::standard();
        let names: Vec<&str> = catalog.iter().map(ScrollDefinition::name).collect();
        assert_eq!(names, ["10%", "30%", "60%", "70%", "100%"]);

        let risky = catalog.get("30%").unwrap();
        assert!((risky.success_rate() - 0.30).abs() < f64::EPSILON);
        assert!(risky.can_destroy_on_failure());
        assert_eq!(risky.ability_value_on_success(), 5);

        let safe = catalog.get("100%").unwrap();
        assert!(!safe.can_destroy_on_failure());
        assert_eq!(safe.ability_value_on_success(), 1);
    }

    #[test]
    fn catalog_from_json_sanitizes_rates() {
        let json = r#"{
            "scrolls": [
                { "name": "Blessed", "success_rate": 1.5, "ability_value_on_success": 9 },
                { "name": "Cursed", "success_rate": -0.2, "can_destroy_on_failure": true }
            ]
        }"#;

        let catalog = ScrollCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        let blessed = catalog.get("blessed").unwrap();
        assert!((blessed.success_rate() - 1.0).abs() < f64::EPSILON);
        assert!(!blessed.can_destroy_on_failure());
        let cursed = catalog.get("CURSED").unwrap();
        assert!(cursed.success_rate().abs() < f64::EPSILON);
        assert_eq!(cursed.ability_value_on_success(), 0);
    }

    #[test]
    fn unknown_scroll_is_none() {
        assert!(ScrollCatalog::standard().get("50%").is_none());
        assert!(ScrollCatalog::default().is_empty());
    }
}
