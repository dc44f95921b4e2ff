//! Static transit interpretation lookup.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub short: String,
    pub long: String,
    pub source: String,
}

type AspectEntries = HashMap<String, Interpretation>;

/// Interpretations keyed by transit point, then `to<Natal>`, then aspect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterpretationTable {
    #[serde(rename = "transitToNatal", default)]
    transit_to_natal: HashMap<String, HashMap<String, AspectEntries>>,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn natal_key(natal_point: &str) -> String {
    format!("to{}", capitalize(natal_point))
}

impl InterpretationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }

    pub fn insert(
        &mut self,
        transit_point: &str,
        aspect: &str,
        natal_point: &str,
        interpretation: Interpretation,
    ) {
        self.transit_to_natal
            .entry(transit_point.to_lowercase())
            .or_default()
            .entry(natal_key(natal_point))
            .or_default()
            .insert(aspect.to_lowercase(), interpretation);
    }

    /// Interpretation for a transit, or the placeholder entry when the table
    /// has nothing for it.
    pub fn lookup(&self, transit_point: &str, aspect: &str, natal_point: &str) -> Interpretation {
        self.transit_to_natal
            .get(&transit_point.to_lowercase())
            .and_then(|by_natal| by_natal.get(&natal_key(natal_point)))
            .and_then(|by_aspect| by_aspect.get(&aspect.to_lowercase()))
            .cloned()
            .unwrap_or_else(|| Self::fallback(transit_point, aspect, natal_point))
    }

    pub fn fallback(transit_point: &str, aspect: &str, natal_point: &str) -> Interpretation {
        Interpretation {
            short: format!(
                "{} {} {} - Interpretation coming soon",
                capitalize(transit_point),
                aspect,
                capitalize(natal_point)
            ),
            long: "This transit interpretation is being added. Check back later.".to_string(),
            source: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "transitToNatal": {
            "saturn": {
                "toSun": {
                    "square": {
                        "short": "Pressure on identity",
                        "long": "A testing season for how you show up.",
                        "source": "hand-written"
                    }
                }
            }
        }
    }"#;

    #[test]
    fn lookup_normalizes_keys() {
        let table = InterpretationTable::from_json_str(SAMPLE).unwrap();
        let hit = table.lookup("Saturn", "square", "SUN");
        assert_eq!(hit.short, "Pressure on identity");
        assert_eq!(hit.source, "hand-written");
    }

    #[test]
    fn missing_entry_uses_fallback() {
        let table = InterpretationTable::new();
        let miss = table.lookup("mars", "trine", "moon");
        assert_eq!(miss.short, "Mars trine Moon - Interpretation coming soon");
        assert!(miss.source.is_empty());
    }

    #[test]
    fn insert_then_lookup() {
        let mut table = InterpretationTable::new();
        let entry = Interpretation {
            short: "s".into(),
            long: "l".into(),
            source: "x".into(),
        };
        table.insert("Venus", "Trine", "ascendant", entry.clone());
        assert_eq!(table.lookup("venus", "trine", "Ascendant"), entry);
    }
}
