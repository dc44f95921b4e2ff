//! Daily transit positions and the "cosmic weather" summary built on them.
//!
//! The ephemeris is read-only reference data keyed by logical day string.
//! A missing day is a normal outcome, reported as `None`.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::aspects::{find_aspects_limited, Aspect};
use super::{CelestialPosition, Chart};
use crate::calendar::format_day;
use crate::error::{ConfigError, CoreError};

pub trait EphemerisSource {
    /// Transit positions for `day`, or `None` when the source has no entry.
    fn positions_for(&self, day: NaiveDate) -> Option<Chart>;
}

/// Ephemeris loaded from a JSON document of the form
/// `{"data": {"2026-03-10": {"sun": {"sign": "Pisces", "longitude": 349.6}}}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonEphemeris {
    #[serde(default)]
    data: HashMap<String, Chart>,
}

impl JsonEphemeris {
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
        let ephemeris = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), days = ephemeris.len(), "loaded ephemeris");
        Ok(ephemeris)
    }

    pub fn insert(&mut self, day: NaiveDate, chart: Chart) {
        self.data.insert(format_day(day), chart);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl EphemerisSource for JsonEphemeris {
    fn positions_for(&self, day: NaiveDate) -> Option<Chart> {
        self.data.get(&format_day(day)).cloned()
    }
}

/// Today's transiting moon and the strongest aspects to the natal chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CosmicWeather {
    pub day: NaiveDate,
    pub moon: Option<CelestialPosition>,
    pub aspects: Vec<Aspect>,
}

impl CosmicWeather {
    /// No aspect within orb today.
    pub fn is_quiet(&self) -> bool {
        self.aspects.is_empty()
    }
}

/// Build the cosmic weather for `day`, or `None` when the ephemeris has no
/// data for it.
pub fn cosmic_weather<E: EphemerisSource + ?Sized>(
    source: &E,
    natal: &Chart,
    day: NaiveDate,
    max_aspects: usize,
) -> Option<CosmicWeather> {
    let Some(transit) = source.positions_for(day) else {
        tracing::warn!(day = %format_day(day), "no ephemeris data");
        return None;
    };

    Some(CosmicWeather {
        day,
        moon: transit.get("moon").cloned(),
        aspects: find_aspects_limited(&transit, natal, max_aspects),
    })
}
