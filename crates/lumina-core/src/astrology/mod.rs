//! Astrology overlay: charts, aspect matching, ephemeris and interpretations.
//!
//! Charts keep insertion order so that aspect ties are broken the same way
//! on every run.

pub mod aspects;
pub mod ephemeris;
pub mod feedback;
pub mod interpretation;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

pub use aspects::{angular_separation, find_aspects, find_aspects_limited, Aspect, AspectKind};
pub use ephemeris::{cosmic_weather, CosmicWeather, EphemerisSource, JsonEphemeris};
pub use feedback::{Resonance, TransitFeedback};
pub use interpretation::{Interpretation, InterpretationTable};

/// Symbol used for points without a glyph.
pub const UNKNOWN_SYMBOL: &str = "?";

/// Position of one point on the ecliptic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialPosition {
    pub sign: String,
    /// Ecliptic longitude in degrees, `[0, 360)`
    #[serde(deserialize_with = "normalized_longitude")]
    pub longitude: f64,
}

fn normalized_longitude<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    f64::deserialize(deserializer).map(|longitude| longitude.rem_euclid(360.0))
}

impl CelestialPosition {
    pub fn new(sign: impl Into<String>, longitude: f64) -> Self {
        Self {
            sign: sign.into(),
            longitude: longitude.rem_euclid(360.0),
        }
    }
}

/// Named points mapped to positions, in insertion order.
pub type Chart = IndexMap<String, CelestialPosition>;

/// Glyph for a named point, or [`UNKNOWN_SYMBOL`].
pub fn symbol_for(point: &str) -> &'static str {
    match point.to_lowercase().as_str() {
        "sun" => "☉",
        "moon" => "☽",
        "mercury" => "☿",
        "venus" => "♀",
        "mars" => "♂",
        "jupiter" => "♃",
        "saturn" => "♄",
        "pluto" => "♇",
        "ascendant" => "Asc",
        _ => UNKNOWN_SYMBOL,
    }
}

/// Built-in natal reference chart.
pub fn default_natal_chart() -> Chart {
    [
        ("sun", "Virgo", 160.13),
        ("moon", "Libra", 186.82),
        ("mercury", "Libra", 186.83),
        ("venus", "Libra", 198.43),
        ("mars", "Virgo", 169.1),
        ("jupiter", "Cancer", 96.12),
        ("saturn", "Capricorn", 277.37),
        ("pluto", "Scorpio", 222.87),
        ("ascendant", "Scorpio", 219.65),
    ]
    .into_iter()
    .map(|(point, sign, lon)| (point.to_string(), CelestialPosition::new(sign, lon)))
    .collect()
}
