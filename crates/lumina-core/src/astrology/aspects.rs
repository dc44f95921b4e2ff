//! Transit-to-natal aspect matching.
//!
//! Every (transit point, natal point) pair is tested against the five major
//! aspects. Matches are ranked by exactness, the absolute deviation from the
//! aspect's ideal angle, and only the tightest few are returned.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{symbol_for, Chart};
use crate::error::ValidationError;

/// Default number of aspects reported.
pub const DEFAULT_MAX_ASPECTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectKind {
    pub const ALL: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Sextile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Opposition,
    ];

    /// Ideal separation in degrees.
    pub fn angle(&self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Opposition => 180.0,
        }
    }

    /// Tolerance around the ideal angle in degrees.
    pub fn orb(&self) -> f64 {
        match self {
            AspectKind::Conjunction => 8.0,
            AspectKind::Sextile => 4.0,
            AspectKind::Square => 6.0,
            AspectKind::Trine => 6.0,
            AspectKind::Opposition => 8.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "☌",
            AspectKind::Sextile => "⚹",
            AspectKind::Square => "□",
            AspectKind::Trine => "△",
            AspectKind::Opposition => "☍",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Sextile => "sextile",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Opposition => "opposition",
        }
    }

    /// Deviation from exact when `separation` is within orb.
    pub fn exactness(&self, separation: f64) -> Option<f64> {
        let deviation = (separation - self.angle()).abs();
        (deviation <= self.orb()).then_some(deviation)
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AspectKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim().to_lowercase())
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "aspect".to_string(),
                message: format!("unknown aspect '{s}'"),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub transit_point: String,
    pub transit_symbol: String,
    pub natal_point: String,
    pub natal_symbol: String,
    pub kind: AspectKind,
    /// Degrees away from exact; lower is stronger
    pub exactness: f64,
    pub transit_sign: String,
}

/// Shortest angular distance between two longitudes, in `[0, 180]`.
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Tightest [`DEFAULT_MAX_ASPECTS`] aspects between `transit` and `natal`.
pub fn find_aspects(transit: &Chart, natal: &Chart) -> Vec<Aspect> {
    find_aspects_limited(transit, natal, DEFAULT_MAX_ASPECTS)
}

/// All aspects within orb, sorted by exactness and truncated to `limit`.
///
/// Equal exactness keeps chart iteration order (transit, then natal, then
/// aspect kind).
pub fn find_aspects_limited(transit: &Chart, natal: &Chart, limit: usize) -> Vec<Aspect> {
    let mut aspects = Vec::new();

    for (transit_point, transit_pos) in transit {
        for (natal_point, natal_pos) in natal {
            let separation = angular_separation(transit_pos.longitude, natal_pos.longitude);
            for kind in AspectKind::ALL {
                if let Some(exactness) = kind.exactness(separation) {
                    aspects.push(Aspect {
                        transit_point: transit_point.clone(),
                        transit_symbol: symbol_for(transit_point).to_string(),
                        natal_point: natal_point.clone(),
                        natal_symbol: symbol_for(natal_point).to_string(),
                        kind,
                        exactness,
                        transit_sign: transit_pos.sign.clone(),
                    });
                }
            }
        }
    }

    aspects.sort_by(|a, b| a.exactness.total_cmp(&b.exactness));
    aspects.truncate(limit);
    aspects
}
