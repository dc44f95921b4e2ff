//! User feedback on whether a transit resonated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::aspects::{Aspect, AspectKind};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resonance {
    Positive,
    Negative,
    Neutral,
}

impl Resonance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resonance::Positive => "positive",
            Resonance::Negative => "negative",
            Resonance::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Resonance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resonance {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "+" => Ok(Resonance::Positive),
            "negative" | "-" => Ok(Resonance::Negative),
            "neutral" | "0" => Ok(Resonance::Neutral),
            other => Err(ValidationError::InvalidValue {
                field: "resonance".to_string(),
                message: format!("unknown resonance '{other}'"),
            }),
        }
    }
}

/// One append-only feedback record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitFeedback {
    pub user_id: String,
    pub log_date: NaiveDate,
    pub transit_point: String,
    pub natal_point: String,
    pub aspect: AspectKind,
    pub resonance: Resonance,
}

impl TransitFeedback {
    pub fn for_aspect(
        user_id: &str,
        day: NaiveDate,
        aspect: &Aspect,
        resonance: Resonance,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            log_date: day,
            transit_point: aspect.transit_point.clone(),
            natal_point: aspect.natal_point.clone(),
            aspect: aspect.kind,
            resonance,
        }
    }
}
