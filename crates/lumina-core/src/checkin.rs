//! Morning and evening check-ins.
//!
//! Check-in input is validated here and turned into a [`DailyLogPatch`] that
//! callers upsert onto the current logical day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::daily_log::{DailyLog, DailyLogPatch};
use crate::error::ValidationError;

/// Lowest mood/energy rating
pub const MIN_RATING: u8 = 1;
/// Highest mood/energy rating
pub const MAX_RATING: u8 = 5;
/// Gratitude slots offered in the morning
pub const MAX_GRATITUDES: usize = 3;

/// Local hour before which a missing morning check-in is prompted.
pub const MORNING_PROMPT_UNTIL_HOUR: u32 = 12;
/// Local hour from which a missing evening check-in is prompted.
pub const EVENING_PROMPT_FROM_HOUR: u32 = 20;

fn rating(field: &'static str, value: u8) -> Result<u8, ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value: value as i64,
            min: MIN_RATING as i64,
            max: MAX_RATING as i64,
        })
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorningCheckin {
    pub energy: u8,
    pub gratitudes: Vec<String>,
}

impl MorningCheckin {
    /// Blank gratitudes are dropped; more than three is rejected.
    pub fn new<S: AsRef<str>>(energy: u8, gratitudes: &[S]) -> Result<Self, ValidationError> {
        let energy = rating("morning_energy", energy)?;
        let gratitudes: Vec<String> = gratitudes
            .iter()
            .map(|g| g.as_ref().trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();
        if gratitudes.len() > MAX_GRATITUDES {
            return Err(ValidationError::InvalidValue {
                field: "morning_gratitudes".to_string(),
                message: format!("at most {MAX_GRATITUDES} entries"),
            });
        }
        Ok(Self { energy, gratitudes })
    }

    pub fn into_patch(self, at: DateTime<Utc>) -> DailyLogPatch {
        DailyLogPatch {
            morning_energy: Some(self.energy),
            morning_gratitudes: Some(self.gratitudes),
            morning_at: Some(at),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EveningCheckin {
    pub mood: u8,
}

impl EveningCheckin {
    pub fn new(mood: u8) -> Result<Self, ValidationError> {
        Ok(Self {
            mood: rating("evening_mood", mood)?,
        })
    }

    pub fn into_patch(self, at: DateTime<Utc>) -> DailyLogPatch {
        DailyLogPatch {
            evening_mood: Some(self.mood),
            evening_at: Some(at),
            ..Default::default()
        }
    }
}

/// Evening reflection prompts. Blank answers are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reflection {
    pub wins: Option<String>,
    pub challenges: Option<String>,
    pub tomorrow: Option<String>,
}

impl Reflection {
    pub fn new(wins: Option<&str>, challenges: Option<&str>, tomorrow: Option<&str>) -> Self {
        Self {
            wins: optional_text(wins),
            challenges: optional_text(challenges),
            tomorrow: optional_text(tomorrow),
        }
    }

    pub fn into_patch(self) -> DailyLogPatch {
        DailyLogPatch {
            reflection_wins: Some(self.wins),
            reflection_challenges: Some(self.challenges),
            reflection_tomorrow: Some(self.tomorrow),
            ..Default::default()
        }
    }
}

pub fn journal_patch(entry: &str) -> DailyLogPatch {
    DailyLogPatch {
        journal_entry: Some(optional_text(Some(entry))),
        ..Default::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckinKind {
    Morning,
    Evening,
}

/// Which check-in, if any, should be prompted at `local_hour`.
pub fn pending_checkin(log: Option<&DailyLog>, local_hour: u32) -> Option<CheckinKind> {
    let morning_done = log.is_some_and(|l| l.morning_at.is_some());
    let evening_done = log.is_some_and(|l| l.evening_at.is_some());

    if local_hour < MORNING_PROMPT_UNTIL_HOUR && !morning_done {
        Some(CheckinKind::Morning)
    } else if local_hour >= EVENING_PROMPT_FROM_HOUR && !evening_done {
        Some(CheckinKind::Evening)
    } else {
        None
    }
}
