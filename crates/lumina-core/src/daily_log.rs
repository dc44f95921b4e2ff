//! Per-day log rows.
//!
//! One row exists per (user, logical day). Rows are created lazily by the
//! first upsert for that day. `streak_met` is written only by the streak
//! ledger and moves from `None` to `Some(_)` exactly once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyLog {
    pub id: String,
    pub user_id: String,
    pub log_date: NaiveDate,
    /// Morning energy, 1-5
    pub morning_energy: Option<u8>,
    #[serde(default)]
    pub morning_gratitudes: Vec<String>,
    pub morning_at: Option<DateTime<Utc>>,
    /// Evening mood, 1-5
    pub evening_mood: Option<u8>,
    pub evening_at: Option<DateTime<Utc>>,
    pub reflection_wins: Option<String>,
    pub reflection_challenges: Option<String>,
    pub reflection_tomorrow: Option<String>,
    pub journal_entry: Option<String>,
    /// `None` until the day has been resolved
    pub streak_met: Option<bool>,
    pub is_gentle_mode: bool,
    pub created_at: DateTime<Utc>,
}

impl DailyLog {
    /// An empty row for `day`.
    pub fn new(id: String, user_id: &str, day: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            log_date: day,
            morning_energy: None,
            morning_gratitudes: Vec::new(),
            morning_at: None,
            evening_mood: None,
            evening_at: None,
            reflection_wins: None,
            reflection_challenges: None,
            reflection_tomorrow: None,
            journal_entry: None,
            streak_met: None,
            is_gentle_mode: false,
            created_at: now,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.streak_met.is_some()
    }

    /// Overwrite every field the patch sets.
    pub fn apply(&mut self, patch: &DailyLogPatch) {
        if let Some(v) = patch.morning_energy {
            self.morning_energy = Some(v);
        }
        if let Some(v) = &patch.morning_gratitudes {
            self.morning_gratitudes = v.clone();
        }
        if let Some(v) = patch.morning_at {
            self.morning_at = Some(v);
        }
        if let Some(v) = patch.evening_mood {
            self.evening_mood = Some(v);
        }
        if let Some(v) = patch.evening_at {
            self.evening_at = Some(v);
        }
        if let Some(v) = &patch.reflection_wins {
            self.reflection_wins = v.clone();
        }
        if let Some(v) = &patch.reflection_challenges {
            self.reflection_challenges = v.clone();
        }
        if let Some(v) = &patch.reflection_tomorrow {
            self.reflection_tomorrow = v.clone();
        }
        if let Some(v) = &patch.journal_entry {
            self.journal_entry = v.clone();
        }
        if let Some(v) = patch.is_gentle_mode {
            self.is_gentle_mode = v;
        }
    }
}

/// Partial update for a daily log.
///
/// `None` leaves a field untouched. Text fields use `Some(None)` to clear.
/// `streak_met` is deliberately absent: it is owned by the streak ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyLogPatch {
    pub morning_energy: Option<u8>,
    pub morning_gratitudes: Option<Vec<String>>,
    pub morning_at: Option<DateTime<Utc>>,
    pub evening_mood: Option<u8>,
    pub evening_at: Option<DateTime<Utc>>,
    pub reflection_wins: Option<Option<String>>,
    pub reflection_challenges: Option<Option<String>>,
    pub reflection_tomorrow: Option<Option<String>>,
    pub journal_entry: Option<Option<String>>,
    pub is_gentle_mode: Option<bool>,
}

impl DailyLogPatch {
    pub fn gentle_mode(enabled: bool) -> Self {
        Self {
            is_gentle_mode: Some(enabled),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn apply_only_touches_set_fields() {
        let mut log = DailyLog::new("log-1".into(), "u", day(), Utc::now());
        log.reflection_wins = Some("shipped".into());

        log.apply(&DailyLogPatch {
            evening_mood: Some(4),
            ..Default::default()
        });
        assert_eq!(log.evening_mood, Some(4));
        assert_eq!(log.reflection_wins.as_deref(), Some("shipped"));

        log.apply(&DailyLogPatch {
            reflection_wins: Some(None),
            ..Default::default()
        });
        assert!(log.reflection_wins.is_none());
    }

    #[test]
    fn new_log_is_unresolved() {
        let log = DailyLog::new("log-1".into(), "u", day(), Utc::now());
        assert!(!log.is_resolved());
        assert!(!log.is_gentle_mode);
    }

    #[test]
    fn gentle_mode_patch() {
        let patch = DailyLogPatch::gentle_mode(true);
        assert!(!patch.is_empty());
        assert!(DailyLogPatch::default().is_empty());
    }
}
