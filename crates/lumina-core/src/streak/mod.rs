//! Streak ledger and end-of-day resolution.
//!
//! Once per session bootstrap the ledger resolves the logical day *before*
//! "now". A day is resolved at most once: its daily log's `streak_met` moves
//! from `None` to `Some(met)` in the same atomic store write that updates the
//! profile, so either both land or neither does.
//!
//! ```text
//!   NoLog ───────────────────────────────> automatic miss
//!   Unresolved ── evaluate tasks ── met ─> increment
//!                                  └ !met > miss
//!   Resolved ────────────────────────────> no-op
//! ```
//!
//! A miss spends a freeze when one is available and resets the streak
//! otherwise. Every [`FREEZE_GRANT_INTERVAL`]-th consecutive day grants a
//! freeze, up to [`FREEZE_CAP`].

pub mod locks;
pub mod milestone;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;

use crate::calendar::{format_day, previous_logical_day};
use crate::error::StoreError;
use crate::profile::StreakState;
use crate::store::{DailyLogStore, ProfileStore, StreakStore, TaskStore};
use crate::task::{Task, TaskFilter};

pub use locks::UserLocks;
pub use milestone::Milestone;

/// Upper bound on banked freezes.
pub const FREEZE_CAP: u32 = 3;

/// A freeze is granted whenever the streak reaches a multiple of this.
pub const FREEZE_GRANT_INTERVAL: u32 = 7;

/// What a resolution did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreakEffect {
    /// Day met, streak extended
    Extended { freeze_granted: bool },
    /// Day missed, a freeze absorbed it
    FreezeUsed,
    /// Day missed with no freeze left
    Reset { lost: u32 },
}

/// Task-based verdict for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayEvaluation {
    pub foundation_complete: bool,
    /// `None` when gentle mode skipped the check
    pub streak_tasks_complete: Option<bool>,
    pub met: bool,
}

fn all_completed(tasks: &[Task]) -> bool {
    tasks.iter().all(|t| t.completed)
}

impl DayEvaluation {
    /// Evaluate from pre-filtered task sets. Pass `None` for `streak_tasks`
    /// in gentle mode.
    pub fn from_parts(foundation: &[Task], streak_tasks: Option<&[Task]>) -> Self {
        let foundation_complete = all_completed(foundation);
        let streak_tasks_complete = streak_tasks.map(all_completed);
        Self {
            foundation_complete,
            streak_tasks_complete,
            met: foundation_complete && streak_tasks_complete.unwrap_or(true),
        }
    }

    /// Evaluate a full list of one day's tasks.
    pub fn evaluate(day_tasks: &[Task], is_gentle_mode: bool) -> Self {
        let select = |filter: TaskFilter| -> Vec<Task> {
            day_tasks
                .iter()
                .filter(|t| filter.matches(t))
                .cloned()
                .collect()
        };
        let foundation = select(TaskFilter::primary_foundation());
        let streak_tasks = (!is_gentle_mode).then(|| select(TaskFilter::streak_required()));
        Self::from_parts(&foundation, streak_tasks.as_deref())
    }
}

/// How a resolved day was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DayOutcome {
    /// No daily log existed: unconditional miss, tasks not consulted
    NoLog,
    Evaluated(DayEvaluation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedDay {
    pub day: NaiveDate,
    pub outcome: DayOutcome,
    pub met: bool,
    pub effect: StreakEffect,
    pub before: StreakState,
    pub after: StreakState,
}

impl ResolvedDay {
    /// Milestone reached by this resolution, if any.
    pub fn milestone(&self) -> Option<Milestone> {
        match self.effect {
            StreakEffect::Extended { .. } => Milestone::for_streak(self.after.streak_count),
            StreakEffect::FreezeUsed | StreakEffect::Reset { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// No profile yet; nothing written, safe to retry
    NoProfile { day: NaiveDate },
    /// Day already resolved (possibly by a concurrent session)
    AlreadyResolved { day: NaiveDate },
    Resolved(ResolvedDay),
}

impl Resolution {
    pub fn day(&self) -> NaiveDate {
        match self {
            Resolution::NoProfile { day } | Resolution::AlreadyResolved { day } => *day,
            Resolution::Resolved(resolved) => resolved.day,
        }
    }

    pub fn resolved(&self) -> Option<&ResolvedDay> {
        match self {
            Resolution::Resolved(resolved) => Some(resolved),
            Resolution::NoProfile { .. } | Resolution::AlreadyResolved { .. } => None,
        }
    }
}

/// Profile change written together with a day's `streak_met`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakCommit {
    pub before: StreakState,
    pub after: StreakState,
    pub effect: StreakEffect,
}

impl StreakCommit {
    /// Apply the increment or miss bookkeeping for `met` to `before`.
    pub fn settle(before: StreakState, met: bool) -> Self {
        let (after, effect) = if met {
            apply_increment(before)
        } else {
            apply_miss(before)
        };
        Self {
            before,
            after,
            effect,
        }
    }
}

/// Streak bookkeeping for a met day.
pub fn apply_increment(state: StreakState) -> (StreakState, StreakEffect) {
    let streak_count = state.streak_count.saturating_add(1);
    let longest_streak = state.longest_streak.max(streak_count);

    let earns_freeze =
        streak_count % FREEZE_GRANT_INTERVAL == 0 && state.streak_freezes < FREEZE_CAP;
    let streak_freezes = if earns_freeze {
        state.streak_freezes + 1
    } else {
        state.streak_freezes
    };

    (
        StreakState {
            streak_count,
            longest_streak,
            streak_freezes,
        },
        StreakEffect::Extended {
            freeze_granted: earns_freeze,
        },
    )
}

/// Streak bookkeeping for a missed day.
pub fn apply_miss(state: StreakState) -> (StreakState, StreakEffect) {
    if state.streak_freezes > 0 {
        (
            StreakState {
                streak_freezes: state.streak_freezes - 1,
                ..state
            },
            StreakEffect::FreezeUsed,
        )
    } else {
        (
            StreakState {
                streak_count: 0,
                ..state
            },
            StreakEffect::Reset {
                lost: state.streak_count,
            },
        )
    }
}

/// Resolves past days against the task store and a [`StreakStore`].
pub struct StreakLedger<T, S> {
    tasks: T,
    store: S,
    locks: Arc<UserLocks>,
}

impl<T, S> StreakLedger<T, S>
where
    T: TaskStore,
    S: StreakStore,
{
    pub fn new(tasks: T, store: S) -> Self {
        Self {
            tasks,
            store,
            locks: Arc::new(UserLocks::new()),
        }
    }

    /// Share a lock registry with other ledgers in the same process.
    pub fn with_locks(mut self, locks: Arc<UserLocks>) -> Self {
        self.locks = locks;
        self
    }

    /// Resolve the logical day before `now`.
    pub fn process_end_of_day<Tz: TimeZone>(
        &self,
        user_id: &str,
        now: &DateTime<Tz>,
    ) -> Result<Resolution, StoreError> {
        self.resolve_day(user_id, previous_logical_day(now))
    }

    /// Resolve `day` for `user_id`. Re-resolving a day is a no-op.
    pub fn resolve_day(&self, user_id: &str, day: NaiveDate) -> Result<Resolution, StoreError> {
        self.locks
            .with_lock(user_id, || self.resolve_day_locked(user_id, day))
    }

    fn resolve_day_locked(&self, user_id: &str, day: NaiveDate) -> Result<Resolution, StoreError> {
        if ProfileStore::get(&self.store, user_id)?.is_none() {
            tracing::debug!(user_id, day = %format_day(day), "no profile, skipping resolution");
            return Ok(Resolution::NoProfile { day });
        }

        let outcome = match DailyLogStore::get(&self.store, user_id, day)? {
            None => DayOutcome::NoLog,
            Some(log) if log.is_resolved() => {
                tracing::debug!(user_id, day = %format_day(day), "day already resolved");
                return Ok(Resolution::AlreadyResolved { day });
            }
            Some(log) => DayOutcome::Evaluated(self.evaluate(user_id, day, log.is_gentle_mode)?),
        };

        let met = match outcome {
            DayOutcome::NoLog => false,
            DayOutcome::Evaluated(evaluation) => evaluation.met,
        };

        let Some(commit) = self.store.commit_resolution(user_id, day, met)? else {
            tracing::warn!(
                user_id,
                day = %format_day(day),
                "lost resolution race, leaving streak untouched"
            );
            return Ok(Resolution::AlreadyResolved { day });
        };

        tracing::info!(
            user_id,
            day = %format_day(day),
            met,
            effect = ?commit.effect,
            streak = commit.after.streak_count,
            freezes = commit.after.streak_freezes,
            "resolved day"
        );

        Ok(Resolution::Resolved(ResolvedDay {
            day,
            outcome,
            met,
            effect: commit.effect,
            before: commit.before,
            after: commit.after,
        }))
    }

    fn evaluate(
        &self,
        user_id: &str,
        day: NaiveDate,
        is_gentle_mode: bool,
    ) -> Result<DayEvaluation, StoreError> {
        let foundation =
            self.tasks
                .list_tasks_filtered(user_id, day, &TaskFilter::primary_foundation())?;
        let streak_tasks = if is_gentle_mode {
            None
        } else {
            Some(
                self.tasks
                    .list_tasks_filtered(user_id, day, &TaskFilter::streak_required())?,
            )
        };
        Ok(DayEvaluation::from_parts(&foundation, streak_tasks.as_deref()))
    }
}
