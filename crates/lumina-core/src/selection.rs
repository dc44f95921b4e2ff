//! "Just start" task selection.
//!
//! Picks exactly one incomplete task to suggest as a starting point. The
//! ordering is total and deterministic:
//!
//! 1. overdue streak-required tasks
//! 2. streak-required tasks due today
//! 3. foundation tasks
//! 4. everything else, heaviest cognitive cost first
//!
//! Within a tier the earliest task in input order wins.

use chrono::NaiveDate;
use serde::Serialize;

use crate::task::{Task, TaskType};

/// Tier that produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTier {
    OverdueStreak,
    StreakDueToday,
    Foundation,
    HeaviestRemaining,
}

impl SelectionTier {
    pub fn description(&self) -> &'static str {
        match self {
            SelectionTier::OverdueStreak => "Overdue streak task",
            SelectionTier::StreakDueToday => "Streak task due today",
            SelectionTier::Foundation => "Foundation task",
            SelectionTier::HeaviestRemaining => "Heaviest remaining task",
        }
    }
}

/// Tier of an incomplete task, ignoring cost.
fn urgency_tier(task: &Task, today: NaiveDate) -> SelectionTier {
    if task.streak_required && task.is_due_before(today) {
        return SelectionTier::OverdueStreak;
    }
    if task.streak_required && task.is_due_on(today) {
        return SelectionTier::StreakDueToday;
    }
    match task.task_type {
        TaskType::Foundation => SelectionTier::Foundation,
        TaskType::Routine | TaskType::Standard | TaskType::DeepWork => {
            SelectionTier::HeaviestRemaining
        }
    }
}

/// Select the task to start with, or `None` when every task is done.
pub fn select_just_start(tasks: &[Task], today: NaiveDate) -> Option<&Task> {
    select_with_tier(tasks, today).map(|(task, _)| task)
}

/// Like [`select_just_start`] but also reports which tier decided.
pub fn select_with_tier(tasks: &[Task], today: NaiveDate) -> Option<(&Task, SelectionTier)> {
    let mut best: Option<(&Task, SelectionTier)> = None;

    for task in tasks.iter().filter(|t| !t.completed) {
        let tier = urgency_tier(task, today);
        let replace = match best {
            None => true,
            Some((current, current_tier)) => {
                tier < current_tier
                    || (tier == current_tier
                        && tier == SelectionTier::HeaviestRemaining
                        && task.cognitive_cost > current.cognitive_cost)
            }
        };
        if replace {
            best = Some((task, tier));
        }
    }

    best
}
