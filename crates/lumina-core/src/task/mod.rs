//! Task model.
//!
//! A task's type decides its cognitive cost and whether it is a grouped
//! foundation task. Both are derived once, at capture, from the closed
//! [`TaskType`] enum.

pub mod sections;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

pub use sections::TaskSections;

/// Task category.
///
/// Foundation tasks are the daily anchors; the remaining variants differ in
/// how much effort they demand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Foundation,
    Routine,
    Standard,
    DeepWork,
}

impl TaskType {
    /// Relative effort used by the just-start fallback ordering.
    pub fn cognitive_cost(&self) -> f64 {
        match self {
            TaskType::Foundation => 0.5,
            TaskType::Routine => 0.5,
            TaskType::Standard => 1.0,
            TaskType::DeepWork => 2.0,
        }
    }

    /// Foundation tasks are rendered as one grouped block.
    pub fn is_grouped(&self) -> bool {
        matches!(self, TaskType::Foundation)
    }

    /// Foundation tasks count toward the streak implicitly and never carry
    /// the manual streak flag.
    pub fn allows_streak_flag(&self) -> bool {
        !self.is_grouped()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Foundation => "foundation",
            TaskType::Routine => "routine",
            TaskType::Standard => "standard",
            TaskType::DeepWork => "deep_work",
        }
    }
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::Standard
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "foundation" => Ok(TaskType::Foundation),
            "routine" => Ok(TaskType::Routine),
            "standard" => Ok(TaskType::Standard),
            "deep_work" => Ok(TaskType::DeepWork),
            other => Err(ValidationError::InvalidValue {
                field: "task_type".to_string(),
                message: format!("unknown task type '{other}'"),
            }),
        }
    }
}

/// Who a task belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskOwner {
    /// The account holder; only their foundation tasks gate the streak.
    Primary,
    Partner,
    Shared,
}

impl Default for TaskOwner {
    fn default() -> Self {
        TaskOwner::Primary
    }
}

impl TaskOwner {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOwner::Primary => "primary",
            TaskOwner::Partner => "partner",
            TaskOwner::Shared => "shared",
        }
    }
}

impl fmt::Display for TaskOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskOwner {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" => Ok(TaskOwner::Primary),
            "partner" => Ok(TaskOwner::Partner),
            "shared" => Ok(TaskOwner::Shared),
            other => Err(ValidationError::InvalidValue {
                field: "owner".to_string(),
                message: format!("unknown owner '{other}'"),
            }),
        }
    }
}

/// Capture input for a new task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub user_id: String,
    pub title: String,
    pub task_type: TaskType,
    pub streak_required: bool,
    pub due_date: Option<NaiveDate>,
    pub owner: TaskOwner,
    pub area: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub notes: Option<String>,
    /// Free-form area label ("health", "work", ...)
    pub area: Option<String>,
    pub task_type: TaskType,
    /// True iff `task_type` is foundation
    pub is_grouped_task: bool,
    pub owner: TaskOwner,
    pub cognitive_cost: f64,
    pub streak_required: bool,
    /// Logical day the task is due on
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    /// Set iff `completed`
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a task from capture input.
    ///
    /// Cost and grouping come from the task type, and the streak flag is
    /// dropped for foundation tasks.
    pub fn capture(input: NewTask, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ValidationError::Empty("title"));
        }
        if input.user_id.trim().is_empty() {
            return Err(ValidationError::Empty("user_id"));
        }

        let task_type = input.task_type;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id,
            title: title.to_string(),
            notes: input.notes.filter(|n| !n.trim().is_empty()),
            area: input.area.filter(|a| !a.trim().is_empty()),
            task_type,
            is_grouped_task: task_type.is_grouped(),
            owner: input.owner,
            cognitive_cost: task_type.cognitive_cost(),
            streak_required: task_type.allows_streak_flag() && input.streak_required,
            due_date: input.due_date,
            completed: false,
            completed_at: None,
            created_at: now,
        })
    }

    /// Toggle completion, keeping `completed_at` in step with `completed`.
    pub fn set_completed(&mut self, completed: bool, at: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = completed.then_some(at);
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_date == Some(day)
    }

    pub fn is_due_before(&self, day: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due < day)
    }
}

/// Field filter used by task store queries.
///
/// Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaskFilter {
    pub task_type: Option<TaskType>,
    pub owner: Option<TaskOwner>,
    pub streak_required: Option<bool>,
    pub completed: Option<bool>,
}

impl TaskFilter {
    /// Foundation tasks owned by the primary user.
    pub fn primary_foundation() -> Self {
        Self {
            task_type: Some(TaskType::Foundation),
            owner: Some(TaskOwner::Primary),
            ..Default::default()
        }
    }

    /// Tasks flagged as streak-required.
    pub fn streak_required() -> Self {
        Self {
            streak_required: Some(true),
            ..Default::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.task_type.map_or(true, |t| task.task_type == t)
            && self.owner.map_or(true, |o| task.owner == o)
            && self
                .streak_required
                .map_or(true, |s| task.streak_required == s)
            && self.completed.map_or(true, |c| task.completed == c)
    }
}
