//! Narrow store contracts the engines read and write through.
//!
//! Any backing store works as long as it can upsert on the (user, day)
//! uniqueness key and commit a day's resolution atomically. Two
//! implementations ship with the crate: [`MemoryStore`] and the SQLite
//! [`Database`](crate::storage::Database).

pub mod memory;

use chrono::NaiveDate;

use crate::daily_log::{DailyLog, DailyLogPatch};
use crate::error::StoreError;
use crate::profile::{ProfilePatch, StreakState};
use crate::streak::StreakCommit;
use crate::task::{Task, TaskFilter};

pub use memory::MemoryStore;

pub trait TaskStore {
    /// Tasks due on `day`, in creation order.
    fn list_tasks(&self, user_id: &str, day: NaiveDate) -> Result<Vec<Task>, StoreError> {
        self.list_tasks_filtered(user_id, day, &TaskFilter::default())
    }

    fn list_tasks_filtered(
        &self,
        user_id: &str,
        day: NaiveDate,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, StoreError>;

    /// Set completion and return the updated task.
    fn update_completion(&self, task_id: &str, completed: bool) -> Result<Task, StoreError>;

    fn insert_task(&self, task: &Task) -> Result<(), StoreError>;
}

pub trait DailyLogStore {
    fn get(&self, user_id: &str, day: NaiveDate) -> Result<Option<DailyLog>, StoreError>;

    /// Create the row for (user, day) if needed, then apply `patch`.
    fn upsert(
        &self,
        user_id: &str,
        day: NaiveDate,
        patch: &DailyLogPatch,
    ) -> Result<DailyLog, StoreError>;
}

pub trait ProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<StreakState>, StoreError>;

    fn update(&self, user_id: &str, patch: &ProfilePatch) -> Result<(), StoreError>;
}

/// Daily logs and profiles that live in one store and can be written together.
pub trait StreakStore: DailyLogStore + ProfileStore {
    /// In one atomic step: move (user, day) from unresolved to
    /// `streak_met = met`, creating the log row if needed, and write
    /// [`StreakCommit::settle`] of the current profile back to the profile.
    ///
    /// Returns `None` without writing anything when the day is already
    /// resolved. On error nothing is written and the day stays unresolved.
    fn commit_resolution(
        &self,
        user_id: &str,
        day: NaiveDate,
        met: bool,
    ) -> Result<Option<StreakCommit>, StoreError>;
}

impl<T: TaskStore + ?Sized> TaskStore for &T {
    fn list_tasks_filtered(
        &self,
        user_id: &str,
        day: NaiveDate,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, StoreError> {
        (**self).list_tasks_filtered(user_id, day, filter)
    }

    fn update_completion(&self, task_id: &str, completed: bool) -> Result<Task, StoreError> {
        (**self).update_completion(task_id, completed)
    }

    fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        (**self).insert_task(task)
    }
}

impl<T: DailyLogStore + ?Sized> DailyLogStore for &T {
    fn get(&self, user_id: &str, day: NaiveDate) -> Result<Option<DailyLog>, StoreError> {
        (**self).get(user_id, day)
    }

    fn upsert(
        &self,
        user_id: &str,
        day: NaiveDate,
        patch: &DailyLogPatch,
    ) -> Result<DailyLog, StoreError> {
        (**self).upsert(user_id, day, patch)
    }
}

impl<T: ProfileStore + ?Sized> ProfileStore for &T {
    fn get(&self, user_id: &str) -> Result<Option<StreakState>, StoreError> {
        (**self).get(user_id)
    }

    fn update(&self, user_id: &str, patch: &ProfilePatch) -> Result<(), StoreError> {
        (**self).update(user_id, patch)
    }
}

impl<T: StreakStore + ?Sized> StreakStore for &T {
    fn commit_resolution(
        &self,
        user_id: &str,
        day: NaiveDate,
        met: bool,
    ) -> Result<Option<StreakCommit>, StoreError> {
        (**self).commit_resolution(user_id, day, met)
    }
}
