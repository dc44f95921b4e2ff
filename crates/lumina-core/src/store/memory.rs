//! In-process store backed by mutex-guarded maps.
//!
//! Implements every store trait and is `Send + Sync`, so it can be shared
//! across threads. Individual operations can be made to fail, which is how
//! the unavailable-store paths are exercised.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{DailyLogStore, ProfileStore, StreakStore, TaskStore};
use crate::daily_log::{DailyLog, DailyLogPatch};
use crate::error::StoreError;
use crate::profile::{ProfilePatch, StreakState};
use crate::streak::StreakCommit;
use crate::task::{Task, TaskFilter};

#[derive(Default)]
struct Inner {
    tasks: Vec<Task>,
    logs: HashMap<(String, NaiveDate), DailyLog>,
    profiles: HashMap<String, StreakState>,
    failing: HashSet<&'static str>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StoreError::unavailable(operation, "memory store poisoned"))?;
        if guard.failing.contains(operation) {
            return Err(StoreError::unavailable(operation, "injected failure"));
        }
        Ok(guard)
    }

    /// Make every later call of `operation` fail until [`heal`](Self::heal).
    pub fn fail_on(&self, operation: &'static str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.insert(operation);
        }
    }

    pub fn heal(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.clear();
        }
    }

    /// Insert a profile with the given streak state, replacing any existing one.
    pub fn put_profile(&self, user_id: &str, state: StreakState) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.profiles.insert(user_id.to_string(), state);
        }
    }
}

impl TaskStore for MemoryStore {
    fn list_tasks_filtered(
        &self,
        user_id: &str,
        day: NaiveDate,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, StoreError> {
        let inner = self.lock("list_tasks")?;
        let mut tasks: Vec<Task> = inner
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id && t.is_due_on(day) && filter.matches(t))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    fn update_completion(&self, task_id: &str, completed: bool) -> Result<Task, StoreError> {
        let mut inner = self.lock("update_completion")?;
        let task = inner
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "task",
                key: task_id.to_string(),
            })?;
        task.set_completed(completed, Utc::now());
        Ok(task.clone())
    }

    fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut inner = self.lock("insert_task")?;
        inner.tasks.push(task.clone());
        Ok(())
    }
}

impl DailyLogStore for MemoryStore {
    fn get(&self, user_id: &str, day: NaiveDate) -> Result<Option<DailyLog>, StoreError> {
        let inner = self.lock("get_daily_log")?;
        Ok(inner.logs.get(&(user_id.to_string(), day)).cloned())
    }

    fn upsert(
        &self,
        user_id: &str,
        day: NaiveDate,
        patch: &DailyLogPatch,
    ) -> Result<DailyLog, StoreError> {
        let mut inner = self.lock("upsert_daily_log")?;
        let log = inner
            .logs
            .entry((user_id.to_string(), day))
            .or_insert_with(|| DailyLog::new(Uuid::new_v4().to_string(), user_id, day, Utc::now()));
        log.apply(patch);
        Ok(log.clone())
    }
}

impl ProfileStore for MemoryStore {
    fn get(&self, user_id: &str) -> Result<Option<StreakState>, StoreError> {
        let inner = self.lock("get_profile")?;
        Ok(inner.profiles.get(user_id).copied())
    }

    fn update(&self, user_id: &str, patch: &ProfilePatch) -> Result<(), StoreError> {
        let mut inner = self.lock("update_profile")?;
        let state = inner
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "profile",
                key: user_id.to_string(),
            })?;
        patch.apply_to(state);
        Ok(())
    }
}

impl StreakStore for MemoryStore {
    fn commit_resolution(
        &self,
        user_id: &str,
        day: NaiveDate,
        met: bool,
    ) -> Result<Option<StreakCommit>, StoreError> {
        let mut inner = self.lock("commit_resolution")?;
        let key = (user_id.to_string(), day);
        if inner.logs.get(&key).is_some_and(|log| log.is_resolved()) {
            return Ok(None);
        }

        let before = *inner
            .profiles
            .get(user_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "profile",
                key: user_id.to_string(),
            })?;
        let commit = StreakCommit::settle(before, met);

        // Both writes happen under this guard, so check injected failures first.
        if inner.failing.contains("update_profile") {
            return Err(StoreError::unavailable("update_profile", "injected failure"));
        }

        inner
            .logs
            .entry(key)
            .or_insert_with(|| DailyLog::new(Uuid::new_v4().to_string(), user_id, day, Utc::now()))
            .streak_met = Some(met);
        inner.profiles.insert(user_id.to_string(), commit.after);
        Ok(Some(commit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, TaskType};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn upsert_creates_then_merges() {
        let store = MemoryStore::new();
        let first = store.upsert("u", day(), &DailyLogPatch::gentle_mode(true)).unwrap();
        let second = store
            .upsert(
                "u",
                day(),
                &DailyLogPatch {
                    evening_mood: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(first.id, second.id);
        assert!(second.is_gentle_mode);
        assert_eq!(second.evening_mood, Some(3));
    }

    #[test]
    fn commit_resolution_is_compare_and_set() {
        let store = MemoryStore::new();
        store.put_profile("u", StreakState::new(2, 2, 0));

        let commit = store.commit_resolution("u", day(), true).unwrap().unwrap();
        assert_eq!(commit.after, StreakState::new(3, 3, 0));
        assert!(store.commit_resolution("u", day(), false).unwrap().is_none());

        let log = DailyLogStore::get(&store, "u", day()).unwrap().unwrap();
        assert_eq!(log.streak_met, Some(true));
        assert_eq!(ProfileStore::get(&store, "u").unwrap(), Some(commit.after));
    }

    #[test]
    fn failed_commit_writes_nothing() {
        let store = MemoryStore::new();
        store.put_profile("u", StreakState::new(2, 2, 0));
        store.fail_on("update_profile");
        assert!(store.commit_resolution("u", day(), true).is_err());
        store.heal();

        assert!(DailyLogStore::get(&store, "u", day()).unwrap().is_none());
        assert_eq!(
            ProfileStore::get(&store, "u").unwrap(),
            Some(StreakState::new(2, 2, 0))
        );
    }

    #[test]
    fn commit_without_profile_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.commit_resolution("u", day(), true),
            Err(StoreError::NotFound { entity: "profile", .. })
        ));
        assert!(DailyLogStore::get(&store, "u", day()).unwrap().is_none());
    }

    #[test]
    fn list_tasks_filters_by_user_day_and_filter() {
        let store = MemoryStore::new();
        let seeds = [
            ("u", TaskType::Foundation),
            ("u", TaskType::Standard),
            ("v", TaskType::Foundation),
        ];
        for (user, task_type) in seeds {
            let task = Task::capture(
                NewTask {
                    user_id: user.to_string(),
                    title: format!("{user} {task_type}"),
                    task_type,
                    due_date: Some(day()),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
            store.insert_task(&task).unwrap();
        }

        assert_eq!(store.list_tasks("u", day()).unwrap().len(), 2);
        let foundation = store
            .list_tasks_filtered("u", day(), &TaskFilter::primary_foundation())
            .unwrap();
        assert_eq!(foundation.len(), 1);
        assert!(store.list_tasks("u", day().succ_opt().unwrap()).unwrap().is_empty());
    }

    #[test]
    fn injected_failures_surface_as_unavailable() {
        let store = MemoryStore::new();
        store.fail_on("get_profile");
        assert!(matches!(
            ProfileStore::get(&store, "u"),
            Err(StoreError::Unavailable { .. })
        ));
        store.heal();
        assert!(ProfileStore::get(&store, "u").unwrap().is_none());
    }

    #[test]
    fn update_completion_unknown_task() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update_completion("missing", true),
            Err(StoreError::NotFound { entity: "task", .. })
        ));
    }
}
