//! Integration tests for end-of-day streak resolution over the memory store.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use lumina_core::daily_log::DailyLogPatch;
use lumina_core::store::{DailyLogStore, MemoryStore, ProfileStore, TaskStore};
use lumina_core::streak::{
    DayOutcome, Resolution, StreakEffect, StreakLedger, UserLocks, FREEZE_CAP,
};
use lumina_core::task::{NewTask, Task, TaskOwner, TaskType};
use lumina_core::{StoreError, StreakState};

const USER: &str = "user-1";

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn add_task(
    store: &MemoryStore,
    task_type: TaskType,
    owner: TaskOwner,
    streak_required: bool,
    completed: bool,
) -> Task {
    let mut task = Task::capture(
        NewTask {
            user_id: USER.into(),
            title: format!("{task_type} task"),
            task_type,
            streak_required,
            due_date: Some(day()),
            owner,
            ..Default::default()
        },
        Utc::now(),
    )
    .unwrap();
    task.set_completed(completed, Utc::now());
    store.insert_task(&task).unwrap();
    task
}

fn store_with(state: StreakState) -> MemoryStore {
    let store = MemoryStore::new();
    store.put_profile(USER, state);
    store.upsert(USER, day(), &DailyLogPatch::default()).unwrap();
    store
}

fn ledger(store: &MemoryStore) -> StreakLedger<&MemoryStore, &MemoryStore> {
    StreakLedger::new(store, store)
}

fn profile(store: &MemoryStore) -> StreakState {
    ProfileStore::get(store, USER).unwrap().unwrap()
}

#[test]
fn met_day_extends_streak() {
    let store = store_with(StreakState::new(3, 10, 0));
    add_task(&store, TaskType::Foundation, TaskOwner::Primary, false, true);
    add_task(&store, TaskType::Standard, TaskOwner::Primary, true, true);

    let resolution = ledger(&store).resolve_day(USER, day()).unwrap();
    let resolved = resolution.resolved().unwrap();
    assert!(resolved.met);
    assert_eq!(resolved.effect, StreakEffect::Extended { freeze_granted: false });
    assert_eq!(profile(&store), StreakState::new(4, 10, 0));

    let log = DailyLogStore::get(&store, USER, day()).unwrap().unwrap();
    assert_eq!(log.streak_met, Some(true));
}

#[test]
fn empty_day_is_vacuously_met() {
    let store = store_with(StreakState::default());
    let resolution = ledger(&store).resolve_day(USER, day()).unwrap();
    assert!(resolution.resolved().unwrap().met);
    assert_eq!(profile(&store).streak_count, 1);
}

#[test]
fn resolving_twice_is_a_no_op() {
    let store = store_with(StreakState::new(3, 3, 1));
    add_task(&store, TaskType::Foundation, TaskOwner::Primary, false, true);
    let ledger = ledger(&store);

    assert!(ledger.resolve_day(USER, day()).unwrap().resolved().is_some());
    let after_first = profile(&store);

    assert_eq!(
        ledger.resolve_day(USER, day()).unwrap(),
        Resolution::AlreadyResolved { day: day() }
    );
    assert_eq!(profile(&store), after_first);
}

#[test]
fn miss_spends_a_freeze() {
    let store = store_with(StreakState::new(12, 20, 2));
    add_task(&store, TaskType::Foundation, TaskOwner::Primary, false, false);

    let resolution = ledger(&store).resolve_day(USER, day()).unwrap();
    assert_eq!(resolution.resolved().unwrap().effect, StreakEffect::FreezeUsed);
    assert_eq!(profile(&store), StreakState::new(12, 20, 1));
}

#[test]
fn miss_without_freeze_resets() {
    let store = store_with(StreakState::new(12, 20, 0));
    add_task(&store, TaskType::Standard, TaskOwner::Primary, true, false);

    let resolution = ledger(&store).resolve_day(USER, day()).unwrap();
    let resolved = resolution.resolved().unwrap();
    assert!(!resolved.met);
    assert_eq!(resolved.effect, StreakEffect::Reset { lost: 12 });
    assert_eq!(profile(&store), StreakState::new(0, 20, 0));
}

#[test]
fn seventh_day_grants_a_freeze_and_milestone() {
    let store = store_with(StreakState::new(6, 6, 1));
    let resolution = ledger(&store).resolve_day(USER, day()).unwrap();
    let resolved = resolution.resolved().unwrap();

    assert_eq!(resolved.effect, StreakEffect::Extended { freeze_granted: true });
    assert_eq!(profile(&store), StreakState::new(7, 7, 2));
    assert_eq!(resolved.milestone().map(|m| m.streak), Some(7));
}

#[test]
fn freeze_grant_stops_at_cap() {
    let store = store_with(StreakState::new(6, 6, FREEZE_CAP));
    let resolution = ledger(&store).resolve_day(USER, day()).unwrap();
    assert_eq!(
        resolution.resolved().unwrap().effect,
        StreakEffect::Extended { freeze_granted: false }
    );
    assert_eq!(profile(&store), StreakState::new(7, 7, FREEZE_CAP));
}

#[test]
fn gentle_mode_ignores_streak_required_tasks() {
    let store = store_with(StreakState::new(5, 5, 0));
    store
        .upsert(USER, day(), &DailyLogPatch::gentle_mode(true))
        .unwrap();
    add_task(&store, TaskType::Foundation, TaskOwner::Primary, false, true);
    add_task(&store, TaskType::DeepWork, TaskOwner::Primary, true, false);

    let resolution = ledger(&store).resolve_day(USER, day()).unwrap();
    let resolved = resolution.resolved().unwrap();
    assert!(resolved.met);
    match resolved.outcome {
        DayOutcome::Evaluated(evaluation) => {
            assert!(evaluation.foundation_complete);
            assert_eq!(evaluation.streak_tasks_complete, None);
        }
        DayOutcome::NoLog => panic!("expected an evaluated day"),
    }
}

#[test]
fn gentle_mode_still_requires_foundation() {
    let store = store_with(StreakState::new(5, 5, 0));
    store
        .upsert(USER, day(), &DailyLogPatch::gentle_mode(true))
        .unwrap();
    add_task(&store, TaskType::Foundation, TaskOwner::Primary, false, false);

    let resolution = ledger(&store).resolve_day(USER, day()).unwrap();
    assert!(!resolution.resolved().unwrap().met);
}

#[test]
fn partner_foundation_does_not_gate_streak() {
    let store = store_with(StreakState::new(2, 2, 0));
    add_task(&store, TaskType::Foundation, TaskOwner::Primary, false, true);
    add_task(&store, TaskType::Foundation, TaskOwner::Partner, false, false);

    let resolution = ledger(&store).resolve_day(USER, day()).unwrap();
    assert!(resolution.resolved().unwrap().met);
    assert_eq!(profile(&store).streak_count, 3);
}

#[test]
fn missing_log_is_an_automatic_miss_recorded_once() {
    let store = MemoryStore::new();
    store.put_profile(USER, StreakState::new(4, 4, 0));
    // Completed tasks are not consulted when there is no log.
    add_task(&store, TaskType::Foundation, TaskOwner::Primary, false, true);

    let ledger = ledger(&store);
    let resolution = ledger.resolve_day(USER, day()).unwrap();
    let resolved = resolution.resolved().unwrap();
    assert_eq!(resolved.outcome, DayOutcome::NoLog);
    assert!(!resolved.met);
    assert_eq!(profile(&store).streak_count, 0);

    let log = DailyLogStore::get(&store, USER, day()).unwrap().unwrap();
    assert_eq!(log.streak_met, Some(false));
    assert_eq!(
        ledger.resolve_day(USER, day()).unwrap(),
        Resolution::AlreadyResolved { day: day() }
    );
}

#[test]
fn missing_profile_writes_nothing() {
    let store = MemoryStore::new();
    let resolution = ledger(&store).resolve_day(USER, day()).unwrap();
    assert_eq!(resolution, Resolution::NoProfile { day: day() });
    assert!(DailyLogStore::get(&store, USER, day()).unwrap().is_none());
}

#[test]
fn unavailable_store_leaves_day_unresolved_for_retry() {
    let store = store_with(StreakState::new(3, 3, 0));
    add_task(&store, TaskType::Foundation, TaskOwner::Primary, false, true);
    let ledger = ledger(&store);

    store.fail_on("list_tasks");
    assert!(matches!(
        ledger.resolve_day(USER, day()),
        Err(StoreError::Unavailable { .. })
    ));
    store.heal();

    let log = DailyLogStore::get(&store, USER, day()).unwrap().unwrap();
    assert!(log.streak_met.is_none());
    assert_eq!(profile(&store).streak_count, 3);

    assert!(ledger.resolve_day(USER, day()).unwrap().resolved().is_some());
    assert_eq!(profile(&store).streak_count, 4);
}

#[test]
fn profile_write_failure_leaves_day_unresolved_for_retry() {
    let store = store_with(StreakState::new(3, 3, 0));
    let ledger = ledger(&store);

    store.fail_on("update_profile");
    assert!(ledger.resolve_day(USER, day()).is_err());
    store.heal();

    let log = DailyLogStore::get(&store, USER, day()).unwrap().unwrap();
    assert!(log.streak_met.is_none());
    assert_eq!(profile(&store).streak_count, 3);

    let retry = ledger.resolve_day(USER, day()).unwrap();
    assert!(retry.resolved().unwrap().met);
    assert_eq!(profile(&store), StreakState::new(4, 4, 0));
}

#[test]
fn missed_day_profile_failure_is_retried_too() {
    let store = MemoryStore::new();
    store.put_profile(USER, StreakState::new(5, 5, 1));
    let ledger = ledger(&store);

    store.fail_on("update_profile");
    assert!(ledger.resolve_day(USER, day()).is_err());
    store.heal();
    assert!(DailyLogStore::get(&store, USER, day()).unwrap().is_none());

    let retry = ledger.resolve_day(USER, day()).unwrap();
    assert_eq!(retry.resolved().unwrap().effect, StreakEffect::FreezeUsed);
    assert_eq!(profile(&store), StreakState::new(5, 5, 0));
}

#[test]
fn resolving_consecutive_days_accumulates() {
    let store = MemoryStore::new();
    store.put_profile(USER, StreakState::new(5, 5, 0));
    let next = day().succ_opt().unwrap();
    store.upsert(USER, day(), &DailyLogPatch::default()).unwrap();
    store.upsert(USER, next, &DailyLogPatch::default()).unwrap();

    let ledger = ledger(&store);
    ledger.resolve_day(USER, day()).unwrap();
    let second = ledger.resolve_day(USER, next).unwrap();

    let resolved = second.resolved().unwrap();
    assert_eq!(resolved.before, StreakState::new(6, 6, 0));
    assert_eq!(resolved.after, StreakState::new(7, 7, 1));
}

#[test]
fn end_of_day_uses_previous_logical_day() {
    let store = store_with(StreakState::default());
    let tz = FixedOffset::east_opt(9 * 3600).unwrap();

    // 03:30 on the 12th still belongs to the 11th, so the 10th is resolved.
    let now = tz.with_ymd_and_hms(2026, 3, 12, 3, 30, 0).unwrap();
    let resolution = ledger(&store).process_end_of_day(USER, &now).unwrap();
    assert_eq!(resolution.day(), day());
    assert!(resolution.resolved().is_some());
}

#[test]
fn concurrent_ledgers_resolve_exactly_once() {
    let store = store_with(StreakState::new(6, 6, 0));
    let shared_locks = Arc::new(UserLocks::new());

    let resolutions: Vec<Resolution> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = &store;
                let locks = Arc::clone(&shared_locks);
                scope.spawn(move || {
                    // Half share a lock registry, half rely only on the store.
                    let ledger = StreakLedger::new(store, store);
                    let ledger = if i % 2 == 0 {
                        ledger.with_locks(locks)
                    } else {
                        ledger
                    };
                    ledger.resolve_day(USER, day()).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let applied = resolutions
        .iter()
        .filter(|r| r.resolved().is_some())
        .count();
    assert_eq!(applied, 1);
    assert_eq!(profile(&store), StreakState::new(7, 7, 1));
}
