//! SQLite-backed store.
//!
//! Provides persistent storage for:
//! - Tasks
//! - Daily logs, keyed on (user_id, log_date)
//! - Profile streak state
//! - Transit feedback
//!
//! Implements every store trait. A day's resolution runs in one
//! `BEGIN IMMEDIATE` transaction: the `UPDATE ... WHERE streak_met IS NULL`
//! and the profile read-modify-write commit together, so two processes
//! sharing the same file resolve a day at most once between them and never
//! overwrite each other's profile update.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use uuid::Uuid;

use super::migrations;
use super::Config;
use crate::astrology::{Resonance, TransitFeedback};
use crate::calendar::format_day;
use crate::daily_log::{DailyLog, DailyLogPatch};
use crate::error::{Result, StoreError};
use crate::profile::{ProfilePatch, StreakState};
use crate::store::{DailyLogStore, ProfileStore, StreakStore, TaskStore};
use crate::streak::StreakCommit;
use crate::task::{Task, TaskFilter};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const TASK_COLUMNS: &str = "id, user_id, title, notes, area, task_type, is_grouped_task, owner,
     cognitive_cost, streak_required, due_date, completed, completed_at, created_at";

const LOG_COLUMNS: &str = "id, user_id, log_date, morning_energy, morning_gratitudes, morning_at,
     evening_mood, evening_at, reflection_wins, reflection_challenges, reflection_tomorrow,
     journal_entry, streak_met, is_gentle_mode, created_at";

/// SQLite database holding every lumina table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database configured in `config`, by default
    /// `~/.config/lumina/lumina.db`.
    ///
    /// # Errors
    /// Returns an error if the path cannot be resolved or the database cannot
    /// be opened or migrated.
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.database_path()?;
        Ok(Self::open_at(&path)?)
    }

    /// Open (creating if needed) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        migrations::migrate(&conn)?;
        tracing::debug!(
            version = migrations::get_schema_version(&conn),
            "database ready"
        );
        Ok(Self { conn })
    }

    /// Create a zeroed profile for `user_id` unless one exists, returning the
    /// stored state.
    pub fn ensure_profile(&self, user_id: &str) -> Result<StreakState, StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO profiles (id, created_at) VALUES (?1, ?2)",
            params![user_id, timestamp(Utc::now())],
        )?;
        ProfileStore::get(self, user_id)?.ok_or_else(|| StoreError::NotFound {
            entity: "profile",
            key: user_id.to_string(),
        })
    }

    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, [task_id], row_to_task)
            .optional()?)
    }

    /// Incomplete tasks due on or before `day`, in creation order.
    ///
    /// This is the candidate set for just-start: overdue streak tasks are
    /// included alongside today's.
    pub fn list_open_tasks_through(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND completed = 0
               AND due_date IS NOT NULL AND due_date <= ?2
             ORDER BY created_at, rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, format_day(day)], row_to_task)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Append a feedback record and return its row id.
    pub fn record_transit_feedback(&self, feedback: &TransitFeedback) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO transit_feedback
                (user_id, log_date, transit_point, natal_point, aspect, resonance, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                feedback.user_id,
                format_day(feedback.log_date),
                feedback.transit_point,
                feedback.natal_point,
                feedback.aspect.name(),
                feedback.resonance.as_str(),
                timestamp(Utc::now()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_transit_feedback(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<TransitFeedback>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, log_date, transit_point, natal_point, aspect, resonance
             FROM transit_feedback
             WHERE user_id = ?1 AND log_date = ?2
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id, format_day(day)], |row| {
            Ok(TransitFeedback {
                user_id: row.get(0)?,
                log_date: parse_day(1, row.get(1)?)?,
                transit_point: row.get(2)?,
                natal_point: row.get(3)?,
                aspect: parse_text(4, row.get(4)?)?,
                resonance: parse_text::<Resonance>(5, row.get(5)?)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn read_log(
        conn: &Connection,
        user_id: &str,
        day: NaiveDate,
    ) -> rusqlite::Result<Option<DailyLog>> {
        let sql =
            format!("SELECT {LOG_COLUMNS} FROM daily_logs WHERE user_id = ?1 AND log_date = ?2");
        conn.query_row(&sql, params![user_id, format_day(day)], row_to_log)
            .optional()
    }

    fn read_profile(conn: &Connection, user_id: &str) -> rusqlite::Result<Option<StreakState>> {
        conn.query_row(
            "SELECT streak_count, longest_streak, streak_freezes FROM profiles WHERE id = ?1",
            [user_id],
            |row| {
                Ok(StreakState {
                    streak_count: row.get(0)?,
                    longest_streak: row.get(1)?,
                    streak_freezes: row.get(2)?,
                })
            },
        )
        .optional()
    }

    fn insert_empty_log(conn: &Connection, user_id: &str, day: NaiveDate) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO daily_logs (id, user_id, log_date, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, log_date) DO NOTHING",
            params![
                Uuid::new_v4().to_string(),
                user_id,
                format_day(day),
                timestamp(Utc::now()),
            ],
        )?;
        Ok(())
    }
}

impl TaskStore for Database {
    fn list_tasks_filtered(
        &self,
        user_id: &str,
        day: NaiveDate,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, StoreError> {
        let mut sql =
            format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 AND due_date = ?2");
        let mut values = vec![
            Value::Text(user_id.to_string()),
            Value::Text(format_day(day)),
        ];

        if let Some(task_type) = filter.task_type {
            values.push(Value::Text(task_type.as_str().to_string()));
            sql.push_str(&format!(" AND task_type = ?{}", values.len()));
        }
        if let Some(owner) = filter.owner {
            values.push(Value::Text(owner.as_str().to_string()));
            sql.push_str(&format!(" AND owner = ?{}", values.len()));
        }
        if let Some(streak_required) = filter.streak_required {
            values.push(Value::Integer(i64::from(streak_required)));
            sql.push_str(&format!(" AND streak_required = ?{}", values.len()));
        }
        if let Some(completed) = filter.completed {
            values.push(Value::Integer(i64::from(completed)));
            sql.push_str(&format!(" AND completed = ?{}", values.len()));
        }
        sql.push_str(" ORDER BY created_at, rowid");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_task)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn update_completion(&self, task_id: &str, completed: bool) -> Result<Task, StoreError> {
        let completed_at = completed.then(|| timestamp(Utc::now()));
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = ?1, completed_at = ?2 WHERE id = ?3",
            params![completed, completed_at, task_id],
        )?;
        let not_found = || StoreError::NotFound {
            entity: "task",
            key: task_id.to_string(),
        };
        if changed == 0 {
            return Err(not_found());
        }
        self.get_task(task_id)?.ok_or_else(not_found)
    }

    fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params![
                task.id,
                task.user_id,
                task.title,
                task.notes,
                task.area,
                task.task_type.as_str(),
                task.is_grouped_task,
                task.owner.as_str(),
                task.cognitive_cost,
                task.streak_required,
                task.due_date.map(format_day),
                task.completed,
                task.completed_at.map(timestamp),
                timestamp(task.created_at),
            ],
        )?;
        Ok(())
    }
}

impl DailyLogStore for Database {
    fn get(&self, user_id: &str, day: NaiveDate) -> Result<Option<DailyLog>, StoreError> {
        Ok(Self::read_log(&self.conn, user_id, day)?)
    }

    fn upsert(
        &self,
        user_id: &str,
        day: NaiveDate,
        patch: &DailyLogPatch,
    ) -> Result<DailyLog, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        Self::insert_empty_log(&tx, user_id, day)?;

        let mut log = Self::read_log(&tx, user_id, day)?.ok_or_else(|| StoreError::NotFound {
            entity: "daily_log",
            key: format!("{user_id}/{day}"),
        })?;
        log.apply(patch);

        let gratitudes = serde_json::to_string(&log.morning_gratitudes)
            .map_err(|e| StoreError::unavailable("upsert_daily_log", e.to_string()))?;
        tx.execute(
            "UPDATE daily_logs SET
                morning_energy = ?1, morning_gratitudes = ?2, morning_at = ?3,
                evening_mood = ?4, evening_at = ?5, reflection_wins = ?6,
                reflection_challenges = ?7, reflection_tomorrow = ?8,
                journal_entry = ?9, is_gentle_mode = ?10
             WHERE id = ?11",
            params![
                log.morning_energy,
                gratitudes,
                log.morning_at.map(timestamp),
                log.evening_mood,
                log.evening_at.map(timestamp),
                log.reflection_wins,
                log.reflection_challenges,
                log.reflection_tomorrow,
                log.journal_entry,
                log.is_gentle_mode,
                log.id,
            ],
        )?;
        tx.commit()?;
        Ok(log)
    }
}

impl ProfileStore for Database {
    fn get(&self, user_id: &str) -> Result<Option<StreakState>, StoreError> {
        Ok(Self::read_profile(&self.conn, user_id)?)
    }

    fn update(&self, user_id: &str, patch: &ProfilePatch) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE profiles SET
                streak_count = COALESCE(?1, streak_count),
                longest_streak = COALESCE(?2, longest_streak),
                streak_freezes = COALESCE(?3, streak_freezes)
             WHERE id = ?4",
            params![
                patch.streak_count,
                patch.longest_streak,
                patch.streak_freezes,
                user_id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "profile",
                key: user_id.to_string(),
            });
        }
        Ok(())
    }
}

impl StreakStore for Database {
    fn commit_resolution(
        &self,
        user_id: &str,
        day: NaiveDate,
        met: bool,
    ) -> Result<Option<StreakCommit>, StoreError> {
        // Dropping `tx` on any early return rolls everything back.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        Self::insert_empty_log(&tx, user_id, day)?;
        let changed = tx.execute(
            "UPDATE daily_logs SET streak_met = ?1
             WHERE user_id = ?2 AND log_date = ?3 AND streak_met IS NULL",
            params![met, user_id, format_day(day)],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        let before = Self::read_profile(&tx, user_id)?.ok_or_else(|| StoreError::NotFound {
            entity: "profile",
            key: user_id.to_string(),
        })?;
        let commit = StreakCommit::settle(before, met);
        tx.execute(
            "UPDATE profiles SET streak_count = ?1, longest_streak = ?2, streak_freezes = ?3
             WHERE id = ?4",
            params![
                commit.after.streak_count,
                commit.after.longest_streak,
                commit.after.streak_freezes,
                user_id
            ],
        )?;
        tx.commit()?;
        Ok(Some(commit))
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_optional_timestamp(
    idx: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_timestamp(idx, s)).transpose()
}

fn parse_day(idx: usize, raw: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

fn parse_text<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>().map_err(|e| conversion_error(idx, e))
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        notes: row.get(3)?,
        area: row.get(4)?,
        task_type: parse_text(5, row.get(5)?)?,
        is_grouped_task: row.get(6)?,
        owner: parse_text(7, row.get(7)?)?,
        cognitive_cost: row.get(8)?,
        streak_required: row.get(9)?,
        due_date: row
            .get::<_, Option<String>>(10)?
            .map(|s| parse_day(10, s))
            .transpose()?,
        completed: row.get(11)?,
        completed_at: parse_optional_timestamp(12, row.get(12)?)?,
        created_at: parse_timestamp(13, row.get(13)?)?,
    })
}

fn row_to_log(row: &Row<'_>) -> rusqlite::Result<DailyLog> {
    let gratitudes: String = row.get(4)?;
    Ok(DailyLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        log_date: parse_day(2, row.get(2)?)?,
        morning_energy: row.get(3)?,
        morning_gratitudes: serde_json::from_str(&gratitudes).map_err(|e| conversion_error(4, e))?,
        morning_at: parse_optional_timestamp(5, row.get(5)?)?,
        evening_mood: row.get(6)?,
        evening_at: parse_optional_timestamp(7, row.get(7)?)?,
        reflection_wins: row.get(8)?,
        reflection_challenges: row.get(9)?,
        reflection_tomorrow: row.get(10)?,
        journal_entry: row.get(11)?,
        streak_met: row.get(12)?,
        is_gentle_mode: row.get(13)?,
        created_at: parse_timestamp(14, row.get(14)?)?,
    })
}
