//! Database schema migrations for lumina.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: profiles, tasks and daily logs.
///
/// `daily_logs` carries the (user_id, log_date) uniqueness key that upserts
/// and the conditional streak write rely on. `streak_met` is NULL until the
/// day is resolved.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS profiles (
            id              TEXT PRIMARY KEY,
            streak_count    INTEGER NOT NULL DEFAULT 0,
            longest_streak  INTEGER NOT NULL DEFAULT 0,
            streak_freezes  INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL,
            title           TEXT NOT NULL,
            notes           TEXT,
            area            TEXT,
            task_type       TEXT NOT NULL DEFAULT 'standard',
            is_grouped_task INTEGER NOT NULL DEFAULT 0,
            owner           TEXT NOT NULL DEFAULT 'primary',
            cognitive_cost  REAL NOT NULL DEFAULT 1.0,
            streak_required INTEGER NOT NULL DEFAULT 0,
            due_date        TEXT,
            completed       INTEGER NOT NULL DEFAULT 0,
            completed_at    TEXT,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS daily_logs (
            id                    TEXT PRIMARY KEY,
            user_id               TEXT NOT NULL,
            log_date              TEXT NOT NULL,
            morning_energy        INTEGER,
            morning_gratitudes    TEXT NOT NULL DEFAULT '[]',
            morning_at            TEXT,
            evening_mood          INTEGER,
            evening_at            TEXT,
            reflection_wins       TEXT,
            reflection_challenges TEXT,
            reflection_tomorrow   TEXT,
            journal_entry         TEXT,
            streak_met            INTEGER,
            is_gentle_mode        INTEGER NOT NULL DEFAULT 0,
            created_at            TEXT NOT NULL,
            UNIQUE (user_id, log_date)
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_user_due ON tasks(user_id, due_date);
        CREATE INDEX IF NOT EXISTS idx_tasks_user_completed ON tasks(user_id, completed);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    Ok(())
}

/// Migration v2: transit feedback.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS transit_feedback (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       TEXT NOT NULL,
            log_date      TEXT NOT NULL,
            transit_point TEXT NOT NULL,
            natal_point   TEXT NOT NULL,
            aspect        TEXT NOT NULL,
            resonance     TEXT NOT NULL,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transit_feedback_user_date
            ON transit_feedback(user_id, log_date);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    Ok(())
}
