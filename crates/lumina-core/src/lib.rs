//! # Lumina Core Library
//!
//! Core logic for the Lumina habit tracker. All behaviour lives here; the
//! `lumina-cli` binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Calendar**: logical days that roll over at 04:00 local time
//! - **Stores**: narrow task, daily log and profile contracts with an
//!   in-memory and a SQLite implementation
//! - **Streak ledger**: once-per-day resolution with a freeze economy
//! - **Just-start**: picks the single next task to work on
//! - **Astrology**: transit-to-natal aspects and their interpretations
//!
//! ## Key Components
//!
//! - [`StreakLedger`]: end-of-day streak resolution
//! - [`select_just_start`]: tiered next-task selection
//! - [`find_aspects`]: aspect matching, ranked by exactness
//! - [`Database`]: SQLite persistence
//! - [`Config`]: application configuration management

pub mod astrology;
pub mod calendar;
pub mod checkin;
pub mod daily_log;
pub mod error;
pub mod profile;
pub mod selection;
pub mod storage;
pub mod store;
pub mod streak;
pub mod task;

pub use astrology::{
    cosmic_weather, default_natal_chart, find_aspects, Aspect, AspectKind, CelestialPosition,
    Chart, CosmicWeather, InterpretationTable, JsonEphemeris, TransitFeedback,
};
pub use calendar::{logical_day, previous_logical_day};
pub use daily_log::{DailyLog, DailyLogPatch};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use profile::{ProfilePatch, StreakState};
pub use selection::{select_just_start, select_with_tier, SelectionTier};
pub use storage::{Config, Database};
pub use store::{DailyLogStore, MemoryStore, ProfileStore, StreakStore, TaskStore};
pub use streak::{Resolution, StreakLedger};
pub use task::{NewTask, Task, TaskFilter, TaskOwner, TaskType};
