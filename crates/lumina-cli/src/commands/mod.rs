pub mod checkin;
pub mod config;
pub mod just_start;
pub mod streak;
pub mod task;
pub mod transits;

use chrono::{Local, NaiveDate};
use lumina_core::calendar::{logical_day, parse_logical_day};
use lumina_core::{Config, Database, ValidationError};

/// Loaded configuration and the database it points at.
pub struct Session {
    pub config: Config,
    pub db: Database,
}

impl Session {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let db = Database::open(&config)?;
        Ok(Self { config, db })
    }

    pub fn user_id(&self) -> &str {
        &self.config.user.id
    }
}

/// Logical day for "now" in local time.
pub fn today() -> NaiveDate {
    logical_day(&Local::now())
}

/// Clap value parser for `YYYY-MM-DD` arguments.
pub fn parse_day(value: &str) -> Result<NaiveDate, ValidationError> {
    parse_logical_day(value)
}
