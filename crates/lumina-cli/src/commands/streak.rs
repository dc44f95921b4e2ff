use chrono::{Local, NaiveDate};
use clap::Subcommand;
use lumina_core::streak::{Milestone, Resolution, StreakLedger};

use super::{parse_day, Session};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Current streak, longest streak and banked freezes
    Status,
    /// Resolve the previous logical day (or a given day)
    Resolve {
        /// Day to resolve, YYYY-MM-DD
        #[arg(long, value_parser = parse_day)]
        day: Option<NaiveDate>,
    },
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let db = &session.db;
    let user_id = session.user_id();

    db.ensure_profile(user_id)?;
    let ledger = StreakLedger::new(db, db);

    match action {
        StreakAction::Status => {
            // Bring yesterday up to date before reporting.
            let resolution = ledger.process_end_of_day(user_id, &Local::now())?;
            let state = db.ensure_profile(user_id)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
            announce_milestone(&resolution, user_id);
        }
        StreakAction::Resolve { day } => {
            let resolution = match day {
                Some(day) => ledger.resolve_day(user_id, day)?,
                None => ledger.process_end_of_day(user_id, &Local::now())?,
            };
            println!("{}", serde_json::to_string_pretty(&resolution)?);
            announce_milestone(&resolution, user_id);
        }
    }
    Ok(())
}

fn announce_milestone(resolution: &Resolution, user_id: &str) {
    if let Some(milestone) = resolution.resolved().and_then(|r| r.milestone()) {
        announce(&milestone, user_id);
    }
}

fn announce(milestone: &Milestone, user_id: &str) {
    println!();
    println!("{}", milestone.title);
    println!("{}", milestone.message);
    tracing::debug!(key = %milestone.seen_key(user_id), "milestone reached");
}
