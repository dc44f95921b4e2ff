//! Daily check-in commands for CLI.

use chrono::{Local, Timelike, Utc};
use clap::Subcommand;
use lumina_core::checkin::{
    journal_patch, pending_checkin, EveningCheckin, MorningCheckin, Reflection,
};
use lumina_core::{DailyLogPatch, DailyLogStore};

use super::{today, Session};

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Morning check-in: energy and up to three gratitudes
    Morning {
        /// Energy, 1-5
        energy: u8,
        /// Something you are grateful for (repeatable)
        #[arg(long = "gratitude", short = 'g')]
        gratitudes: Vec<String>,
    },
    /// Evening check-in: mood
    Evening {
        /// Mood, 1-5
        mood: u8,
    },
    /// Evening reflection and journal
    Reflect {
        #[arg(long)]
        wins: Option<String>,
        #[arg(long)]
        challenges: Option<String>,
        #[arg(long)]
        tomorrow: Option<String>,
        #[arg(long)]
        journal: Option<String>,
    },
    /// Toggle gentle mode for today (streak only needs foundation tasks)
    Gentle {
        /// Turn gentle mode off instead
        #[arg(long)]
        off: bool,
    },
    /// Today's log and which check-in is due
    Status,
}

pub fn run(action: CheckinAction) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let db = &session.db;
    let user_id = session.user_id();
    let day = today();

    let patch = match action {
        CheckinAction::Morning { energy, gratitudes } => {
            MorningCheckin::new(energy, gratitudes.as_slice())?.into_patch(Utc::now())
        }
        CheckinAction::Evening { mood } => EveningCheckin::new(mood)?.into_patch(Utc::now()),
        CheckinAction::Reflect {
            wins,
            challenges,
            tomorrow,
            journal,
        } => {
            // The reflection form is submitted as a whole; journal-only calls
            // leave it untouched.
            let answered = wins.is_some() || challenges.is_some() || tomorrow.is_some();
            let mut patch = if answered {
                Reflection::new(wins.as_deref(), challenges.as_deref(), tomorrow.as_deref())
                    .into_patch()
            } else {
                DailyLogPatch::default()
            };
            if let Some(entry) = journal {
                patch.journal_entry = journal_patch(&entry).journal_entry;
            }
            if patch.is_empty() {
                return Err(
                    "nothing to record: pass --wins, --challenges, --tomorrow or --journal".into(),
                );
            }
            patch
        }
        CheckinAction::Gentle { off } => DailyLogPatch::gentle_mode(!off),
        CheckinAction::Status => {
            let log = DailyLogStore::get(db, user_id, day)?;
            let output = serde_json::json!({
                "day": day,
                "pending": pending_checkin(log.as_ref(), Local::now().hour()),
                "log": log,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }
    };

    let log = db.upsert(user_id, day, &patch)?;
    println!("{}", serde_json::to_string_pretty(&log)?);
    Ok(())
}
