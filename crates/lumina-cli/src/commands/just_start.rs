use chrono::NaiveDate;
use clap::Args;
use lumina_core::select_with_tier;

use super::{parse_day, today, Session};

#[derive(Args)]
pub struct JustStartArgs {
    /// Day to pick for, YYYY-MM-DD (default: today)
    #[arg(long, value_parser = parse_day)]
    day: Option<NaiveDate>,
}

pub fn run(args: JustStartArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let day = args.day.unwrap_or_else(today);
    let open = session.db.list_open_tasks_through(session.user_id(), day)?;

    match select_with_tier(&open, day) {
        Some((task, tier)) => {
            let output = serde_json::json!({
                "reason": tier.description(),
                "tier": tier,
                "task": task,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        None => println!("Nothing left to start. Enjoy the rest of your day."),
    }
    Ok(())
}
