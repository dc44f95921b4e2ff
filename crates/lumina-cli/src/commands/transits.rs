//! Cosmic weather and transit feedback commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use lumina_core::astrology::{
    cosmic_weather, default_natal_chart, AspectKind, InterpretationTable, JsonEphemeris,
    Resonance, TransitFeedback,
};

use super::{parse_day, today, Session};

#[derive(Subcommand)]
pub enum TransitsAction {
    /// Today's transiting moon and strongest aspects to the natal chart
    Show {
        /// Day, YYYY-MM-DD (default: today)
        #[arg(long, value_parser = parse_day)]
        day: Option<NaiveDate>,
        /// Number of aspects to show (default: astrology.max_aspects)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Record whether a transit resonated
    Feedback {
        /// Transiting point, e.g. "moon"
        transit: String,
        /// Aspect name, e.g. "trine"
        aspect: AspectKind,
        /// Natal point, e.g. "sun"
        natal: String,
        /// positive, negative or neutral
        resonance: Resonance,
        /// Day, YYYY-MM-DD (default: today)
        #[arg(long, value_parser = parse_day)]
        day: Option<NaiveDate>,
    },
}

pub fn run(action: TransitsAction) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let astrology = &session.config.astrology;

    match action {
        TransitsAction::Show { day, limit } => {
            let day = day.unwrap_or_else(today);
            let Some(ephemeris_path) = &astrology.ephemeris_path else {
                println!("Cosmic weather unavailable: set astrology.ephemeris_path");
                return Ok(());
            };
            let ephemeris = JsonEphemeris::from_path(ephemeris_path)?;
            let table = match &astrology.interpretations_path {
                Some(path) => InterpretationTable::from_path(path)?,
                None => InterpretationTable::new(),
            };

            let limit = limit.unwrap_or(astrology.max_aspects);
            let Some(weather) = cosmic_weather(&ephemeris, &default_natal_chart(), day, limit)
            else {
                println!("Cosmic weather unavailable for {day}");
                return Ok(());
            };

            let aspects: Vec<_> = weather
                .aspects
                .iter()
                .map(|aspect| {
                    let interpretation = table.lookup(
                        &aspect.transit_point,
                        aspect.kind.name(),
                        &aspect.natal_point,
                    );
                    serde_json::json!({
                        "aspect": aspect,
                        "label": format!(
                            "{} {} {}",
                            aspect.transit_symbol,
                            aspect.kind.symbol(),
                            aspect.natal_symbol
                        ),
                        "interpretation": interpretation,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "day": weather.day,
                "moon": weather.moon,
                "quiet": weather.is_quiet(),
                "aspects": aspects,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        TransitsAction::Feedback {
            transit,
            aspect,
            natal,
            resonance,
            day,
        } => {
            let feedback = TransitFeedback {
                user_id: session.user_id().to_string(),
                log_date: day.unwrap_or_else(today),
                transit_point: transit.to_lowercase(),
                natal_point: natal.to_lowercase(),
                aspect,
                resonance,
            };
            let id = session.db.record_transit_feedback(&feedback)?;
            println!("Feedback recorded: {id}");
        }
    }
    Ok(())
}
