use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lumina-cli", version, about = "Lumina habit tracker CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task capture and completion
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Suggest the one task to start with
    JustStart(commands::just_start::JustStartArgs),
    /// Streak status and end-of-day resolution
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Morning and evening check-ins
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Cosmic weather and transit feedback
    Transits {
        #[command(subcommand)]
        action: commands::transits::TransitsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::JustStart(args) => commands::just_start::run(args),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Checkin { action } => commands::checkin::run(action),
        Commands::Transits { action } => commands::transits::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
