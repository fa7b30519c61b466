//! Point d'entrée CLI pour campus-pulse

use std::path::PathBuf;

use anyhow::Result;
use chrono::Timelike;
use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use campus_pulse::Config;

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, RunContext};

/// Instantanés carbone du campus, heure par heure
#[derive(Parser)]
#[command(name = "campus-pulse")]
#[command(author, version)]
#[command(about = "Instantanés carbone du campus depuis l'API de prévision (ou une génération synthétique)")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config preset name (default/offline) or path to a JSON config
    #[arg(long, default_value = "default", global = true)]
    config: String,

    /// Never call the API, use synthetic data
    #[arg(long, global = true)]
    offline: bool,

    /// Seed for synthetic data
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Current hour of day (défaut: heure locale)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(0..=23))]
    now_hour: Option<u32>,

    /// Save the run report as JSON
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    // Priorité: fichier/preset < environnement < arguments
    let mut config = Config::resolve(&cli.config)?;
    config.apply_env();
    if cli.offline {
        config.offline = true;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    debug!(?config, "Configuration resolved");

    let now = chrono::Local::now();
    let ctx = RunContext {
        config,
        current_hour: cli.now_hour.unwrap_or_else(|| now.hour()),
        today: now.date_naive(),
        report_path: cli.report,
    };

    match cli.command {
        Commands::Snapshot {
            campus,
            hour,
            forecast,
            output,
        } => {
            info!(campus = %campus.display(), hour, "Building snapshot");
            cli::cmd_snapshot(&ctx, &campus, hour, forecast.as_deref(), output.as_deref()).await?;
        }
        Commands::Forecast { forecast, campus } => {
            info!(current_hour = ctx.current_hour, "Building forecast curve");
            cli::cmd_forecast(&ctx, forecast.as_deref(), campus.as_deref()).await?;
        }
        Commands::History { days, current } => {
            info!(days = ?days, "Loading history");
            cli::cmd_history(&ctx, days, current).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
