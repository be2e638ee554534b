use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use gtp::GtpCommand;
use gtp_arena::config::{ArenaConfig, EngineConfig, MatchConfig};
use gtp_arena::gtp_client::GtpClient;
use gtp_arena::match_runner::MatchRunner;
use gtp_arena::opening::{OpeningBook, OpeningError};
use gtp_arena::report::Reporter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

/// Exit code when the opening book has no openings.
const EXIT_EMPTY_BOOK: u8 = 2;

#[derive(Parser)]
#[command(name = "gtp-arena")]
#[command(about = "Head-to-head matches between GTP engines")]
struct Cli {
    /// Configuration file (default: arena.toml, if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a match between two engines
    Match {
        /// Primary engine name (or executable path)
        primary: String,
        /// Opponent engine name (or executable path)
        opponent: String,
        #[command(flatten)]
        overrides: MatchOverrides,
        /// Write the final statistics as JSON to this file
        #[arg(long)]
        summary: Option<PathBuf>,
    },
}

/// Command-line overrides for the `[match]` table.
#[derive(Args, Debug, Default)]
struct MatchOverrides {
    /// Number of games to play
    #[arg(short, long)]
    games: Option<u32>,
    /// Report every N games
    #[arg(short, long)]
    report_every: Option<u32>,
    /// Seed for opening selection
    #[arg(short, long)]
    seed: Option<u64>,
    /// Opening book file
    #[arg(short, long)]
    openings: Option<PathBuf>,
    /// Report log file
    #[arg(short, long)]
    log: Option<PathBuf>,
}

impl MatchOverrides {
    fn apply(self, base: MatchConfig) -> MatchConfig {
        MatchConfig {
            games: self.games.unwrap_or(base.games),
            report_every: self.report_every.unwrap_or(base.report_every).max(1),
            openings: self.openings.unwrap_or(base.openings),
            log: self.log.unwrap_or(base.log),
            seed: self.seed.or(base.seed),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => ArenaConfig::load_from(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ArenaConfig::load()?,
    };

    match cli.command {
        Commands::Match {
            primary,
            opponent,
            overrides,
            summary,
        } => {
            let settings = overrides.apply(config.match_config.clone());
            run_match(&config, &primary, &opponent, &settings, summary)
        }
    }
}

fn run_match(
    config: &ArenaConfig,
    primary: &str,
    opponent: &str,
    settings: &MatchConfig,
    summary: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let book = match OpeningBook::load(&settings.openings) {
        Ok(book) => book,
        Err(OpeningError::Empty(path)) => {
            eprintln!("Opening file {} is empty", path.display());
            return Ok(ExitCode::from(EXIT_EMPTY_BOOK));
        }
        Err(e) => return Err(e).context("Failed to load openings"),
    };

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut primary_client = spawn_engine(primary, &config.resolve_engine(primary))?;
    let mut opponent_client = spawn_engine(opponent, &config.resolve_engine(opponent))?;

    let mut reporter = Reporter::create(&settings.log, primary, opponent, settings.report_every)
        .with_context(|| format!("Failed to create {}", settings.log.display()))?;

    let runner = MatchRunner::new(settings.games);
    tracing::info!(
        "Running {} games: {} vs {} (openings: {})",
        runner.games(),
        primary,
        opponent,
        book.len()
    );

    let outcome = runner.run(
        &mut primary_client,
        &mut opponent_client,
        &book,
        &mut rng,
        &mut reporter,
    );

    primary_client.quit();
    opponent_client.quit();

    let stats = outcome?;
    tracing::info!(
        "Match finished: {}W {}L {}D, average diff {:.3}",
        stats.wins,
        stats.losses,
        stats.draws,
        stats.average_diff()
    );

    if let Some(path) = summary {
        let json = serde_json::to_string_pretty(&stats)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }

    Ok(ExitCode::SUCCESS)
}

fn spawn_engine(name: &str, engine: &EngineConfig) -> anyhow::Result<GtpClient> {
    let client = GtpClient::spawn(name, engine.to_command())
        .with_context(|| format!("Failed to start {} ({})", name, engine.command.display()))?;
    Ok(client.with_result_command(GtpCommand::result_query(&engine.result_command)))
}
