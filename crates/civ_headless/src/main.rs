//! Headless hex strategy game runner.
//!
//! Runs games without a presentation layer. Designed for CI testing,
//! balance batches and determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Play 100 autoplayed turns and print a JSON summary
//! cargo run -p civ_headless -- run --seed 7 --turns 100
//!
//! # Same, with settings from a RON file and output to a file
//! cargo run -p civ_headless -- run --settings game.ron --output results/run.json
//!
//! # Print a generated map
//! cargo run -p civ_headless -- map --seed 7 --size large
//!
//! # Run a batch of seeds in parallel
//! cargo run -p civ_headless -- batch --count 200 --turns 150 --output results/batch.json
//!
//! # Verify determinism
//! cargo run -p civ_headless -- verify --seed 7 --turns 200
//! ```
//!
//! Logs go to stderr and honor `RUST_LOG`; stdout carries JSON and maps.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use civ_core::map_generation::{MapConfig, MapSize};
use civ_core::settings::GameSettings;
use civ_headless::{
    ascii::{render_map, render_state, AsciiConfig},
    batch::{run_batch, BatchConfig},
    runner::{run_game, verify_seed, RunConfig, RunnerError},
};

#[derive(Parser)]
#[command(name = "civ_headless")]
#[command(about = "Headless hex strategy game runner for autoplay, batches and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Map size as a CLI value.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SizeArg {
    Small,
    Medium,
    Large,
}

impl From<SizeArg> for MapSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Small => Self::Small,
            SizeArg::Medium => Self::Medium,
            SizeArg::Large => Self::Large,
        }
    }
}

/// Options shared by every subcommand that starts a game.
#[derive(clap::Args)]
struct GameArgs {
    /// RON settings file; the flags below override it
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Map size
    #[arg(long, value_enum)]
    size: Option<SizeArg>,

    /// Player count, human included
    #[arg(long)]
    players: Option<u32>,

    /// Turns to play
    #[arg(short, long, default_value = "100")]
    turns: u32,
}

impl GameArgs {
    fn game_settings(&self) -> Result<GameSettings, RunnerError> {
        let mut settings = match &self.settings {
            Some(path) => GameSettings::load(path)?,
            None => GameSettings::default(),
        };
        if let Some(seed) = self.seed {
            settings = settings.with_seed(seed);
        }
        if let Some(size) = self.size {
            settings = settings.with_map_size(size.into());
        }
        if let Some(players) = self.players {
            settings = settings.with_player_count(players);
        }
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game with the human on autoplay
    Run {
        #[command(flatten)]
        game: GameArgs,

        /// Write the JSON summary here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Let the human seat idle instead of autoplaying
        #[arg(long)]
        no_autoplay: bool,

        /// Print the final map to stderr
        #[arg(long)]
        show_map: bool,
    },

    /// Print an ASCII rendering of a generated map
    Map {
        /// Random seed
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Map size
        #[arg(long, value_enum, default_value = "small")]
        size: SizeArg,

        /// Hide river markers
        #[arg(long)]
        no_rivers: bool,

        /// Hide hill markers
        #[arg(long)]
        no_hills: bool,

        /// Use colored output
        #[arg(long)]
        color: bool,
    },

    /// Run a batch of seeds in parallel
    Batch {
        #[command(flatten)]
        game: GameArgs,

        /// RON batch config; other batch flags are ignored when set
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output file for results
        #[arg(short, long, default_value = "results/batch.json")]
        output: PathBuf,
    },

    /// Verify determinism by running the same seed twice
    Verify {
        #[command(flatten)]
        game: GameArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for output)
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Run {
            game,
            output,
            no_autoplay,
            show_map,
        } => cmd_run(&game, output, no_autoplay, show_map),
        Commands::Map {
            seed,
            size,
            no_rivers,
            no_hills,
            color,
        } => {
            cmd_map(seed, size, no_rivers, no_hills, color);
            Ok(())
        }
        Commands::Batch {
            game,
            config,
            count,
            parallel,
            output,
        } => cmd_batch(&game, config, count, parallel, output),
        Commands::Verify { game } => cmd_verify(&game),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("FAIL: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Play one game and emit its summary
fn cmd_run(
    game: &GameArgs,
    output: Option<PathBuf>,
    no_autoplay: bool,
    show_map: bool,
) -> Result<(), RunnerError> {
    let config = RunConfig::new(game.game_settings()?)
        .with_turns(game.turns)
        .with_autoplay(!no_autoplay);

    tracing::info!(
        seed = config.settings.seed,
        turns = config.turns,
        "Starting game"
    );

    let (state, summary) = run_game(&config)?;

    if show_map {
        eprint!("{}", render_state(&state, &AsciiConfig::default()));
    }

    match output {
        Some(path) => {
            summary.save(&path)?;
            eprintln!("Summary written to {}", path.display());
        }
        None => println!("{}", summary.to_json()?),
    }
    Ok(())
}

/// Print a generated map
fn cmd_map(seed: u64, size: SizeArg, no_rivers: bool, no_hills: bool, color: bool) {
    let map = MapConfig::for_size(size.into()).with_seed(seed).generate();
    let config = AsciiConfig {
        show_rivers: !no_rivers,
        show_hills: !no_hills,
        use_color: color,
        ..Default::default()
    };
    print!("{}", render_map(&map, &config));
}

/// Run a batch of seeds
fn cmd_batch(
    game: &GameArgs,
    config: Option<PathBuf>,
    count: u32,
    parallel: u32,
    output: PathBuf,
) -> Result<(), RunnerError> {
    let config = match config {
        Some(path) => BatchConfig::load(&path)?,
        None => {
            let settings = game.game_settings()?;
            BatchConfig::new(count, game.turns)
                .with_seed(settings.seed)
                .with_settings(settings)
                .with_parallel(parallel)
                .with_output(output)
        }
    };

    let results = run_batch(config);
    results.save(&results.config.output)?;

    let s = &results.summary;
    eprintln!("Batch complete: {} games, {} errors", s.total_games, results.errors.len());
    eprintln!("  Human cities (avg): {:.2}", s.avg_human_cities);
    eprintln!("  AI cities (avg):    {:.2}", s.avg_ai_cities);
    eprintln!("  Human techs (avg):  {:.2}", s.avg_human_techs);
    eprintln!("  AI techs (avg):     {:.2}", s.avg_ai_techs);
    eprintln!("  Human eliminated:   {}", s.human_eliminated);
    eprintln!("Results written to {}", results.config.output.display());
    Ok(())
}

/// Verify determinism for one seed
fn cmd_verify(game: &GameArgs) -> Result<(), RunnerError> {
    let config = RunConfig::new(game.game_settings()?).with_turns(game.turns);

    tracing::info!(
        "Verifying determinism: seed {} ({} turns)",
        config.settings.seed,
        config.turns
    );

    let hash = verify_seed(&config)?;
    eprintln!("PASS: both runs ended with hash {hash:016x}");
    Ok(())
}
