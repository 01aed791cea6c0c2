use std::io;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use potion_tracker::config::TrackerConfig;
use potion_tracker::logging::init_logging;
use potion_tracker::{FileTracker, open_file_tracker, presenter, repl};

/// Tracks what a Love Potion opponent plays and how likely each card is.
#[derive(Debug, Parser)]
#[command(
    name = "potion-tracker",
    author,
    version,
    about = "Opponent tracker for the Love Potion card game"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the statistics file location.
    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Track a game interactively (default).
    Play,
    /// Print the recorded statistics.
    Stats {
        /// Only show the table for this opponent energy.
        #[arg(long, value_name = "N")]
        energy: Option<u32>,
    },
    /// Erase all recorded statistics.
    ClearStats {
        /// Required; there is no undo.
        #[arg(long)]
        yes: bool,
    },
    /// Check the configuration and exit.
    ValidateConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_ref() {
        Some(path) => TrackerConfig::from_path(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(store) = cli.store {
        config.storage.path = store;
    }
    config.validate()?;

    let _logging_guard = init_logging(&config.logging)?;

    match cli.command.unwrap_or(Command::Play) {
        Command::ValidateConfig => {
            println!(
                "Configuration OK: statistics at {} (namespace '{}'), starting HP {}, starting energy {}",
                config.storage.path.display(),
                config.storage.namespace,
                config.session.starting_hp,
                config.session.starting_energy
            );
        }
        Command::Play => {
            let mut tracker = open(&config)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            repl::run(&mut tracker, stdin.lock(), stdout.lock())
                .context("interactive session failed")?;
        }
        Command::Stats { energy } => {
            let tracker = open(&config)?;
            for warning in
                presenter::load_warnings(tracker.load_anomalies(), tracker.total_repair())
            {
                eprintln!("{warning}");
            }
            let stats = tracker.stats();
            match energy {
                Some(energy) => println!("{}", presenter::conditional_table(stats, energy)),
                None => {
                    println!("{}", presenter::global_table(stats));
                    for energy in stats.observed_energies() {
                        println!("{}", presenter::conditional_table(stats, energy));
                    }
                }
            }
        }
        Command::ClearStats { yes } => {
            if !yes {
                bail!("refusing to erase statistics without --yes");
            }
            let mut tracker = open(&config)?;
            tracker
                .clear_stats()
                .with_context(|| format!("saving {}", config.storage.path.display()))?;
            println!("Statistics cleared.");
        }
    }

    Ok(())
}

fn open(config: &TrackerConfig) -> anyhow::Result<FileTracker> {
    let tracker = open_file_tracker(config)
        .with_context(|| format!("opening statistics at {}", config.storage.path.display()))?;
    if let Some(backup) = tracker.gateway().store().recovered_from() {
        eprintln!(
            "Warning: {} was unreadable; it was moved to {} and statistics start empty",
            config.storage.path.display(),
            backup.display()
        );
    }
    Ok(tracker)
}
