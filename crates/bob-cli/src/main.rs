//! CLI game master for Blame It on Bob.

mod commands;
mod config;
mod console;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bob",
    about = "Blame It on Bob: draw cards, tell stories, cast puppets",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a game at the table (interactive)
    Play {
        /// Player names, comma-separated, to start right away
        #[arg(short, long)]
        players: Option<String>,

        /// RNG seed for reproducible card draws
        #[arg(short, long)]
        seed: Option<u64>,

        /// TOML config file (seed, remote sheet, catalog)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Default file for 'download'
        #[arg(short, long, default_value = "game_data.csv")]
        out: PathBuf,
    },

    /// Draw one emotion and one prompt
    Draw {
        /// RNG seed for a reproducible draw
        #[arg(short, long)]
        seed: Option<u64>,

        /// TOML config file whose catalog to draw from
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the puppets, emotions, or prompts
    Catalog {
        /// Which list: puppets, emotions, prompts (default: puppets)
        list: Option<String>,

        /// TOML config file whose catalog to list
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BOB_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            players,
            seed,
            config,
            out,
        } => commands::play::run(config.as_deref(), seed, players.as_deref(), &out),
        Commands::Draw { seed, config } => commands::draw::run(config.as_deref(), seed),
        Commands::Catalog { list, config } => {
            commands::catalog::run(config.as_deref(), list.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
