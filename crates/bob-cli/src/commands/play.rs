use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use tracing::debug;

use bob_core::GameSession;
use bob_sync::{RoundSink, SheetSink, SyncWorker};

use crate::config::FileConfig;
use crate::console::Console;

pub fn run(
    config: Option<&Path>,
    seed: Option<u64>,
    players: Option<&str>,
    out: &Path,
) -> Result<(), String> {
    let file = FileConfig::load_or_default(config)?;
    debug!(
        config = ?config,
        seed = ?seed.or(file.seed),
        remote = file.remote.is_some(),
        "starting play session"
    );

    let session = GameSession::new(file.game_config(seed))
        .map_err(|e| format!("failed to start session: {e}"))?;

    let sync = match file.remote.clone() {
        Some(remote) => {
            let sink = SheetSink::from_env(remote)
                .map_err(|e| format!("failed to set up remote sheet: {e}"))?;
            if !sink.has_credentials() {
                println!(
                    "  {}",
                    "BOB_SHEET_TOKEN is not set; rounds will only be kept locally.".yellow()
                );
            }
            println!("  Mirroring finished rounds to sheet {}", sink.name());
            Some(SyncWorker::spawn(Box::new(sink)))
        }
        None => None,
    };

    let mut console = Console::new(session, sync, out.to_path_buf());

    println!("  {} Blame It on Bob", "Starting".bold());
    println!("  Type 'help' for commands, 'quit' to exit.\n");

    if let Some(players) = players {
        show(console.process(&format!("start {players}")));
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        show(console.process(input));
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
            break;
        }
    }

    if let Some(worker) = console.sync()
        && worker.pending() > 0
    {
        println!(
            "  Waiting for {} rounds to reach {}...",
            worker.pending(),
            worker.sink_name()
        );
    }
    let rounds = console.session().ledger().len();
    if let Some(summary) = console.close() {
        println!("  {summary}");
    }
    println!("  {rounds} rounds played.");
    Ok(())
}

fn show(result: Result<String, crate::console::ConsoleError>) {
    match result {
        Ok(output) => {
            for line in output.lines() {
                if line.starts_with("warning:") {
                    println!("{}", line.yellow());
                } else {
                    println!("{line}");
                }
            }
            if !output.is_empty() {
                println!();
            }
        }
        Err(e) => println!("{}\n", e.to_string().yellow()),
    }
}
