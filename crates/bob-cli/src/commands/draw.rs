use std::path::Path;

use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::FileConfig;

pub fn run(config: Option<&Path>, seed: Option<u64>) -> Result<(), String> {
    let game = FileConfig::load_or_default(config)?.game_config(seed);
    game.catalog.validate().map_err(|e| format!("cannot draw: {e}"))?;

    let mut rng = match game.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let draw = game.catalog.draw(&mut rng);
    println!("  {} {}", "Emotion:".bold(), draw.emotion);
    println!("  {} {}", "Prompt:".bold(), draw.prompt);
    Ok(())
}
