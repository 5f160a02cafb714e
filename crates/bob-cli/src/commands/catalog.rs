use std::path::Path;

use comfy_table::{ContentArrangement, Table};

use crate::config::FileConfig;

pub fn run(config: Option<&Path>, list: Option<&str>) -> Result<(), String> {
    let catalog = FileConfig::load_or_default(config)?.catalog.unwrap_or_default();
    let (title, entries) = match list.unwrap_or("puppets").to_lowercase().as_str() {
        "puppets" | "puppet" => ("Puppet", catalog.puppets()),
        "emotions" | "emotion" => ("Emotion", catalog.emotions()),
        "prompts" | "prompt" => ("Prompt", catalog.prompts()),
        other => {
            return Err(format!(
                "unknown list: \"{other}\". Use: puppets, emotions, prompts"
            ));
        }
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", title]);
    for (i, entry) in entries.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), entry.clone()]);
    }

    println!("{table}");
    println!();
    println!("  {} entries", entries.len());
    Ok(())
}
