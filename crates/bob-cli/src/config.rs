//! Optional TOML configuration file.

use std::path::Path;

use serde::Deserialize;

use bob_core::{Catalog, GameConfig};
use bob_sync::SheetConfig;

/// Contents of a `bob.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// RNG seed for card draws.
    pub seed: Option<u64>,
    /// Remote sheet to mirror finished rounds to.
    pub remote: Option<SheetConfig>,
    /// Replacement puppet, emotion, and prompt lists.
    pub catalog: Option<Catalog>,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Self::parse(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
    }

    /// Load `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, String> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Parse config text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Game settings, with `seed` taking precedence over the file.
    pub fn game_config(&self, seed: Option<u64>) -> GameConfig {
        let mut config = GameConfig::default();
        if let Some(seed) = seed.or(self.seed) {
            config = config.with_seed(seed);
        }
        if let Some(catalog) = &self.catalog {
            config = config.with_catalog(catalog.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file() {
        let cfg = FileConfig::parse("").unwrap();
        assert!(cfg.seed.is_none());
        assert!(cfg.remote.is_none());
        assert!(cfg.catalog.is_none());
    }

    #[test]
    fn full_file() {
        let cfg = FileConfig::parse(
            r#"
seed = 7

[remote]
endpoint = "https://sheets.example.com/append"
sheet_id = "game-night"
timeout_secs = 3

[catalog]
puppets = ["A", "B", "C", "D", "E", "F", "G", "H"]
emotions = ["Joy"]
prompts = ["A story about a bet."]
"#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(7));
        let remote = cfg.remote.as_ref().unwrap();
        assert_eq!(remote.sheet_id, "game-night");
        assert_eq!(remote.timeout_secs, 3);
        assert_eq!(cfg.catalog.as_ref().unwrap().puppets().len(), 8);
    }

    #[test]
    fn remote_timeout_defaults() {
        let cfg = FileConfig::parse(
            "[remote]\nendpoint = \"http://localhost\"\nsheet_id = \"s\"\n",
        )
        .unwrap();
        assert_eq!(cfg.remote.unwrap().timeout_secs, 10);
    }

    #[test]
    fn flag_seed_wins() {
        let cfg = FileConfig::parse("seed = 7").unwrap();
        assert_eq!(cfg.game_config(Some(9)).seed, Some(9));
        assert_eq!(cfg.game_config(None).seed, Some(7));
    }

    #[test]
    fn no_path_means_defaults() {
        let cfg = FileConfig::load_or_default(None).unwrap();
        assert!(cfg.catalog.is_none());
        assert!(FileConfig::load_or_default(Some(Path::new("missing-bob.toml"))).is_err());
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(FileConfig::parse("colour = \"red\"").is_err());
    }
}
