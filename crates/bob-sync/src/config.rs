//! Remote sheet settings.

use std::time::Duration;

use serde::Deserialize;

/// Environment variable holding the sheet credentials.
pub const TOKEN_ENV: &str = "BOB_SHEET_TOKEN";

/// Where and how to append rows remotely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SheetConfig {
    /// URL rows are POSTed to.
    pub endpoint: String,
    /// Identifier of the target sheet.
    pub sheet_id: String,
    /// Upper bound on one append, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl SheetConfig {
    /// Settings with the default timeout.
    pub fn new(endpoint: impl Into<String>, sheet_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            sheet_id: sheet_id.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the timeout, at least one second.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }

    /// The timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout() {
        let cfg = SheetConfig::new("http://localhost/rows", "game-night");
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn timeout_has_a_floor() {
        let cfg = SheetConfig::new("http://localhost/rows", "s").with_timeout_secs(0);
        assert_eq!(cfg.timeout_secs, 1);
    }
}
