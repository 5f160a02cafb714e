//! Configuration for a game session.

use std::sync::Arc;

use crate::catalog::Catalog;

/// Settings a [`GameSession`](crate::GameSession) is created from.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    /// RNG seed for reproducible card draws. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Card and puppet lists, shared between sessions.
    pub catalog: Arc<Catalog>,
}

impl GameConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a custom catalog.
    pub fn with_catalog(mut self, catalog: impl Into<Arc<Catalog>>) -> Self {
        self.catalog = catalog.into();
        self
    }
}
