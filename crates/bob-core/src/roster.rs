//! The players taking part in a game.

use serde::{Deserialize, Serialize};

use crate::catalog::find_by_name_or_position;
use crate::error::{BobError, BobResult};

/// Fewest players a game can start with.
pub const MIN_PLAYERS: usize = 3;

/// Most players a game can start with.
pub const MAX_PLAYERS: usize = 8;

/// Ordered player names, fixed for the lifetime of a game.
///
/// Players are identified by position; two players may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<String>,
}

impl Roster {
    /// Parse player names separated by newlines or commas.
    ///
    /// Names are trimmed and blank entries dropped. Fails with
    /// [`BobError::InvalidPlayerCount`] unless 3 to 8 names remain.
    pub fn parse(input: &str) -> BobResult<Self> {
        let players: Vec<String> = input
            .split(['\n', ','])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Self::from_names(players)
    }

    /// Build a roster from already-split names.
    pub fn from_names(players: Vec<String>) -> BobResult<Self> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
            return Err(BobError::InvalidPlayerCount {
                count: players.len(),
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }
        Ok(Self { players })
    }

    /// Player names in seating order.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// Name of the player at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.players.get(index).map(String::as_str)
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Always false for a valid roster; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Find a player by name, then case-insensitive name, then 1-based seat.
    pub fn find(&self, query: &str) -> Option<usize> {
        find_by_name_or_position(&self.players, query)
    }
}
