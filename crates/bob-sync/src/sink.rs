//! The one-way sink interface.

use serde::Serialize;

use bob_core::{Ledger, RoundRecord};

use crate::error::SyncResult;

/// Names a submitted row within one session: round numbers restart with
/// every game, so the game number is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RowKey {
    /// Game the round was played in.
    pub game: u32,
    /// Round number within that game.
    pub round: u32,
}

impl RowKey {
    /// Key for `round` of `game`.
    pub fn new(game: u32, round: u32) -> Self {
        Self { game, round }
    }
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "game {} round {}", self.game, self.round)
    }
}

/// A finished round flattened for a remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncRow {
    /// Game the row belongs to.
    pub game: u32,
    /// Round number the row belongs to.
    pub round: u32,
    /// Column names in export order.
    pub header: Vec<String>,
    /// Cells aligned with `header`.
    pub values: Vec<String>,
}

impl SyncRow {
    /// Flatten `record`, played in game number `game`, using the ledger's
    /// column layout.
    pub fn from_record(game: u32, ledger: &Ledger, record: &RoundRecord) -> Self {
        Self {
            game,
            round: record.number,
            header: ledger.header(),
            values: record.cells(),
        }
    }

    /// Key the row is tracked under.
    pub fn key(&self) -> RowKey {
        RowKey::new(self.game, self.round)
    }
}

/// Somewhere finished rounds are appended to.
pub trait RoundSink: Send {
    /// Short label used in logs and status output.
    fn name(&self) -> &str;

    /// Append one row. Implementations must not retry forever.
    fn append(&mut self, row: &SyncRow) -> SyncResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bob_core::{GameConfig, GameSession};

    #[test]
    fn row_follows_ledger_layout() {
        let mut s = GameSession::new(GameConfig::default().with_seed(8)).unwrap();
        s.start_game("Ann, Bo, Cid").unwrap();
        s.advance_to_assignment(["Hero", "Villain"]).unwrap();
        s.assign_in_order(&["Bo", "Cid"], &["Fade", "Taylor"]).unwrap();
        let record = s.finish_round().unwrap();

        let row = SyncRow::from_record(s.game_number(), s.ledger(), &record);
        assert_eq!(row.key(), RowKey::new(1, 1));
        assert_eq!(row.key().to_string(), "game 1 round 1");
        assert_eq!(row.header.len(), row.values.len());
        assert_eq!(row.header[5], "Taylor");
        assert_eq!(row.values[5], "Cid - Villain");
        assert_eq!(row.values[6], "Bo - Hero");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["game"], 1);
        assert_eq!(json["round"], 1);
        assert_eq!(json["values"][3], "Hero, Villain");
    }
}
