//! Append-only history of finished rounds.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::export::{FIXED_COLUMNS, LedgerTable};
use crate::record::RoundRecord;

/// Finished rounds of the current game, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    puppets: Vec<String>,
    records: Vec<RoundRecord>,
}

impl Ledger {
    /// Create an empty ledger whose puppet columns follow `puppets`.
    pub fn new(puppets: &[String]) -> Self {
        Self {
            puppets: puppets.to_vec(),
            records: Vec::new(),
        }
    }

    /// Append a finished round.
    pub fn append(&mut self, record: RoundRecord) {
        debug_assert_eq!(record.puppet_columns.len(), self.puppets.len());
        debug!(round = record.number, total = self.records.len() + 1, "ledger append");
        self.records.push(record);
    }

    /// All records.
    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&RoundRecord> {
        self.records.last()
    }

    /// Number of finished rounds.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no round has been finished yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names: the fixed columns, then one per puppet in catalog order.
    pub fn header(&self) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.puppets.iter().cloned())
            .collect()
    }

    /// Render the ledger as a table. Pure function of the ledger's contents.
    pub fn export(&self) -> LedgerTable {
        LedgerTable {
            header: self.header(),
            rows: self.records.iter().map(RoundRecord::cells).collect(),
        }
    }

    /// Serialize the records as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}
