//! Remote persistence for finished rounds.
//!
//! The local ledger is always the source of truth. Sinks here receive a copy
//! of each finished round on a background worker, so a slow or failing
//! remote never holds up the next round.

pub mod config;
pub mod error;
pub mod sheet;
pub mod sink;
pub mod worker;

pub use config::SheetConfig;
pub use error::{SyncError, SyncResult};
pub use sheet::SheetSink;
pub use sink::{RoundSink, RowKey, SyncRow};
pub use worker::{SyncStatus, SyncWorker};
