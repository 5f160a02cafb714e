//! Core of the Blame It on Bob party game.
//!
//! Players draw an emotion and a prompt, the narrator tells a story and names
//! its characters, and every character is handed to a player and a puppet.
//! This crate holds the round state machine that drives that cycle, the
//! assignment engine that keeps players and puppets from being used twice in
//! a round, and the append-only ledger of finished rounds.

pub mod assignment;
pub mod catalog;
pub mod characters;
pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod record;
pub mod roster;
pub mod session;

pub use assignment::Assignment;
pub use catalog::{Catalog, RoundDraw};
pub use characters::CharacterSet;
pub use config::GameConfig;
pub use error::{BobError, BobResult};
pub use export::LedgerTable;
pub use ledger::Ledger;
pub use record::RoundRecord;
pub use roster::Roster;
pub use session::{GameSession, Phase};
