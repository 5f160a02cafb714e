//! Error types for the game engine.

use thiserror::Error;

use crate::session::Phase;

/// Result type for game operations.
pub type BobResult<T> = Result<T, BobError>;

/// What the assignment engine ran out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// Players from the roster.
    Player,
    /// Puppets from the catalog.
    Puppet,
}

impl std::fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player => write!(f, "players"),
            Self::Puppet => write!(f, "puppets"),
        }
    }
}

/// Errors that can occur while running a game.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BobError {
    /// The roster does not hold between 3 and 8 names.
    #[error("please enter between {min} and {max} players (got {count})")]
    InvalidPlayerCount {
        /// Number of names parsed from the input.
        count: usize,
        /// Smallest accepted roster.
        min: usize,
        /// Largest accepted roster.
        max: usize,
    },

    /// The story names too few or too many characters.
    #[error("a story needs between 2 and {max} characters (got {count})")]
    InvalidCharacterCount {
        /// Number of non-blank character names given.
        count: usize,
        /// Upper bound, the roster size.
        max: usize,
    },

    /// Two characters in the same round share a name.
    #[error("character \"{0}\" is listed twice")]
    DuplicateCharacter(String),

    /// No player or puppet is left to offer a character.
    #[error("no {kind} left to assign to \"{character}\"")]
    ExhaustedCandidates {
        /// Which pool ran dry.
        kind: CandidateKind,
        /// The character that could not be served.
        character: String,
    },

    /// The player already plays another character this round.
    #[error("{player} already plays {character}")]
    PlayerTaken {
        /// Player name.
        player: String,
        /// Character currently holding the player.
        character: String,
    },

    /// The puppet is already worn by another character this round.
    #[error("{puppet} is already used for {character}")]
    PuppetTaken {
        /// Puppet name.
        puppet: String,
        /// Character currently holding the puppet.
        character: String,
    },

    /// No player with that name or position.
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    /// No puppet with that name or position.
    #[error("unknown puppet: {0}")]
    UnknownPuppet(String),

    /// No character with that name or position in the current round.
    #[error("unknown character: {0}")]
    UnknownCharacter(String),

    /// A character is still missing a player or a puppet.
    #[error("\"{character}\" still needs a {missing}")]
    IncompleteAssignment {
        /// The first character with a gap.
        character: String,
        /// `"player"` or `"puppet"`.
        missing: &'static str,
    },

    /// The action is not available in the current phase.
    #[error("cannot {action} while {actual}")]
    WrongPhase {
        /// What was attempted.
        action: &'static str,
        /// The phase the session is in.
        actual: Phase,
    },

    /// A configured catalog is unusable.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}
