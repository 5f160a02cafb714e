//! The round state machine.
//!
//! A `GameSession` owns everything one table of players needs: the roster,
//! the ledger of finished rounds, and the round in progress. Each method is
//! one user action and either completes its transition or leaves the session
//! as it was.
//!
//! ```text
//! AwaitingRoster --start_game--> Drawing --write_story--> Writing
//!                                   ^                        |
//!                                   |              advance_to_assignment
//!                                   |                        v
//!                                   +----finish_round---- Assigning
//! ```

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assignment::Assignment;
use crate::catalog::{Catalog, RoundDraw};
use crate::characters::CharacterSet;
use crate::config::GameConfig;
use crate::error::{BobError, BobResult};
use crate::ledger::Ledger;
use crate::record::RoundRecord;
use crate::roster::Roster;

/// Where a session is in the round cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No game yet; waiting for player names.
    AwaitingRoster,
    /// Cards are on the table for the current round.
    Drawing,
    /// The narrator is writing the story and naming characters.
    Writing,
    /// Characters are being handed to players and puppets.
    Assigning,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingRoster => write!(f, "waiting for players"),
            Self::Drawing => write!(f, "drawing cards"),
            Self::Writing => write!(f, "writing the story"),
            Self::Assigning => write!(f, "assigning characters"),
        }
    }
}

/// Per-round state, discarded once folded into a record.
#[derive(Debug, Clone)]
struct ActiveRound {
    draw: RoundDraw,
    story: String,
    assignment: Option<Assignment>,
    notes: String,
}

/// One game at one table.
#[derive(Debug)]
pub struct GameSession {
    catalog: Arc<Catalog>,
    roster: Option<Roster>,
    ledger: Ledger,
    game_number: u32,
    round_number: u32,
    phase: Phase,
    round: Option<ActiveRound>,
    rng: StdRng,
}

impl GameSession {
    /// Create a session waiting for its roster.
    pub fn new(config: GameConfig) -> BobResult<Self> {
        config.catalog.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            ledger: Ledger::new(config.catalog.puppets()),
            catalog: config.catalog,
            roster: None,
            game_number: 0,
            round_number: 0,
            phase: Phase::AwaitingRoster,
            round: None,
            rng,
        })
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The shared catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The players, once a game has started.
    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    /// Finished rounds of this game.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// How many games this session has started. Unlike the round counter it
    /// never goes back, so `(game_number, round_number)` names a round
    /// uniquely within the session.
    pub fn game_number(&self) -> u32 {
        self.game_number
    }

    /// Number of the round in progress; 0 before the game starts.
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Cards of the round in progress. Stable until the round ends.
    pub fn draw(&self) -> Option<&RoundDraw> {
        self.round.as_ref().map(|r| &r.draw)
    }

    /// Story written so far.
    pub fn story(&self) -> Option<&str> {
        self.round.as_ref().map(|r| r.story.as_str())
    }

    /// Notes written so far.
    pub fn notes(&self) -> Option<&str> {
        self.round.as_ref().map(|r| r.notes.as_str())
    }

    /// The assignment being built.
    pub fn assignment(&self) -> Option<&Assignment> {
        self.round.as_ref().and_then(|r| r.assignment.as_ref())
    }

    /// Characters of the round, once accepted.
    pub fn characters(&self) -> Option<&CharacterSet> {
        self.assignment().map(Assignment::characters)
    }

    /// Start a new game from newline- or comma-separated player names.
    ///
    /// On success any previous game is discarded: the ledger is cleared and
    /// the round counter restarts at 1. On failure nothing changes.
    pub fn start_game(&mut self, players: &str) -> BobResult<&Roster> {
        let roster = Roster::parse(players)?;
        self.game_number += 1;
        info!(game = self.game_number, players = roster.len(), "starting game");

        self.ledger = Ledger::new(self.catalog.puppets());
        self.round_number = 1;
        self.round = None;
        self.enter_drawing();
        Ok(self.roster.insert(roster))
    }

    /// Record the narrator's story. Can be called repeatedly to revise it.
    pub fn write_story(&mut self, story: &str) -> BobResult<()> {
        self.expect_phase("write a story", &[Phase::Drawing, Phase::Writing])?;
        self.enter_writing();
        if let Some(round) = self.round.as_mut() {
            round.story = story.to_string();
        }
        Ok(())
    }

    /// Accept the round's characters and move on to assignment.
    ///
    /// Fails with [`BobError::InvalidCharacterCount`] unless there are
    /// between 2 and roster-size names; the session then stays in
    /// [`Phase::Writing`].
    pub fn advance_to_assignment<I, S>(&mut self, names: I) -> BobResult<&Assignment>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.expect_phase("name characters", &[Phase::Drawing, Phase::Writing])?;
        self.enter_writing();

        let roster = self.active_roster()?;
        let characters = CharacterSet::new(names, roster.len())?;
        let assignment = Assignment::new(characters, roster.players(), self.catalog.puppets())?;
        debug!(characters = assignment.characters().len(), "characters accepted");

        self.phase = Phase::Assigning;
        let round = self.active_round_mut()?;
        Ok(round.assignment.insert(assignment))
    }

    /// Drop the accepted characters and go back to writing.
    pub fn reopen_writing(&mut self) -> BobResult<()> {
        self.expect_phase("edit characters", &[Phase::Assigning])?;
        self.active_round_mut()?.assignment = None;
        self.phase = Phase::Writing;
        debug!("reopened writing");
        Ok(())
    }

    /// Players still open to `character`.
    pub fn player_candidates(&self, character: &str) -> BobResult<Vec<&str>> {
        let (assignment, index) = self.resolve_character("list players", character)?;
        let roster = self.active_roster()?;
        Ok(assignment
            .player_candidates(index)?
            .into_iter()
            .filter_map(|p| roster.name(p))
            .collect())
    }

    /// Puppets still open to `character`.
    pub fn puppet_candidates(&self, character: &str) -> BobResult<Vec<&str>> {
        let (assignment, index) = self.resolve_character("list puppets", character)?;
        Ok(assignment
            .puppet_candidates(index)?
            .into_iter()
            .map(|p| self.catalog.puppets()[p].as_str())
            .collect())
    }

    /// Give `character` to `player` (name or 1-based seat).
    pub fn assign_player(&mut self, character: &str, player: &str) -> BobResult<()> {
        let (_, index) = self.resolve_character("assign players", character)?;
        let player_index = self
            .active_roster()?
            .find(player)
            .ok_or_else(|| BobError::UnknownPlayer(player.to_string()))?;
        self.assignment_mut()?.assign_player(index, player_index)
    }

    /// Give `character` the puppet `puppet` (name or 1-based position).
    pub fn assign_puppet(&mut self, character: &str, puppet: &str) -> BobResult<()> {
        let (_, index) = self.resolve_character("assign puppets", character)?;
        let puppet_index = self
            .catalog
            .find_puppet(puppet)
            .ok_or_else(|| BobError::UnknownPuppet(puppet.to_string()))?;
        self.assignment_mut()?.assign_puppet(index, puppet_index)
    }

    /// Assign from orderings: the n-th listed player and puppet go to the
    /// n-th character.
    pub fn assign_in_order<S: AsRef<str>>(
        &mut self,
        players: &[S],
        puppets: &[S],
    ) -> BobResult<()> {
        self.expect_phase("assign characters", &[Phase::Assigning])?;
        let roster = self.active_roster()?;
        let players = players
            .iter()
            .map(|p| {
                roster
                    .find(p.as_ref())
                    .ok_or_else(|| BobError::UnknownPlayer(p.as_ref().to_string()))
            })
            .collect::<BobResult<Vec<_>>>()?;
        let puppets = puppets
            .iter()
            .map(|p| {
                self.catalog
                    .find_puppet(p.as_ref())
                    .ok_or_else(|| BobError::UnknownPuppet(p.as_ref().to_string()))
            })
            .collect::<BobResult<Vec<_>>>()?;
        self.assignment_mut()?.assign_in_order(&players, &puppets)
    }

    /// Record notes for the round in progress.
    pub fn set_notes(&mut self, notes: &str) -> BobResult<()> {
        self.expect_phase(
            "take notes",
            &[Phase::Drawing, Phase::Writing, Phase::Assigning],
        )?;
        self.active_round_mut()?.notes = notes.to_string();
        Ok(())
    }

    /// Finish the round: append its record to the ledger, advance the round
    /// counter, and draw cards for the next round.
    ///
    /// Every character needs a player and a puppet; unused puppets are fine.
    pub fn finish_round(&mut self) -> BobResult<RoundRecord> {
        self.expect_phase("finish the round", &[Phase::Assigning])?;
        let wrong_phase = || BobError::WrongPhase {
            action: "finish the round",
            actual: self.phase,
        };
        let round = self.round.as_ref().ok_or_else(wrong_phase)?;
        let assignment = round.assignment.as_ref().ok_or_else(wrong_phase)?;
        assignment.check_complete()?;

        let record = RoundRecord::new(
            self.round_number,
            &round.draw,
            &round.story,
            assignment,
            &round.notes,
        );
        self.ledger.append(record.clone());
        info!(round = self.round_number, "round finished");

        self.round_number += 1;
        self.round = None;
        self.enter_drawing();
        Ok(record)
    }

    /// Throw away the round in progress and draw new cards. The ledger and
    /// the round counter are untouched.
    pub fn abort_round(&mut self) -> BobResult<()> {
        self.expect_phase(
            "abort the round",
            &[Phase::Drawing, Phase::Writing, Phase::Assigning],
        )?;
        info!(round = self.round_number, "round aborted");
        self.round = None;
        self.enter_drawing();
        Ok(())
    }

    /// End the game: forget the roster, the ledger, and the round.
    pub fn reset(&mut self) {
        info!(rounds = self.ledger.len(), "game reset");
        self.roster = None;
        self.ledger = Ledger::new(self.catalog.puppets());
        self.round_number = 0;
        self.round = None;
        self.phase = Phase::AwaitingRoster;
    }

    fn enter_drawing(&mut self) {
        if self.round.is_none() {
            let draw = self.catalog.draw(&mut self.rng);
            debug!(round = self.round_number, emotion = %draw.emotion, "cards drawn");
            self.round = Some(ActiveRound {
                draw,
                story: String::new(),
                assignment: None,
                notes: String::new(),
            });
        }
        self.phase = Phase::Drawing;
    }

    fn enter_writing(&mut self) {
        if self.phase != Phase::Writing {
            debug!(round = self.round_number, "writing");
            self.phase = Phase::Writing;
        }
    }

    fn expect_phase(&self, action: &'static str, allowed: &[Phase]) -> BobResult<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(BobError::WrongPhase {
                action,
                actual: self.phase,
            })
        }
    }

    fn active_roster(&self) -> BobResult<&Roster> {
        self.roster.as_ref().ok_or(BobError::WrongPhase {
            action: "play a round",
            actual: self.phase,
        })
    }

    fn active_round_mut(&mut self) -> BobResult<&mut ActiveRound> {
        let phase = self.phase;
        self.round.as_mut().ok_or(BobError::WrongPhase {
            action: "play a round",
            actual: phase,
        })
    }

    fn assignment_mut(&mut self) -> BobResult<&mut Assignment> {
        let phase = self.phase;
        self.round
            .as_mut()
            .and_then(|r| r.assignment.as_mut())
            .ok_or(BobError::WrongPhase {
                action: "assign characters",
                actual: phase,
            })
    }

    fn resolve_character(
        &self,
        action: &'static str,
        character: &str,
    ) -> BobResult<(&Assignment, usize)> {
        self.expect_phase(action, &[Phase::Assigning])?;
        let assignment = self.assignment().ok_or(BobError::WrongPhase {
            action,
            actual: self.phase,
        })?;
        let index = assignment
            .characters()
            .find(character)
            .ok_or_else(|| BobError::UnknownCharacter(character.to_string()))?;
        Ok((assignment, index))
    }
}
