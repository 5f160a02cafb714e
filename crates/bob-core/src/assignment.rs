//! Matching characters to players and puppets.
//!
//! Both mappings are drawn without replacement: a player plays at most one
//! character per round and a puppet is worn by at most one character. The
//! engine is input-agnostic; a caller can pick one pair at a time
//! ([`Assignment::assign_player`]) or hand over whole orderings
//! ([`Assignment::assign_in_order`]).

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::characters::CharacterSet;
use crate::error::{BobError, BobResult, CandidateKind};

/// One pool's choices, indexed by character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Picks {
    chosen: Vec<Option<usize>>,
    pool: usize,
}

impl Picks {
    fn new(characters: usize, pool: usize) -> Self {
        Self {
            chosen: vec![None; characters],
            pool,
        }
    }

    /// The character currently holding `item`.
    fn holder(&self, item: usize) -> Option<usize> {
        self.chosen.iter().position(|c| *c == Some(item))
    }

    /// Items free for `character`, including the one it already holds.
    fn candidates(&self, character: usize) -> Vec<usize> {
        (0..self.pool)
            .filter(|&item| self.holder(item).is_none_or(|h| h == character))
            .collect()
    }

    fn clear(&mut self) {
        self.chosen.iter_mut().for_each(|c| *c = None);
    }

    fn first_gap(&self) -> Option<usize> {
        self.chosen.iter().position(Option::is_none)
    }
}

/// The character-to-player and character-to-puppet mappings of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    characters: CharacterSet,
    player_names: Vec<String>,
    puppet_names: Vec<String>,
    players: Picks,
    puppets: Picks,
}

impl Assignment {
    /// Start an empty assignment for `characters`.
    ///
    /// Fails with [`BobError::ExhaustedCandidates`] if there are more
    /// characters than players or puppets.
    pub fn new(
        characters: CharacterSet,
        players: &[String],
        puppets: &[String],
    ) -> BobResult<Self> {
        for (kind, pool) in [
            (CandidateKind::Player, players.len()),
            (CandidateKind::Puppet, puppets.len()),
        ] {
            if let Some(character) = characters.name(pool) {
                return Err(exhausted(kind, character));
            }
        }

        let count = characters.len();
        Ok(Self {
            characters,
            player_names: players.to_vec(),
            puppet_names: puppets.to_vec(),
            players: Picks::new(count, players.len()),
            puppets: Picks::new(count, puppets.len()),
        })
    }

    /// The characters being cast.
    pub fn characters(&self) -> &CharacterSet {
        &self.characters
    }

    /// Players `character` may still be given, by roster position.
    pub fn player_candidates(&self, character: usize) -> BobResult<Vec<usize>> {
        let name = self.character_name(character)?;
        let candidates = self.players.candidates(character);
        if candidates.is_empty() {
            return Err(exhausted(CandidateKind::Player, name));
        }
        Ok(candidates)
    }

    /// Puppets `character` may still be given, by catalog position.
    pub fn puppet_candidates(&self, character: usize) -> BobResult<Vec<usize>> {
        let name = self.character_name(character)?;
        let candidates = self.puppets.candidates(character);
        if candidates.is_empty() {
            return Err(exhausted(CandidateKind::Puppet, name));
        }
        Ok(candidates)
    }

    /// Give `character` to the player at roster position `player`.
    ///
    /// A player already held by another character is refused. Reassigning a
    /// character releases its previous player.
    pub fn assign_player(&mut self, character: usize, player: usize) -> BobResult<()> {
        self.character_name(character)?;
        if player >= self.player_names.len() {
            return Err(BobError::UnknownPlayer(format!("#{}", player + 1)));
        }
        if let Some(holder) = self.players.holder(player)
            && holder != character
        {
            return Err(BobError::PlayerTaken {
                player: self.player_names[player].clone(),
                character: self.characters.names()[holder].clone(),
            });
        }
        self.players.chosen[character] = Some(player);
        Ok(())
    }

    /// Give `character` the puppet at catalog position `puppet`.
    pub fn assign_puppet(&mut self, character: usize, puppet: usize) -> BobResult<()> {
        self.character_name(character)?;
        if puppet >= self.puppet_names.len() {
            return Err(BobError::UnknownPuppet(format!("#{}", puppet + 1)));
        }
        if let Some(holder) = self.puppets.holder(puppet)
            && holder != character
        {
            return Err(BobError::PuppetTaken {
                puppet: self.puppet_names[puppet].clone(),
                character: self.characters.names()[holder].clone(),
            });
        }
        self.puppets.chosen[character] = Some(puppet);
        Ok(())
    }

    /// Replace both mappings from orderings of players and puppets.
    ///
    /// The first entry of each ordering goes to the first character, and so
    /// on; entries past the character count are ignored. On error the
    /// previous assignment is kept.
    pub fn assign_in_order(&mut self, players: &[usize], puppets: &[usize]) -> BobResult<()> {
        if let Some(character) = self.characters.name(players.len()) {
            return Err(exhausted(CandidateKind::Player, character));
        }
        if let Some(character) = self.characters.name(puppets.len()) {
            return Err(exhausted(CandidateKind::Puppet, character));
        }

        let mut next = self.clone();
        next.players.clear();
        next.puppets.clear();
        for (character, (&player, &puppet)) in players.iter().zip(puppets).enumerate() {
            if character >= self.characters.len() {
                break;
            }
            next.assign_player(character, player)?;
            next.assign_puppet(character, puppet)?;
        }
        *self = next;
        Ok(())
    }

    /// Roster position of the player given to `character`.
    pub fn player_of(&self, character: usize) -> Option<usize> {
        self.players.chosen.get(character).copied().flatten()
    }

    /// Catalog position of the puppet given to `character`.
    pub fn puppet_of(&self, character: usize) -> Option<usize> {
        self.puppets.chosen.get(character).copied().flatten()
    }

    /// Whether every character has both a player and a puppet.
    pub fn is_complete(&self) -> bool {
        self.check_complete().is_ok()
    }

    /// Report the first character still missing a player or a puppet.
    pub fn check_complete(&self) -> BobResult<()> {
        let gaps = [
            (self.players.first_gap(), "player"),
            (self.puppets.first_gap(), "puppet"),
        ];
        match gaps
            .into_iter()
            .filter_map(|(gap, what)| gap.map(|i| (i, what)))
            .min_by_key(|(i, _)| *i)
        {
            Some((character, missing)) => Err(BobError::IncompleteAssignment {
                character: self.characters.names()[character].clone(),
                missing,
            }),
            None => Ok(()),
        }
    }

    /// One cell per catalog puppet, in catalog order: `"<player> - <character>"`
    /// for a used puppet, empty otherwise.
    pub fn puppet_columns(&self) -> Vec<String> {
        (0..self.puppet_names.len())
            .map(|puppet| match self.puppets.holder(puppet) {
                Some(character) => match self.player_of(character) {
                    Some(player) => format!(
                        "{} - {}",
                        self.player_names[player],
                        self.characters.names()[character]
                    ),
                    None => String::new(),
                },
                None => String::new(),
            })
            .collect()
    }

    fn character_name(&self, character: usize) -> BobResult<&str> {
        self.characters
            .name(character)
            .ok_or_else(|| BobError::UnknownCharacter(format!("#{}", character + 1)))
    }
}

fn exhausted(kind: CandidateKind, character: &str) -> BobError {
    error!(%kind, character, "assignment ran out of candidates");
    BobError::ExhaustedCandidates {
        kind,
        character: character.to_string(),
    }
}
