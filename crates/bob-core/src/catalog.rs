//! Static card and puppet lists.
//!
//! The catalog is shared read-only by every session. Its puppet order fixes
//! the puppet columns of every exported row.

use std::collections::HashSet;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{BobError, BobResult};
use crate::roster::MAX_PLAYERS;

/// Hand puppets available at the table, in column order.
pub const PUPPETS: &[&str] = &[
    "Taylor",
    "Fade",
    "Apexeus",
    "Adam",
    "Foil",
    "Sure",
    "Weeee",
    "Doña María",
    "Zizi",
    "Nahas",
];

/// Emotion cards.
pub const EMOTIONS: &[&str] = &[
    "Joy",
    "Excitement",
    "Gratitude",
    "Pride",
    "Hope",
    "Wonder or Awe",
    "Relief",
    "Trust",
    "Sadness",
    "Disappointment",
    "Loneliness",
    "Grief",
    "Heartbreak",
    "Hopelessness or Despair",
    "Regret",
    "Fear",
    "Stress",
    "Overwhelm",
    "Vulnerability",
    "Anger",
    "Frustration",
    "Resentment",
    "Betrayal",
    "Hate",
    "Disgust",
    "Guilt",
    "Shame",
    "Embarrassment",
    "Humiliation",
    "Stupidity or Foolishness",
    "Admiration",
    "Empathy",
    "Belonging",
    "Separation",
    "Boundaries",
    "Schadenfreude",
    "Confusion or Lost",
];

/// Story prompt cards.
pub const PROMPTS: &[&str] = &[
    "A story you tell often, but maybe haven't analyzed much.",
    "A story about a time you felt like a hero.",
    "A story you rarely tell.",
    "A story where you don't understand what happened.",
    "A story that you're still not sure how you feel about.",
    "A story that changed your life in a big or small way.",
    "A story that makes you laugh every time.",
    "A story about a time you messed up.",
    "A story about a time you surprised yourself.",
    "A story about a time you were surprised by someone else.",
    "A story that you think reveals something essential about who you are.",
    "A story about a time you had to make a difficult decision.",
    "A story about a time you learned a valuable lesson.",
    "A story that happened to you overseas.",
    "A story with someone in this room.",
    "A story with someone from work.",
    "A story with your best friend.",
    "A story from your family.",
    "A story you heard from someone else.",
    "A story from a book, tv show or a movie.",
    "A story from your childhood.",
    "A story about a time you tried something new.",
    "A story about an unexpected encounter.",
    "A story about a time you had to keep a secret.",
    "A story about a time you had to pretend to be someone you weren’t.",
    "A story about a time you completely misunderstood a situation.",
    "A story about a bad date.",
    "A story about a coincidence you've experienced.",
    "A story about a time you made a really bad (or really great) first impression.",
    "A story about something that happened at a party.",
    "A story about a time you had to wear something unusual.",
    "A story about an animal encounter.",
    "A story about a time you were in the wrong place at the wrong time.",
    "A story where food plays a major role.",
    "A story that takes place in a car, train, or airplane.",
    "A story about a competition or a bet.",
    "A story that takes place in the middle of the night.",
    "A story that happened during summer.",
    "A story that happened during the holiday season.",
];

/// The emotion and prompt cards drawn for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundDraw {
    /// Emotion the story should carry.
    pub emotion: String,
    /// What kind of story to tell.
    pub prompt: String,
}

impl std::fmt::Display for RoundDraw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Emotion: {}\nPrompt: {}", self.emotion, self.prompt)
    }
}

/// Puppet, emotion, and prompt lists used by a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    puppets: Vec<String>,
    emotions: Vec<String>,
    prompts: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The lists shipped with the game.
    pub fn builtin() -> Self {
        let owned = |list: &[&str]| -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        };
        Self {
            puppets: owned(PUPPETS),
            emotions: owned(EMOTIONS),
            prompts: owned(PROMPTS),
        }
    }

    /// Build a custom catalog.
    ///
    /// Every list must be non-empty, puppet names must be unique, and there
    /// must be enough puppets for the largest possible cast.
    pub fn new(
        puppets: Vec<String>,
        emotions: Vec<String>,
        prompts: Vec<String>,
    ) -> BobResult<Self> {
        let catalog = Self {
            puppets,
            emotions,
            prompts,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the invariants [`Catalog::new`] enforces.
    ///
    /// Catalogs deserialized from configuration bypass `new`, so callers
    /// loading one from a file run this before use.
    pub fn validate(&self) -> BobResult<()> {
        if self.emotions.is_empty() {
            return Err(BobError::InvalidCatalog("no emotions".to_string()));
        }
        if self.prompts.is_empty() {
            return Err(BobError::InvalidCatalog("no prompts".to_string()));
        }
        if self.puppets.len() < MAX_PLAYERS {
            return Err(BobError::InvalidCatalog(format!(
                "need at least {MAX_PLAYERS} puppets, got {}",
                self.puppets.len()
            )));
        }
        let mut seen = HashSet::new();
        for puppet in &self.puppets {
            let trimmed = puppet.trim();
            if trimmed.is_empty() {
                return Err(BobError::InvalidCatalog("blank puppet name".to_string()));
            }
            if !seen.insert(trimmed.to_lowercase()) {
                return Err(BobError::InvalidCatalog(format!(
                    "puppet \"{trimmed}\" listed twice"
                )));
            }
        }
        Ok(())
    }

    /// Puppet names in column order.
    pub fn puppets(&self) -> &[String] {
        &self.puppets
    }

    /// Emotion cards.
    pub fn emotions(&self) -> &[String] {
        &self.emotions
    }

    /// Prompt cards.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Find a puppet by name, then case-insensitive name, then 1-based position.
    pub fn find_puppet(&self, query: &str) -> Option<usize> {
        find_by_name_or_position(&self.puppets, query)
    }

    /// Draw an emotion and a prompt, independently and uniformly.
    pub fn draw(&self, rng: &mut StdRng) -> RoundDraw {
        let emotion = &self.emotions[rng.random_range(0..self.emotions.len())];
        let prompt = &self.prompts[rng.random_range(0..self.prompts.len())];
        RoundDraw {
            emotion: emotion.clone(),
            prompt: prompt.clone(),
        }
    }
}

/// Resolve `query` against `names`: an exact name first, then a
/// case-insensitive name, then a 1-based position. The first match wins.
pub(crate) fn find_by_name_or_position(names: &[String], query: &str) -> Option<usize> {
    let query = query.trim();
    if let Some(i) = names.iter().position(|n| n == query) {
        return Some(i);
    }
    let lower = query.to_lowercase();
    if let Some(i) = names.iter().position(|n| n.to_lowercase() == lower) {
        return Some(i);
    }
    query
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=names.len()).contains(n))
        .map(|n| n - 1)
}
