//! Characters named by the narrator for one round.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::find_by_name_or_position;
use crate::error::{BobError, BobResult};

/// Fewest characters a story can have.
pub const MIN_CHARACTERS: usize = 2;

/// Ordered, unique character names for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSet {
    names: Vec<String>,
}

impl CharacterSet {
    /// Validate the narrator's character list against the roster size.
    ///
    /// Blank entries are skipped, like empty input boxes. The remaining
    /// names must number between 2 and `roster_len` and be pairwise
    /// distinct after trimming.
    pub fn new<I, S>(names: I, roster_len: usize) -> BobResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        if !(MIN_CHARACTERS..=roster_len).contains(&names.len()) {
            return Err(BobError::InvalidCharacterCount {
                count: names.len(),
                max: roster_len,
            });
        }

        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(BobError::DuplicateCharacter(dup.clone()));
        }

        Ok(Self { names })
    }

    /// Split a comma- or newline-separated list and validate it.
    pub fn parse(input: &str, roster_len: usize) -> BobResult<Self> {
        Self::new(input.split(['\n', ',']), roster_len)
    }

    /// Character names in the order the narrator gave them.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of the character at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a validated set.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Find a character by exact name, then case-insensitively, then by
    /// 1-based position.
    pub fn find(&self, query: &str) -> Option<usize> {
        find_by_name_or_position(&self.names, query)
    }

    /// Names joined for display and export.
    pub fn joined(&self) -> String {
        self.names.join(", ")
    }
}
