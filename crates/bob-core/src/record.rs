//! Finished rounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::catalog::RoundDraw;

/// The immutable row written when a round is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number within the game, starting at 1.
    pub number: u32,
    /// Emotion card of the round.
    pub emotion: String,
    /// Prompt card of the round.
    pub prompt: String,
    /// The narrator's story.
    pub story: String,
    /// Character names in the order they were given.
    pub characters: Vec<String>,
    /// Free-form notes.
    pub notes: String,
    /// One cell per catalog puppet, empty when the puppet sat out.
    pub puppet_columns: Vec<String>,
    /// When the round was finished.
    pub finished_at: DateTime<Utc>,
}

impl RoundRecord {
    /// Fold a completed round into a record.
    pub fn new(
        number: u32,
        draw: &RoundDraw,
        story: &str,
        assignment: &Assignment,
        notes: &str,
    ) -> Self {
        Self {
            number,
            emotion: draw.emotion.clone(),
            prompt: draw.prompt.clone(),
            story: story.to_string(),
            characters: assignment.characters().names().to_vec(),
            notes: notes.to_string(),
            puppet_columns: assignment.puppet_columns(),
            finished_at: Utc::now(),
        }
    }

    /// Character names joined with commas.
    pub fn characters_joined(&self) -> String {
        self.characters.join(", ")
    }

    /// Cells in export column order.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.emotion.clone(),
            self.prompt.clone(),
            self.story.clone(),
            self.characters_joined(),
            self.notes.clone(),
        ];
        cells.extend(self.puppet_columns.iter().cloned());
        cells
    }
}
