//! Quiz configuration error types.
//!
//! Every variant describes a reference dataset or setting the engine cannot
//! play with. They are raised at startup, never in the middle of a question.

use thiserror::Error;

use crate::model::Stage;

/// Errors raised when the engine cannot be built from its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// Fewer than three distinct wrong answers exist for a stage.
    #[error("not enough distinct {stage} values to build options: need 3 distractors, found {available}")]
    InsufficientDistractors { stage: Stage, available: usize },

    /// A difficulty tier has no countries at all.
    #[error("no countries at difficulty tier {0}")]
    EmptyTier(u8),

    /// A record carries a difficulty outside the playable range.
    #[error("difficulty tier {tier} of {country} is outside 1..=10")]
    InvalidTier { country: String, tier: u8 },

    /// A game mode string could not be parsed.
    #[error("unknown game mode: {0}")]
    InvalidMode(String),
}
