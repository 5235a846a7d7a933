//! Core data model types for flagmaster.
//!
//! Countries come from the reference dataset and never change; a
//! [`GameSession`] is the only mutable state and belongs to the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuizError;

/// Questions that must be completed to clear a level.
pub const QUESTIONS_PER_LEVEL: u32 = 5;

/// The hardest difficulty tier, and the last level of a session.
pub const MAX_LEVEL: u8 = 10;

/// Length of a Blitz session in seconds.
pub const BLITZ_DURATION_SECS: u32 = 60;

/// A single country in the reference dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// Country name (e.g. "France").
    pub name: String,
    /// ISO 3166-1 alpha-2 code used to render the flag.
    #[serde(alias = "code")]
    pub iso_code: String,
    /// Capital city.
    pub capital: String,
    /// Currency name.
    pub currency: String,
    /// Difficulty tier, 1 (easiest) to 10.
    pub difficulty: u8,
}

impl CountryRecord {
    /// The correct answer for the given stage.
    pub fn answer_for(&self, stage: Stage) -> &str {
        match stage {
            Stage::Name => &self.name,
            Stage::Capital => &self.capital,
            Stage::Currency => &self.currency,
        }
    }

    /// The flag as a pair of Unicode regional indicator symbols.
    ///
    /// Falls back to the upper-cased ISO code when it is not two ASCII letters.
    pub fn flag_emoji(&self) -> String {
        let code = self.iso_code.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return code.to_uppercase();
        }
        code.to_ascii_lowercase()
            .chars()
            .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'a' as u32)))
            .collect()
    }
}

/// How a session is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// No time limit; the session ends after level 10.
    Normal,
    /// A sixty-second countdown.
    Blitz,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Normal => write!(f, "NORMAL"),
            GameMode::Blitz => write!(f, "BLITZ"),
        }
    }
}

impl FromStr for GameMode {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "n" => Ok(GameMode::Normal),
            "blitz" | "b" => Ok(GameMode::Blitz),
            other => Err(QuizError::InvalidMode(other.to_string())),
        }
    }
}

/// One of the three sub-questions asked about a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Name,
    Capital,
    Currency,
}

impl Stage {
    /// Points awarded for a correct answer at this stage.
    pub fn points(self) -> u32 {
        match self {
            Stage::Name => 10,
            Stage::Capital => 20,
            Stage::Currency => 30,
        }
    }

    /// The stage that follows this one for the same country.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Name => Some(Stage::Capital),
            Stage::Capital => Some(Stage::Currency),
            Stage::Currency => None,
        }
    }

    /// Prompt shown to the player.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Name => "Identify Country",
            Stage::Capital => "Identify Capital",
            Stage::Currency => "Identify Currency",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Name => write!(f, "name"),
            Stage::Capital => write!(f, "capital"),
            Stage::Currency => write!(f, "currency"),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationReason {
    /// The last question of level 10 was completed.
    Completed,
    /// The Blitz clock ran out.
    TimeExpired,
}

/// Coarse lifecycle of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session has been started.
    Menu,
    InProgress,
    Terminated,
}

/// State of one play-through, owned and mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub(crate) mode: GameMode,
    pub(crate) generation: u64,
    pub(crate) level: u8,
    pub(crate) score: u32,
    pub(crate) questions_completed_in_level: u32,
    pub(crate) active_country: Option<CountryRecord>,
    pub(crate) active_stage: Stage,
    pub(crate) termination: Option<TerminationReason>,
    pub(crate) remaining_seconds: u32,
}

impl GameSession {
    pub(crate) fn new(mode: GameMode, generation: u64) -> Self {
        Self {
            mode,
            generation,
            level: 1,
            score: 0,
            questions_completed_in_level: 0,
            active_country: None,
            active_stage: Stage::Name,
            termination: None,
            remaining_seconds: BLITZ_DURATION_SECS,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Session identity; changes on every restart.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn questions_completed_in_level(&self) -> u32 {
        self.questions_completed_in_level
    }

    pub fn active_country(&self) -> Option<&CountryRecord> {
        self.active_country.as_ref()
    }

    pub fn active_stage(&self) -> Stage {
        self.active_stage
    }

    pub fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Seconds left on the Blitz clock. Meaningless in Normal mode.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }
}
