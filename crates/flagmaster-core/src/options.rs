//! Multiple-choice option generation.

use std::collections::HashSet;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;

use crate::error::QuizError;
use crate::model::{CountryRecord, Stage};

/// Options shown per question.
pub const OPTION_COUNT: usize = 4;

/// Wrong answers shown per question.
pub const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

/// The options presented for the current stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    /// Which attribute is being asked for.
    pub stage: Stage,
    /// The one correct option.
    pub correct_answer: String,
    /// All options in display order, the correct one included.
    pub options: Vec<String>,
}

impl QuestionView {
    /// Whether `candidate` is one of the displayed options.
    pub fn contains(&self, candidate: &str) -> bool {
        self.options.iter().any(|o| o == candidate)
    }

    /// The option at a zero-based display position.
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }
}

/// Distinct values of the stage's attribute that differ from `correct`.
///
/// Values keep the order in which they first appear in `countries`, so
/// repeated currencies such as "Euro" collapse into one candidate.
pub fn distractor_pool<'a>(
    countries: &'a [CountryRecord],
    correct: &str,
    stage: Stage,
) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    countries
        .iter()
        .map(|c| c.answer_for(stage))
        .filter(|value| *value != correct)
        .filter(|value| seen.insert(*value))
        .collect()
}

/// Build a shuffled four-option question for `correct` at `stage`.
///
/// Fails instead of returning fewer options when the dataset does not hold
/// three distinct distractors for this attribute.
pub fn build_options<R: Rng + ?Sized>(
    countries: &[CountryRecord],
    correct: &str,
    stage: Stage,
    rng: &mut R,
) -> Result<QuestionView, QuizError> {
    let pool = distractor_pool(countries, correct, stage);
    if pool.len() < DISTRACTOR_COUNT {
        return Err(QuizError::InsufficientDistractors {
            stage,
            available: pool.len(),
        });
    }

    let mut options: Vec<String> = pool
        .choose_multiple(rng, DISTRACTOR_COUNT)
        .map(|value| value.to_string())
        .collect();
    options.push(correct.to_string());
    options.shuffle(rng);

    Ok(QuestionView {
        stage,
        correct_answer: correct.to_string(),
        options,
    })
}
