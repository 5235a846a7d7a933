//! The quiz progression state machine.
//!
//! [`QuizEngine`] owns the single [`GameSession`] and applies one event at a
//! time: start, answer, tick, menu. Work that must happen later (the pause
//! after feedback, the fun-fact fetch) is handed back to the caller as a
//! [`StepTicket`]. The caller waits, then returns the ticket through
//! [`QuizEngine::resume`] or [`QuizEngine::deliver_fact`]. Tickets carry the
//! session generation, so a ticket from a superseded session is ignored.

use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::dataset::{validate_dataset, Dataset};
use crate::error::QuizError;
use crate::model::{
    GameMode, GameSession, Phase, Stage, TerminationReason, MAX_LEVEL, QUESTIONS_PER_LEVEL,
};
use crate::options::{build_options, QuestionView};
use crate::random::GameRng;

/// Presentation delays between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After a correct answer, before the next stage.
    pub correct_delay: Duration,
    /// After a wrong answer, before the next country.
    pub wrong_delay: Duration,
    /// After the fun fact is shown, before the next country.
    pub fact_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            correct_delay: Duration::from_millis(800),
            wrong_delay: Duration::from_millis(2000),
            fact_delay: Duration::from_millis(4000),
        }
    }
}

impl Pacing {
    /// No delays at all.
    pub fn immediate() -> Self {
        Self {
            correct_delay: Duration::ZERO,
            wrong_delay: Duration::ZERO,
            fact_delay: Duration::ZERO,
        }
    }
}

/// What a wrong answer does to level progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrongAnswerPolicy {
    /// Counts as a completed question, but never the one that clears a level.
    #[default]
    CountCapped,
    /// Leaves the level count untouched.
    NoProgress,
}

/// Configuration for the quiz engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub pacing: Pacing,
    pub wrong_answer: WrongAnswerPolicy,
}

/// Feedback for the last submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct { stage: Stage, points: u32 },
    Wrong { stage: Stage, correct_answer: String },
}

impl Feedback {
    pub fn is_correct(&self) -> bool {
        matches!(self, Feedback::Correct { .. })
    }

    /// Text shown to the player.
    pub fn message(&self) -> String {
        match self {
            Feedback::Correct { .. } => "Correct!".to_string(),
            Feedback::Wrong { correct_answer, .. } => {
                format!("Oops! The correct answer was {correct_answer}")
            }
        }
    }
}

/// A continuation the caller must run later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Move the same country on to its next stage.
    AdvanceStage,
    /// Resolve a fun fact, then hand it to [`QuizEngine::deliver_fact`].
    FetchFact { country: String },
    /// Count the finished country and move on.
    CompleteQuestion,
    /// Drop the country after a wrong answer and move on.
    AbandonCountry,
}

/// Handle for a scheduled step, bound to the session that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTicket {
    generation: u64,
    step: Step,
    delay: Duration,
}

impl StepTicket {
    pub fn step(&self) -> &Step {
        &self.step
    }

    /// How long to wait before running the step.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Something the presentation layer may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    SessionStarted { mode: GameMode },
    FeedbackCleared,
    QuestionIssued { level: u8, iso_code: String },
    AnswerCorrect { stage: Stage, points: u32 },
    AnswerWrong { stage: Stage, correct_answer: String },
    StageAdvanced { stage: Stage },
    FactReady { country: String },
    QuestionCompleted { completed_in_level: u32 },
    LevelUp { level: u8 },
    TimerTick { remaining_seconds: u32 },
    Terminated { reason: TerminationReason },
    ReturnedToMenu,
}

/// The outcome of one engine operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub events: Vec<QuizEvent>,
    /// Follow-up work, if any.
    pub next: Option<StepTicket>,
}

impl Transition {
    /// An event the engine chose not to act on.
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn is_ignored(&self) -> bool {
        self.events.is_empty() && self.next.is_none()
    }
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub session: Option<&'a GameSession>,
    pub question: Option<&'a QuestionView>,
    pub feedback: Option<&'a Feedback>,
    pub fun_fact: Option<&'a str>,
    pub awaiting_fact: bool,
}

/// The quiz engine.
pub struct QuizEngine {
    dataset: Dataset,
    rng: GameRng,
    config: EngineConfig,
    generation: u64,
    session: Option<GameSession>,
    question: Option<QuestionView>,
    feedback: Option<Feedback>,
    fun_fact: Option<String>,
    pending: Option<Step>,
}

impl QuizEngine {
    /// Build an engine, rejecting datasets that cannot produce every question.
    pub fn new(
        dataset: Dataset,
        rng: impl RngCore + Send + 'static,
        config: EngineConfig,
    ) -> Result<Self, QuizError> {
        for warning in validate_dataset(&dataset)? {
            tracing::warn!("dataset: {}", warning.message);
        }

        Ok(Self {
            dataset,
            rng: Box::new(rng),
            config,
            generation: 0,
            session: None,
            question: None,
            feedback: None,
            fun_fact: None,
            pending: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        match &self.session {
            None => Phase::Menu,
            Some(session) if session.is_terminated() => Phase::Terminated,
            Some(_) => Phase::InProgress,
        }
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn question(&self) -> Option<&QuestionView> {
        self.question.as_ref()
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn fun_fact(&self) -> Option<&str> {
        self.fun_fact.as_deref()
    }

    /// The step currently awaiting its ticket, if any.
    pub fn pending_step(&self) -> Option<&Step> {
        self.pending.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase(),
            session: self.session.as_ref(),
            question: self.question.as_ref(),
            feedback: self.feedback.as_ref(),
            fun_fact: self.fun_fact.as_deref(),
            awaiting_fact: matches!(self.pending, Some(Step::FetchFact { .. })),
        }
    }

    /// Start a fresh session, discarding whatever came before.
    pub fn start_session(&mut self, mode: GameMode) -> Result<Transition, QuizError> {
        self.generation += 1;
        self.session = Some(GameSession::new(mode, self.generation));
        self.question = None;
        self.feedback = None;
        self.fun_fact = None;
        self.pending = None;
        tracing::info!(%mode, generation = self.generation, "session started");

        let mut events = vec![QuizEvent::SessionStarted { mode }];
        self.issue_question(1, &mut events)?;
        Ok(Transition { events, next: None })
    }

    /// Leave the session and return to mode selection.
    pub fn reset_to_menu(&mut self) -> Transition {
        if self.session.is_none() {
            return Transition::ignored();
        }
        self.generation += 1;
        self.session = None;
        self.question = None;
        self.feedback = None;
        self.fun_fact = None;
        self.pending = None;
        Transition {
            events: vec![QuizEvent::ReturnedToMenu],
            next: None,
        }
    }

    /// Submit an answer for the active stage.
    ///
    /// Ignored while feedback is still showing, when no question is active,
    /// and when `candidate` is not one of the displayed options.
    pub fn submit_answer(&mut self, candidate: &str) -> Transition {
        if self.pending.is_some() {
            tracing::debug!("answer ignored: previous answer still resolving");
            return Transition::ignored();
        }
        let Some(session) = self.session.as_mut() else {
            return Transition::ignored();
        };
        if session.is_terminated() {
            return Transition::ignored();
        }
        let (Some(country), Some(question)) = (&session.active_country, &self.question) else {
            return Transition::ignored();
        };
        if !question.contains(candidate) {
            tracing::debug!(candidate, "answer ignored: not an option");
            return Transition::ignored();
        }

        let stage = session.active_stage;
        let correct = country.answer_for(stage).to_string();
        let country_name = country.name.clone();

        if candidate == correct {
            let points = stage.points();
            session.score += points;
            tracing::debug!(%stage, points, score = session.score, "correct answer");
            self.feedback = Some(Feedback::Correct { stage, points });

            let step = match stage.next() {
                Some(_) => Step::AdvanceStage,
                None => Step::FetchFact {
                    country: country_name,
                },
            };
            let events = vec![QuizEvent::AnswerCorrect { stage, points }];
            self.schedule(step, self.config.pacing.correct_delay, events)
        } else {
            tracing::debug!(%stage, "wrong answer");
            self.feedback = Some(Feedback::Wrong {
                stage,
                correct_answer: correct.clone(),
            });
            let events = vec![QuizEvent::AnswerWrong {
                stage,
                correct_answer: correct,
            }];
            self.schedule(Step::AbandonCountry, self.config.pacing.wrong_delay, events)
        }
    }

    /// Run a scheduled step. Stale tickets are ignored.
    pub fn resume(&mut self, ticket: StepTicket) -> Result<Transition, QuizError> {
        if !self.accepts(&ticket) {
            return Ok(Transition::ignored());
        }
        match ticket.step {
            Step::AdvanceStage => self.advance_stage(),
            Step::CompleteQuestion => self.complete_question(),
            Step::AbandonCountry => self.abandon_country(),
            Step::FetchFact { .. } => {
                tracing::debug!("fact tickets are settled through deliver_fact");
                Ok(Transition::ignored())
            }
        }
    }

    /// Hand over the resolved fun fact for a [`Step::FetchFact`] ticket.
    pub fn deliver_fact(&mut self, ticket: StepTicket, fact: String) -> Transition {
        if !self.accepts(&ticket) {
            return Transition::ignored();
        }
        let Step::FetchFact { country } = ticket.step else {
            return Transition::ignored();
        };
        self.fun_fact = Some(fact);
        let events = vec![QuizEvent::FactReady { country }];
        self.schedule(Step::CompleteQuestion, self.config.pacing.fact_delay, events)
    }

    /// Advance the Blitz clock by one second.
    pub fn tick(&mut self) -> Transition {
        let Some(session) = self.session.as_mut() else {
            return Transition::ignored();
        };
        if session.mode != GameMode::Blitz
            || session.is_terminated()
            || session.remaining_seconds == 0
        {
            return Transition::ignored();
        }

        session.remaining_seconds -= 1;
        let mut events = vec![QuizEvent::TimerTick {
            remaining_seconds: session.remaining_seconds,
        }];
        if session.remaining_seconds == 0 {
            self.terminate(TerminationReason::TimeExpired, &mut events);
        }
        Transition { events, next: None }
    }

    fn accepts(&self, ticket: &StepTicket) -> bool {
        let live = self
            .session
            .as_ref()
            .is_some_and(|s| !s.is_terminated() && s.generation == ticket.generation);
        let accepted = live && self.pending.as_ref() == Some(&ticket.step);
        if !accepted {
            tracing::debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                step = ?ticket.step,
                "stale ticket ignored"
            );
        }
        accepted
    }

    fn schedule(&mut self, step: Step, delay: Duration, events: Vec<QuizEvent>) -> Transition {
        self.pending = Some(step.clone());
        Transition {
            events,
            next: Some(StepTicket {
                generation: self.generation,
                step,
                delay,
            }),
        }
    }

    fn issue_question(&mut self, level: u8, events: &mut Vec<QuizEvent>) -> Result<(), QuizError> {
        let candidates = self.dataset.in_tier(level);
        let country = candidates
            .choose(self.rng.as_mut())
            .map(|c| (*c).clone())
            .ok_or(QuizError::EmptyTier(level))?;
        let view = build_options(
            self.dataset.countries(),
            &country.name,
            Stage::Name,
            self.rng.as_mut(),
        )?;

        tracing::debug!(level, country = %country.name, "question issued");
        events.push(QuizEvent::FeedbackCleared);
        events.push(QuizEvent::QuestionIssued {
            level,
            iso_code: country.iso_code.clone(),
        });

        self.question = Some(view);
        self.feedback = None;
        self.fun_fact = None;
        if let Some(session) = self.session.as_mut() {
            session.active_country = Some(country);
            session.active_stage = Stage::Name;
        }
        Ok(())
    }

    fn advance_stage(&mut self) -> Result<Transition, QuizError> {
        self.pending = None;
        let Some(session) = self.session.as_mut() else {
            return Ok(Transition::ignored());
        };
        let (Some(next), Some(country)) = (session.active_stage.next(), &session.active_country)
        else {
            return Ok(Transition::ignored());
        };

        let view = build_options(
            self.dataset.countries(),
            country.answer_for(next),
            next,
            self.rng.as_mut(),
        )?;
        session.active_stage = next;
        self.question = Some(view);
        self.feedback = None;

        Ok(Transition {
            events: vec![
                QuizEvent::FeedbackCleared,
                QuizEvent::StageAdvanced { stage: next },
            ],
            next: None,
        })
    }

    fn complete_question(&mut self) -> Result<Transition, QuizError> {
        self.pending = None;
        let Some(session) = self.session.as_mut() else {
            return Ok(Transition::ignored());
        };

        session.questions_completed_in_level += 1;
        let completed = session.questions_completed_in_level;
        let mut events = vec![QuizEvent::QuestionCompleted {
            completed_in_level: completed,
        }];

        if completed < QUESTIONS_PER_LEVEL {
            let level = session.level;
            self.issue_question(level, &mut events)?;
        } else if session.level >= MAX_LEVEL {
            self.terminate(TerminationReason::Completed, &mut events);
        } else {
            session.level += 1;
            session.questions_completed_in_level = 0;
            let level = session.level;
            tracing::info!(level, score = session.score, "level up");
            events.push(QuizEvent::LevelUp { level });
            self.issue_question(level, &mut events)?;
        }

        Ok(Transition { events, next: None })
    }

    fn abandon_country(&mut self) -> Result<Transition, QuizError> {
        self.pending = None;
        let Some(session) = self.session.as_mut() else {
            return Ok(Transition::ignored());
        };

        let mut events = Vec::new();
        if self.config.wrong_answer == WrongAnswerPolicy::CountCapped {
            let capped = (session.questions_completed_in_level + 1).min(QUESTIONS_PER_LEVEL - 1);
            if capped != session.questions_completed_in_level {
                session.questions_completed_in_level = capped;
                events.push(QuizEvent::QuestionCompleted {
                    completed_in_level: capped,
                });
            }
        }

        let level = session.level;
        self.issue_question(level, &mut events)?;
        Ok(Transition { events, next: None })
    }

    fn terminate(&mut self, reason: TerminationReason, events: &mut Vec<QuizEvent>) {
        self.pending = None;
        if let Some(session) = self.session.as_mut() {
            session.termination = Some(reason);
            tracing::info!(
                ?reason,
                score = session.score,
                level = session.level,
                "session ended"
            );
        }
        events.push(QuizEvent::Terminated { reason });
    }
}
