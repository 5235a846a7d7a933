//! Text rendering for the terminal game.

use comfy_table::{Cell, Table};

use flagmaster_core::engine::{Feedback, Snapshot};
use flagmaster_core::model::{
    GameMode, GameSession, TerminationReason, MAX_LEVEL, QUESTIONS_PER_LEVEL,
};
use flagmaster_core::QuizEvent;

pub fn menu() -> String {
    [
        "",
        "=== FLAGMASTER ===",
        "Identify the flag, then its capital, then its currency.",
        "",
        "  n  Normal mode  (clear all 10 levels)",
        "  b  Blitz mode   (60 seconds on the clock)",
        "  q  Quit",
        "",
    ]
    .join("\n")
}

fn status_line(session: &GameSession) -> String {
    let mut line = format!(
        "[{}] Level {}/{}  Score {}  Question {}/{}",
        session.mode(),
        session.level(),
        MAX_LEVEL,
        session.score(),
        session.questions_completed_in_level() + 1,
        QUESTIONS_PER_LEVEL
    );
    if session.mode() == GameMode::Blitz {
        line.push_str(&format!("  Time {}s", session.remaining_seconds()));
    }
    line
}

/// The active question with its numbered options.
pub fn question(snapshot: &Snapshot<'_>) -> String {
    let (Some(session), Some(question)) = (snapshot.session, snapshot.question) else {
        return String::new();
    };

    let mut out = format!("\n{}\n", status_line(session));
    if let Some(country) = session.active_country() {
        out.push_str(&format!("\n   {}   ", country.flag_emoji()));
        if question.stage != flagmaster_core::Stage::Name {
            out.push_str(&country.name);
        }
        out.push('\n');
    }
    out.push_str(&format!("\n{}\n", question.stage.label()));
    for (i, option) in question.options.iter().enumerate() {
        out.push_str(&format!("  {}) {option}\n", i + 1));
    }
    out.push_str("Answer 1-4, r restart, m menu, q quit");
    out
}

fn feedback(feedback: &Feedback) -> String {
    match feedback {
        Feedback::Correct { points, .. } => format!("{} +{points}", feedback.message()),
        Feedback::Wrong { .. } => feedback.message(),
    }
}

/// A one-line notice for an event, if it deserves one.
pub fn event(event: &QuizEvent, snapshot: &Snapshot<'_>) -> Option<String> {
    match event {
        QuizEvent::AnswerCorrect { .. } | QuizEvent::AnswerWrong { .. } => {
            snapshot.feedback.map(feedback)
        }
        QuizEvent::FactReady { country } => snapshot
            .fun_fact
            .map(|fact| format!("Fun fact about {country}: {fact}")),
        QuizEvent::LevelUp { level } => Some(format!("*** Level up! Welcome to level {level} ***")),
        QuizEvent::TimerTick { remaining_seconds }
            if *remaining_seconds > 0
                && (*remaining_seconds <= 5 || remaining_seconds % 10 == 0) =>
        {
            Some(format!("{remaining_seconds}s left"))
        }
        QuizEvent::Terminated { reason } => snapshot.session.map(|s| summary(s, *reason)),
        QuizEvent::ReturnedToMenu => Some(menu()),
        _ => None,
    }
}

/// Whether the question screen should be redrawn after these events.
pub fn needs_question(events: &[QuizEvent]) -> bool {
    events.iter().any(|e| {
        matches!(
            e,
            QuizEvent::QuestionIssued { .. } | QuizEvent::StageAdvanced { .. }
        )
    })
}

/// The game-over table.
pub fn summary(session: &GameSession, reason: TerminationReason) -> String {
    let headline = match reason {
        TerminationReason::Completed => "You conquered all ten levels!",
        TerminationReason::TimeExpired => "Time's up!",
    };

    let mut table = Table::new();
    table.set_header(vec!["Mode", "Final score", "Level reached"]);
    table.add_row(vec![
        Cell::new(session.mode()),
        Cell::new(session.score()),
        Cell::new(session.level()),
    ]);

    format!("\nGAME OVER. {headline}\n{table}\nr play again, m menu, q quit")
}
