//! The `flagmaster play` command.
//!
//! One task owns the engine and multiplexes player input, the scheduled step
//! timer, the in-flight fun-fact fetch and the Blitz clock.

use std::future::pending;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, Interval};

use flagmaster_core::engine::{Step, StepTicket, Transition};
use flagmaster_core::model::{GameMode, Phase};
use flagmaster_core::random::game_rng;
use flagmaster_core::{FactResolver, QuizEngine, QuizEvent};
use flagmaster_providers::{build_resolver, load_config_from};

use super::load_dataset;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Answer(usize),
    Start(GameMode),
    Restart,
    Menu,
    Quit,
    Unknown,
}

fn parse_command(input: &str, phase: Phase) -> Command {
    let input = input.trim().to_lowercase();
    match (phase, input.as_str()) {
        (_, "q" | "quit") => Command::Quit,
        (Phase::Menu, other) => other
            .parse::<GameMode>()
            .map(Command::Start)
            .unwrap_or(Command::Unknown),
        (_, "r") => Command::Restart,
        (_, "m") => Command::Menu,
        (Phase::InProgress, other) => match other.parse::<usize>() {
            Ok(n @ 1..=4) => Command::Answer(n - 1),
            _ => Command::Unknown,
        },
        _ => Command::Unknown,
    }
}

struct Scheduled {
    at: Instant,
    ticket: StepTicket,
}

struct PendingFact {
    ticket: StepTicket,
    handle: JoinHandle<String>,
}

struct Game {
    engine: QuizEngine,
    resolver: FactResolver,
    mode: GameMode,
    timer: Option<Scheduled>,
    fetch: Option<PendingFact>,
    ticker: Option<Interval>,
}

impl Game {
    fn new(engine: QuizEngine, resolver: FactResolver) -> Self {
        Self {
            engine,
            resolver,
            mode: GameMode::Normal,
            timer: None,
            fetch: None,
            ticker: None,
        }
    }

    fn start(&mut self, mode: GameMode) -> Result<()> {
        self.cancel_pending();
        self.mode = mode;
        let transition = self.engine.start_session(mode)?;
        self.ticker = match mode {
            GameMode::Blitz => {
                let second = Duration::from_secs(1);
                Some(interval_at(Instant::now() + second, second))
            }
            GameMode::Normal => None,
        };
        self.apply(transition);
        Ok(())
    }

    fn menu(&mut self) {
        self.cancel_pending();
        let transition = self.engine.reset_to_menu();
        self.apply(transition);
    }

    fn answer(&mut self, index: usize) {
        let Some(option) = self
            .engine
            .question()
            .and_then(|q| q.option(index))
            .map(str::to_string)
        else {
            return;
        };
        let transition = self.engine.submit_answer(&option);
        self.apply(transition);
    }

    fn on_timer(&mut self, ticket: StepTicket) -> Result<()> {
        let fetch_for = match ticket.step() {
            Step::FetchFact { country } => Some(country.clone()),
            _ => None,
        };

        match fetch_for {
            Some(country) => {
                println!("Fetching a fun fact about {country}...");
                let resolver = self.resolver.clone();
                let handle = tokio::spawn(async move { resolver.resolve(&country).await });
                self.fetch = Some(PendingFact { ticket, handle });
            }
            None => {
                let transition = self.engine.resume(ticket)?;
                self.apply(transition);
            }
        }
        Ok(())
    }

    fn on_fact(&mut self, fact: String) {
        if let Some(pending) = self.fetch.take() {
            let transition = self.engine.deliver_fact(pending.ticket, fact);
            self.apply(transition);
        }
    }

    fn on_tick(&mut self) {
        let transition = self.engine.tick();
        self.apply(transition);
    }

    /// Returns `false` when the player quits.
    fn handle_line(&mut self, line: &str) -> Result<bool> {
        match parse_command(line, self.engine.phase()) {
            Command::Quit => return Ok(false),
            Command::Start(mode) => self.start(mode)?,
            Command::Restart => {
                let mode = self.mode;
                self.start(mode)?;
            }
            Command::Menu => self.menu(),
            Command::Answer(index) => self.answer(index),
            Command::Unknown => {
                if !line.trim().is_empty() {
                    println!("Unrecognised input: {}", line.trim());
                }
            }
        }
        Ok(true)
    }

    fn apply(&mut self, transition: Transition) {
        let snapshot = self.engine.snapshot();
        for event in &transition.events {
            if let Some(line) = render::event(event, &snapshot) {
                println!("{line}");
            }
        }
        if render::needs_question(&transition.events) {
            println!("{}", render::question(&snapshot));
        }

        let terminated = transition
            .events
            .iter()
            .any(|e| matches!(e, QuizEvent::Terminated { .. }));
        if terminated {
            self.ticker = None;
            self.cancel_pending();
        }

        if let Some(ticket) = transition.next {
            self.timer = Some(Scheduled {
                at: Instant::now() + ticket.delay(),
                ticket,
            });
        }
    }

    fn cancel_pending(&mut self) {
        self.timer = None;
        if let Some(pending) = self.fetch.take() {
            pending.handle.abort();
        }
    }
}

async fn wait_for(timer: &Option<Scheduled>) {
    match timer {
        Some(scheduled) => sleep_until(scheduled.at).await,
        None => pending().await,
    }
}

async fn join_fact(fetch: &mut Option<PendingFact>, fallback: &str) -> String {
    match fetch {
        Some(pending) => (&mut pending.handle).await.unwrap_or_else(|e| {
            tracing::warn!("fun fact task failed: {e}");
            fallback.to_string()
        }),
        None => pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}

/// Forward stdin lines from a plain thread, so quitting never waits on a
/// blocked read.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run the game until the player quits or input closes.
async fn drive(game: &mut Game, input: &mut mpsc::UnboundedReceiver<String>) -> Result<()> {
    loop {
        tokio::select! {
            line = input.recv() => match line {
                Some(line) => {
                    if !game.handle_line(&line)? {
                        return Ok(());
                    }
                }
                None => return Ok(()),
            },
            () = wait_for(&game.timer) => {
                if let Some(scheduled) = game.timer.take() {
                    game.on_timer(scheduled.ticket)?;
                }
            }
            fact = join_fact(&mut game.fetch, game.resolver.fallback()) => game.on_fact(fact),
            () = next_tick(&mut game.ticker) => game.on_tick(),
        }
    }
}

pub async fn execute(
    mode: Option<GameMode>,
    dataset_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    offline: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let dataset = load_dataset(dataset_path.as_deref())?;
    let resolver = build_resolver(&config, offline)?;
    let engine = QuizEngine::new(dataset, game_rng(seed), config.game.engine_config())
        .context("dataset cannot be played")?;
    tracing::info!(
        provider = %config.default_provider,
        offline = resolver.is_offline(),
        "starting game"
    );

    let mut game = Game::new(engine, resolver);
    match mode {
        Some(mode) => game.start(mode)?,
        None => println!("{}", render::menu()),
    }

    let mut input = spawn_stdin_reader();
    drive(&mut game, &mut input).await?;

    game.cancel_pending();
    println!("Thanks for playing!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagmaster_core::engine::{EngineConfig, Pacing};
    use flagmaster_core::facts::DEFAULT_FALLBACK_FACT;
    use flagmaster_core::model::{Stage, TerminationReason, BLITZ_DURATION_SECS};
    use flagmaster_core::Dataset;
    use tokio::time::timeout;

    fn game_with(pacing: Pacing) -> Game {
        let config = EngineConfig {
            pacing,
            ..EngineConfig::default()
        };
        let engine =
            QuizEngine::new(Dataset::builtin().unwrap(), game_rng(Some(11)), config)
                .unwrap();
        Game::new(engine, FactResolver::offline())
    }

    fn game() -> Game {
        game_with(Pacing::immediate())
    }

    /// Drive the loop for `span` of virtual time, then stop it.
    async fn run_for(
        game: &mut Game,
        input: &mut mpsc::UnboundedReceiver<String>,
        span: Duration,
    ) {
        let outcome = timeout(span, drive(game, input)).await;
        assert!(outcome.is_err(), "driver stopped before {span:?}");
    }

    fn correct_index(game: &Game) -> usize {
        let question = game.engine.question().unwrap();
        question
            .options
            .iter()
            .position(|o| *o == question.correct_answer)
            .unwrap()
    }

    #[test]
    fn commands_depend_on_phase() {
        assert_eq!(parse_command("b", Phase::Menu), Command::Start(GameMode::Blitz));
        assert_eq!(
            parse_command(" Normal ", Phase::Menu),
            Command::Start(GameMode::Normal)
        );
        assert_eq!(parse_command("1", Phase::Menu), Command::Unknown);
        assert_eq!(parse_command("Q", Phase::Menu), Command::Quit);

        assert_eq!(parse_command("1", Phase::InProgress), Command::Answer(0));
        assert_eq!(parse_command("4", Phase::InProgress), Command::Answer(3));
        assert_eq!(parse_command("5", Phase::InProgress), Command::Unknown);
        assert_eq!(parse_command("r", Phase::InProgress), Command::Restart);
        assert_eq!(parse_command("m", Phase::InProgress), Command::Menu);

        assert_eq!(parse_command("2", Phase::Terminated), Command::Unknown);
        assert_eq!(parse_command("r", Phase::Terminated), Command::Restart);
    }

    #[tokio::test]
    async fn currency_answer_fetches_then_completes() {
        let mut game = game();
        game.start(GameMode::Normal).unwrap();

        for _ in 0..3 {
            let index = correct_index(&game);
            game.answer(index);
            let scheduled = game.timer.take().unwrap();
            game.on_timer(scheduled.ticket).unwrap();
        }
        assert!(game.fetch.is_some());

        let fact = join_fact(&mut game.fetch, "unused").await;
        assert_eq!(fact, DEFAULT_FALLBACK_FACT);
        game.on_fact(fact);

        let scheduled = game.timer.take().unwrap();
        game.on_timer(scheduled.ticket).unwrap();
        let session = game.engine.session().unwrap();
        assert_eq!(session.score(), 60);
        assert_eq!(session.questions_completed_in_level(), 1);
    }

    #[tokio::test]
    async fn restart_drops_pending_work() {
        let mut game = game();
        game.start(GameMode::Normal).unwrap();
        let index = correct_index(&game);
        game.answer(index);
        assert!(game.timer.is_some());

        assert!(game.handle_line("r").unwrap());
        assert!(game.timer.is_none());
        assert!(game.fetch.is_none());
        assert_eq!(game.engine.session().unwrap().score(), 0);

        assert!(game.handle_line("m").unwrap());
        assert_eq!(game.engine.phase(), Phase::Menu);
        assert!(game.handle_line("b").unwrap());
        assert!(game.ticker.is_some());
        assert!(!game.handle_line("q").unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn blitz_clock_ends_the_game() {
        let mut game = game_with(Pacing::default());
        game.start(GameMode::Blitz).unwrap();
        let (_tx, mut input) = mpsc::unbounded_channel();

        run_for(&mut game, &mut input, Duration::from_millis(30_500)).await;
        let session = game.engine.session().unwrap();
        assert_eq!(session.remaining_seconds(), BLITZ_DURATION_SECS - 30);
        assert!(!session.is_terminated());

        run_for(&mut game, &mut input, Duration::from_secs(31)).await;
        let session = game.engine.session().unwrap();
        assert_eq!(session.remaining_seconds(), 0);
        assert_eq!(session.termination(), Some(TerminationReason::TimeExpired));
        assert!(game.ticker.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn correct_answer_advances_after_the_pause() {
        let mut game = game_with(Pacing::default());
        game.start(GameMode::Normal).unwrap();
        let delay = game.engine.config().pacing.correct_delay;
        let (tx, mut input) = mpsc::unbounded_channel();

        tx.send((correct_index(&game) + 1).to_string()).unwrap();
        run_for(&mut game, &mut input, delay - Duration::from_millis(1)).await;
        let session = game.engine.session().unwrap();
        assert_eq!(session.score(), 10);
        assert_eq!(session.active_stage(), Stage::Name);
        assert!(game.timer.is_some());

        run_for(&mut game, &mut input, Duration::from_millis(2)).await;
        assert_eq!(game.engine.session().unwrap().active_stage(), Stage::Capital);
        assert!(game.timer.is_none());
        assert!(game.engine.feedback().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn fun_fact_shows_before_the_next_country() {
        let mut game = game_with(Pacing::default());
        game.start(GameMode::Normal).unwrap();
        let pacing = game.engine.config().pacing;
        let step = pacing.correct_delay + Duration::from_millis(1);
        let (tx, mut input) = mpsc::unbounded_channel();

        for _ in 0..3 {
            tx.send((correct_index(&game) + 1).to_string()).unwrap();
            run_for(&mut game, &mut input, step).await;
        }
        assert!(game.fetch.is_none());
        assert_eq!(game.engine.fun_fact(), Some(DEFAULT_FALLBACK_FACT));
        assert_eq!(game.engine.session().unwrap().questions_completed_in_level(), 0);

        run_for(&mut game, &mut input, pacing.fact_delay).await;
        let session = game.engine.session().unwrap();
        assert_eq!(session.score(), 60);
        assert_eq!(session.questions_completed_in_level(), 1);
        assert_eq!(session.active_stage(), Stage::Name);
        assert!(game.engine.fun_fact().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn quit_and_closed_input_stop_the_driver() {
        let mut game = game_with(Pacing::default());
        game.start(GameMode::Blitz).unwrap();
        let (tx, mut input) = mpsc::unbounded_channel();
        tx.send("q".to_string()).unwrap();
        drive(&mut game, &mut input).await.unwrap();
        assert_eq!(game.engine.session().unwrap().remaining_seconds(), BLITZ_DURATION_SECS);

        drop(tx);
        drive(&mut game, &mut input).await.unwrap();
    }
}
