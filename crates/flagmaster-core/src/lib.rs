//! flagmaster-core: Quiz engine, data model, and dataset loading.
//!
//! This crate defines the country data model, the option generator, and the
//! progression state machine that every flagmaster front-end drives.

pub mod dataset;
pub mod engine;
pub mod error;
pub mod facts;
pub mod model;
pub mod options;
pub mod random;
pub mod traits;

pub use dataset::Dataset;
pub use engine::{EngineConfig, QuizEngine, QuizEvent, StepTicket, Transition};
pub use error::QuizError;
pub use facts::FactResolver;
pub use model::{CountryRecord, GameMode, GameSession, Stage};
