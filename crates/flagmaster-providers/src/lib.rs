//! flagmaster-providers: fun-fact provider integrations.
//!
//! Implements the `FunFactProvider` trait for Gemini, Anthropic and Ollama,
//! plus the configuration file and the factory that turns it into a
//! `FactResolver`.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod ollama;

pub use config::{
    build_resolver, create_provider, load_config_from, FlagmasterConfig, GameSettings,
    ProviderConfig,
};
pub use error::ProviderError;
