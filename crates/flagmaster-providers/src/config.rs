//! Configuration loading and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use flagmaster_core::engine::{EngineConfig, Pacing, WrongAnswerPolicy};
use flagmaster_core::facts::{FactResolver, DEFAULT_FALLBACK_FACT};
use flagmaster_core::traits::FunFactProvider;

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;
use crate::ollama::OllamaProvider;

/// Configuration for a single fun-fact provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl ProviderConfig {
    /// Whether the provider can be called at all.
    fn has_credentials(&self) -> bool {
        match self {
            ProviderConfig::Gemini { api_key, .. } | ProviderConfig::Anthropic { api_key, .. } => {
                !api_key.trim().is_empty()
            }
            ProviderConfig::Ollama { .. } => true,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// The `[game]` section: pacing and progression rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default)]
    pub wrong_answer: WrongAnswerPolicy,
    #[serde(default = "default_correct_delay")]
    pub correct_delay_ms: u64,
    #[serde(default = "default_wrong_delay")]
    pub wrong_delay_ms: u64,
    #[serde(default = "default_fact_delay")]
    pub fact_delay_ms: u64,
}

fn default_correct_delay() -> u64 {
    800
}
fn default_wrong_delay() -> u64 {
    2000
}
fn default_fact_delay() -> u64 {
    4000
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            wrong_answer: WrongAnswerPolicy::default(),
            correct_delay_ms: default_correct_delay(),
            wrong_delay_ms: default_wrong_delay(),
            fact_delay_ms: default_fact_delay(),
        }
    }
}

impl GameSettings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            pacing: Pacing {
                correct_delay: Duration::from_millis(self.correct_delay_ms),
                wrong_delay: Duration::from_millis(self.wrong_delay_ms),
                fact_delay: Duration::from_millis(self.fact_delay_ms),
            },
            wrong_answer: self.wrong_answer,
        }
    }
}

/// Top-level flagmaster configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagmasterConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider asked for fun facts.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model passed to that provider.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Give up on a fun fact after this many seconds.
    #[serde(default = "default_fact_timeout")]
    pub fact_timeout_secs: u64,
    /// Shown when the fact cannot be fetched.
    #[serde(default = "default_fallback_fact")]
    pub fallback_fact: String,
    #[serde(default)]
    pub game: GameSettings,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_fact_timeout() -> u64 {
    15
}
fn default_fallback_fact() -> String {
    DEFAULT_FALLBACK_FACT.to_string()
}

impl Default for FlagmasterConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            fact_timeout_secs: default_fact_timeout(),
            fallback_fact: default_fallback_fact(),
            game: GameSettings::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    expand_vars(s, |name| std::env::var(name).ok())
}

/// Substituted values are copied verbatim and never expanded again.
fn expand_vars(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&lookup(&rest[start + 2..start + end]).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Apply `FLAGMASTER_GEMINI_KEY` / `FLAGMASTER_ANTHROPIC_KEY` style overrides.
fn apply_key_overrides(config: &mut FlagmasterConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup("FLAGMASTER_GEMINI_KEY") {
        match config.providers.get_mut("gemini") {
            Some(ProviderConfig::Gemini { api_key, .. }) => *api_key = key,
            _ => {
                config.providers.insert(
                    "gemini".into(),
                    ProviderConfig::Gemini {
                        api_key: key,
                        base_url: None,
                    },
                );
            }
        }
    }

    if let Some(key) = lookup("FLAGMASTER_ANTHROPIC_KEY") {
        match config.providers.get_mut("anthropic") {
            Some(ProviderConfig::Anthropic { api_key, .. }) => *api_key = key,
            _ => {
                config.providers.insert(
                    "anthropic".into(),
                    ProviderConfig::Anthropic {
                        api_key: key,
                        base_url: None,
                    },
                );
            }
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `flagmaster.toml` in the current directory
/// 2. `~/.config/flagmaster/config.toml`
///
/// Environment variable overrides: `FLAGMASTER_GEMINI_KEY`, `FLAGMASTER_ANTHROPIC_KEY`.
pub fn load_config_from(path: Option<&Path>) -> Result<FlagmasterConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("flagmaster.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config_file(&path)?
        }
        None => FlagmasterConfig::default(),
    };

    apply_key_overrides(&mut config, |name| std::env::var(name).ok());

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<FlagmasterConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<FlagmasterConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("flagmaster"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn FunFactProvider>> {
    let provider: Box<dyn FunFactProvider> = match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Box::new(GeminiProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::Anthropic { api_key, base_url } => {
            Box::new(AnthropicProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::Ollama { base_url } => Box::new(OllamaProvider::new(base_url)?),
    };
    Ok(provider)
}

/// Build the fun-fact resolver the game will use.
///
/// Falls back to an offline resolver when `offline` is set, the default
/// provider is not configured, or its API key is empty.
pub fn build_resolver(config: &FlagmasterConfig, offline: bool) -> Result<FactResolver> {
    let offline_resolver = || FactResolver::offline().with_fallback(config.fallback_fact.clone());

    if offline {
        return Ok(offline_resolver());
    }

    let Some(provider_config) = config.providers.get(&config.default_provider) else {
        tracing::warn!(
            provider = %config.default_provider,
            "provider not configured, fun facts disabled"
        );
        return Ok(offline_resolver());
    };
    if !provider_config.has_credentials() {
        tracing::warn!(
            provider = %config.default_provider,
            "no API key set, fun facts disabled"
        );
        return Ok(offline_resolver());
    }

    let provider = create_provider(provider_config).with_context(|| {
        format!("failed to create provider '{}'", config.default_provider)
    })?;
    let mut resolver = FactResolver::new(Arc::from(provider), config.default_model.clone())
        .with_fallback(config.fallback_fact.clone());
    if config.fact_timeout_secs > 0 {
        resolver = resolver.with_timeout(Duration::from_secs(config.fact_timeout_secs));
    }
    Ok(resolver)
}
