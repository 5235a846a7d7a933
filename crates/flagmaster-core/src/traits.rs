//! Core trait definitions for fun-fact providers.
//!
//! The async trait is implemented by the `flagmaster-providers` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for text-generation backends that produce a fun fact about a country.
#[async_trait]
pub trait FunFactProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate a fun fact for the request.
    async fn fun_fact(&self, request: &FactRequest) -> anyhow::Result<String>;
}

/// Request for a single fun fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactRequest {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// Country the fact is about.
    pub country: String,
    /// The full prompt sent to the model.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

impl FactRequest {
    /// The standard one-sentence fun fact request.
    pub fn for_country(model: &str, country: &str) -> Self {
        Self {
            model: model.to_string(),
            country: country.to_string(),
            prompt: fun_fact_prompt(country),
            max_tokens: DEFAULT_FACT_MAX_TOKENS,
            temperature: DEFAULT_FACT_TEMPERATURE,
        }
    }
}

/// Token budget for one sentence.
pub const DEFAULT_FACT_MAX_TOKENS: u32 = 128;

pub const DEFAULT_FACT_TEMPERATURE: f64 = 0.9;

/// Build the prompt asking for a fun fact about `country`.
pub fn fun_fact_prompt(country: &str) -> String {
    format!(
        "Give me a single, very interesting, one-sentence fun fact about the country {country}. Keep it brief and engaging."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_embeds_country_in_prompt() {
        let request = FactRequest::for_country("gemini-2.5-flash", "Bhutan");
        assert_eq!(request.country, "Bhutan");
        assert!(request.prompt.contains("the country Bhutan"));
        assert_eq!(request.max_tokens, DEFAULT_FACT_MAX_TOKENS);
    }
}
