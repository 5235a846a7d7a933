//! Fail-soft fun-fact resolution.
//!
//! Wraps an optional [`FunFactProvider`] so that a missing provider, an error,
//! a timeout or an empty reply all turn into displayable text.

use std::sync::Arc;
use std::time::Duration;

use crate::traits::{FactRequest, FunFactProvider};

/// Shown when the provider fails or none is configured.
pub const DEFAULT_FALLBACK_FACT: &str = "This country has a rich and unique history!";

/// Shown when the provider answers with nothing.
pub const EMPTY_FACT: &str = "No fact available at the moment.";

/// Resolves fun facts without ever failing.
#[derive(Clone)]
pub struct FactResolver {
    provider: Option<Arc<dyn FunFactProvider>>,
    model: String,
    fallback: String,
    timeout: Option<Duration>,
}

impl FactResolver {
    pub fn new(provider: Arc<dyn FunFactProvider>, model: impl Into<String>) -> Self {
        Self {
            provider: Some(provider),
            model: model.into(),
            fallback: DEFAULT_FALLBACK_FACT.to_string(),
            timeout: None,
        }
    }

    /// A resolver that never calls out and always answers with the fallback.
    pub fn offline() -> Self {
        Self {
            provider: None,
            model: String::new(),
            fallback: DEFAULT_FALLBACK_FACT.to_string(),
            timeout: None,
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Give up on the provider after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn is_offline(&self) -> bool {
        self.provider.is_none()
    }

    /// Fetch a fun fact about `country`, substituting text on any failure.
    pub async fn resolve(&self, country: &str) -> String {
        let Some(provider) = &self.provider else {
            return self.fallback.clone();
        };

        let request = FactRequest::for_country(&self.model, country);
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, provider.fun_fact(&request)).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "fun fact request timed out after {}s",
                    limit.as_secs()
                )),
            },
            None => provider.fun_fact(&request).await,
        };

        match outcome {
            Ok(text) if text.trim().is_empty() => EMPTY_FACT.to_string(),
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    country,
                    "fun fact fetch failed: {e:#}"
                );
                self.fallback.clone()
            }
        }
    }
}
