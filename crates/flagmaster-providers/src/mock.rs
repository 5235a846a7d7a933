//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use flagmaster_core::traits::{FactRequest, FunFactProvider};

use crate::error::ProviderError;

/// A mock fun-fact provider for exercising the game without real API calls.
///
/// Replies are looked up by country name, falling back to a default reply.
pub struct MockFactProvider {
    /// Map of country → reply.
    responses: HashMap<String, String>,
    /// Reply for countries not in the map. `None` makes every call fail.
    default_response: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<FactRequest>>,
}

impl MockFactProvider {
    /// Create a mock with the given country → reply mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: Some("is a wonderful place to visit.".to_string()),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: Some(response.to_string()),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock whose every call fails.
    pub fn failing() -> Self {
        Self {
            responses: HashMap::new(),
            default_response: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<FactRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl FunFactProvider for MockFactProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fun_fact(&self, request: &FactRequest) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        if let Some(reply) = self.responses.get(&request.country) {
            return Ok(reply.clone());
        }
        match &self.default_response {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProviderError::ApiError {
                status: 503,
                message: "mock provider is unavailable".into(),
            }
            .into()),
        }
    }
}
