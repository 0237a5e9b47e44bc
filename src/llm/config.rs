//! Model provider configuration

use super::{GeminiService, LlmError, LlmService, LoggingService};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for the hosted model
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub google_api_key: Option<String>,
    /// Optional LLM gateway base URL; when set the key is not required
    pub gateway: Option<String>,
    pub model: String,
    /// Transport-level deadline for a single request
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            gateway: None,
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            google_api_key: non_empty("GOOGLE_API_KEY"),
            gateway: non_empty("LLM_GATEWAY"),
            model: non_empty("BARISTA_MODEL").unwrap_or(defaults.model),
            request_timeout: non_empty("BARISTA_MODEL_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map_or(defaults.request_timeout, Duration::from_secs),
        }
    }

    /// Build the logging-wrapped Gemini service.
    ///
    /// Fails with an auth error when neither a key nor a gateway is set.
    pub fn build_service(&self) -> Result<Arc<dyn LlmService>, LlmError> {
        if self.google_api_key.is_none() && self.gateway.is_none() {
            return Err(LlmError::auth(
                "No model credentials configured. Set GOOGLE_API_KEY or LLM_GATEWAY.",
            ));
        }

        let service = GeminiService::new(
            self.google_api_key.clone(),
            &self.model,
            self.gateway.as_deref(),
            self.request_timeout,
        )?;
        Ok(Arc::new(LoggingService::new(Arc::new(service))))
    }
}
