//! Text-generation provider adapters.
//!
//! Each adapter wraps one external HTTP endpoint and normalizes its reply
//! into a [`GenerationResponse`]. Adapters make exactly one call per
//! `generate`, enforce their own timeout, and never retry: moving on to
//! another provider is the router's job.
//!
//! ## Security
//!
//! All adapters hold their key as an [`ApiCredential`], which redacts itself
//! in `Debug`/`Display`. See the [`secrets`] module.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use switchboard_core::{estimate_tokens, Domain, GenerationResponse, ProviderId};

mod anthropic;
mod factory;
mod google;
mod http;
mod huggingface;
mod openai;
pub mod secrets;

pub use anthropic::{AnthropicProvider, AnthropicProviderFactory};
pub use factory::{default_factories, ProviderFactory, ProviderRegistry};
pub use google::{GoogleProvider, GoogleProviderFactory};
pub use huggingface::{HuggingFaceProvider, HuggingFaceProviderFactory};
pub use openai::{OpenAiProvider, OpenAiProviderFactory};
pub use secrets::{ApiCredential, CredentialSource};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default generation length cap.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Errors from provider calls.
///
/// The router treats every variant the same way (record it, try the next
/// provider); the distinction exists for logs and tests.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Resolved per-adapter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    /// Model requested from the provider
    pub model: String,

    /// API root, without trailing slash
    pub base_url: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-call timeout
    pub timeout: Duration,

    /// Confidence stamped on every response
    pub confidence: f64,
}

impl AdapterConfig {
    /// Defaults for a provider.
    pub fn for_provider(id: ProviderId) -> Self {
        Self {
            model: id.default_model().to_string(),
            base_url: default_base_url(id).to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            confidence: id.default_confidence(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Public API root for a provider.
pub fn default_base_url(id: ProviderId) -> &'static str {
    match id {
        ProviderId::OpenAi => "https://api.openai.com/v1",
        ProviderId::Anthropic => "https://api.anthropic.com/v1",
        ProviderId::Google => "https://generativelanguage.googleapis.com/v1beta",
        ProviderId::HuggingFace => "https://api-inference.huggingface.co",
    }
}

/// A text-generation backend.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a reply to a fully built prompt.
    ///
    /// Empty but well-formed content is returned as `Ok`; deciding whether
    /// that counts as usable is left to the caller.
    async fn generate(
        &self,
        prompt: &str,
        domain: Domain,
    ) -> Result<GenerationResponse, ProviderError>;

    /// Which provider this adapter talks to.
    fn id(&self) -> ProviderId;

    /// Model name reported on responses.
    fn model(&self) -> &str;

    /// Estimate tokens for text the provider does not count for us.
    fn estimate_tokens(&self, text: &str) -> u32 {
        estimate_tokens(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_config_defaults() {
        let config = AdapterConfig::for_provider(ProviderId::Anthropic);
        assert_eq!(config.model, "claude-3-sonnet-20240229");
        assert_eq!(config.base_url, "https://api.anthropic.com/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.confidence, 0.95);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config =
            AdapterConfig::for_provider(ProviderId::OpenAi).with_base_url("http://localhost:8080/");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_error_messages_carry_cause() {
        let err = ProviderError::Api {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - overloaded");
        assert!(ProviderError::Timeout(Duration::from_secs(30))
            .to_string()
            .contains("30s"));
    }
}
