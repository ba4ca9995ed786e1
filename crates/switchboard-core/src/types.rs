//! Shared types for routing requests across text-generation providers.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the external text-generation services the router knows about.
///
/// The set is closed: adding a provider means adding a variant here and an
/// adapter in `switchboard-runtime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// OpenAI chat completions
    OpenAi,
    /// Anthropic messages API
    Anthropic,
    /// Google Gemini generateContent
    Google,
    /// Hugging Face hosted inference (free tier, no key required)
    HuggingFace,
}

impl ProviderId {
    /// Every provider, in declaration order.
    pub const ALL: [ProviderId; 4] = [
        ProviderId::OpenAi,
        ProviderId::Anthropic,
        ProviderId::Google,
        ProviderId::HuggingFace,
    ];

    /// Stable lowercase identifier, used in logs, config keys and responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Google => "google",
            ProviderId::HuggingFace => "huggingface",
        }
    }

    /// Static confidence attached to every response from this provider.
    ///
    /// These are configuration constants, not measurements.
    pub fn default_confidence(&self) -> f64 {
        match self {
            ProviderId::OpenAi => 0.9,
            ProviderId::Anthropic => 0.95,
            ProviderId::Google => 0.85,
            ProviderId::HuggingFace => 0.7,
        }
    }

    /// Model requested when configuration does not name one.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "gpt-3.5-turbo",
            ProviderId::Anthropic => "claude-3-sonnet-20240229",
            ProviderId::Google => "gemini-pro",
            ProviderId::HuggingFace => "microsoft/DialoGPT-large",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn credential_env(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "OPENAI_API_KEY",
            ProviderId::Anthropic => "ANTHROPIC_API_KEY",
            ProviderId::Google => "GOOGLE_API_KEY",
            ProviderId::HuggingFace => "HUGGINGFACE_API_KEY",
        }
    }

    /// Whether the provider is left out of the registry when no key is set.
    pub fn requires_credential(&self) -> bool {
        !matches!(self, ProviderId::HuggingFace)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a provider name is not recognized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown provider '{0}' (expected one of: openai, anthropic, google, huggingface)")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAi),
            "anthropic" => Ok(ProviderId::Anthropic),
            "google" => Ok(ProviderId::Google),
            "huggingface" => Ok(ProviderId::HuggingFace),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Who produced a [`GenerationResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// A provider adapter returned usable content
    Provider(ProviderId),
    /// Every candidate failed; the canned responder answered
    Fallback,
}

impl ResponseSource {
    /// The provider, if a real provider answered.
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            ResponseSource::Provider(id) => Some(*id),
            ResponseSource::Fallback => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ResponseSource::Fallback)
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::Provider(id) => f.write_str(id.as_str()),
            ResponseSource::Fallback => f.write_str("fallback"),
        }
    }
}

impl Serialize for ResponseSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single routing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// The user's message, already checked to be non-blank by the caller
    pub message: String,

    /// Domain tag selecting the prompt template and fallback text
    pub domain_tag: String,

    /// Provider to try first, if registered
    pub preferred: Option<ProviderId>,
}

impl GenerationRequest {
    pub fn new(message: impl Into<String>, domain_tag: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            domain_tag: domain_tag.into(),
            preferred: None,
        }
    }

    /// Set the preferred provider.
    pub fn prefer(mut self, provider: ProviderId) -> Self {
        self.preferred = Some(provider);
        self
    }
}

/// Normalized result of one generation, from a provider or the fallback responder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResponse {
    /// Generated (or canned) text
    pub content: String,

    /// Provider that answered, or `fallback`
    #[serde(rename = "provider")]
    pub source: ResponseSource,

    /// Model name reported for this response
    pub model: String,

    /// Provider-reported token count, or an estimate of content character count / 4
    pub tokens_used: u32,

    /// Wall-clock duration of the provider call
    pub elapsed_secs: f64,

    /// Static per-provider quality constant (0.0 - 1.0)
    pub confidence: f64,
}

impl GenerationResponse {
    /// Whether the content carries anything other than whitespace.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Rough token estimate: ~4 characters per token.
pub fn estimate_tokens(text: &str) -> u32 {
    u32::try_from(text.chars().count() / 4).unwrap_or(u32::MAX)
}
