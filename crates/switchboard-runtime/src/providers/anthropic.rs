//! Anthropic Claude messages adapter.
//!
//! ## Security
//!
//! The key is held as an [`ApiCredential`] and sent only in the
//! `x-api-key` header. See the [`secrets`](super::secrets) module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use switchboard_core::{Domain, GenerationResponse, ProviderId, ResponseSource};

use super::{
    factory::ProviderFactory, http, secrets::ApiCredential, AdapterConfig, ProviderError,
    TextProvider,
};
use crate::config::ProviderSettings;

/// API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    credential: ApiCredential,
    config: AdapterConfig,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("credential", &self.credential)
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(credential: ApiCredential, config: AdapterConfig) -> Self {
        Self { credential, config }
    }

    /// Build from settings.
    ///
    /// Checks `api_key` in the settings first, then `ANTHROPIC_API_KEY`
    /// (or the variable named by `api_key_env`).
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let id = ProviderId::Anthropic;
        let credential = ApiCredential::resolve(
            settings.api_key.as_deref(),
            settings.credential_env(id),
            "Anthropic API key",
        )?;
        Ok(Self::new(credential, settings.resolve(id)))
    }
}

/// Anthropic API request format.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Anthropic API response format.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait]
impl TextProvider for AnthropicProvider {
    async fn generate(
        &self,
        prompt: &str,
        _domain: Domain,
    ) -> Result<GenerationResponse, ProviderError> {
        let started = Instant::now();

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        // SECURITY: Only expose the credential here, at the point of use
        let builder = http::client()
            .post(format!("{}/messages", self.config.base_url))
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", ANTHROPIC_VERSION);

        let body: MessagesResponse = http::post_json(builder, &request, self.config.timeout).await?;

        let content = body
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("response has no content blocks".to_string()))?
            .text
            .ok_or_else(|| ProviderError::Parse("first content block has no text".to_string()))?;

        Ok(GenerationResponse {
            content,
            source: ResponseSource::Provider(ProviderId::Anthropic),
            model: self.config.model.clone(),
            tokens_used: body.usage.input_tokens.saturating_add(body.usage.output_tokens),
            elapsed_secs: started.elapsed().as_secs_f64(),
            confidence: self.config.confidence,
        })
    }

    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Factory for Anthropic adapters.
///
/// ## Configuration Format
/// ```yaml
/// anthropic:
///   api_key: sk-ant-...          # Optional, falls back to ANTHROPIC_API_KEY
///   base_url: https://...        # Optional, custom API endpoint
///   model: claude-3-sonnet-20240229
/// ```
pub struct AnthropicProviderFactory;

impl ProviderFactory for AnthropicProviderFactory {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn create(&self, settings: &ProviderSettings) -> Result<Arc<dyn TextProvider>, ProviderError> {
        Ok(Arc::new(AnthropicProvider::from_settings(settings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::CredentialSource;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> AnthropicProvider {
        AnthropicProvider::new(
            ApiCredential::new("sk-ant-test", CredentialSource::Programmatic, "Anthropic API key"),
            AdapterConfig::for_provider(ProviderId::Anthropic).with_base_url(server.uri()),
        )
    }

    #[tokio::test]
    async fn test_generate_sums_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({
                "model": "claude-3-sonnet-20240229",
                "max_tokens": 1000,
                "messages": [{"role": "user", "content": "Topic: tea"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "model": "claude-3-sonnet-20240229",
                "content": [{"type": "text", "text": "Tea is a drink."}],
                "usage": {"input_tokens": 12, "output_tokens": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server)
            .generate("Topic: tea", Domain::Dialogue)
            .await
            .unwrap();

        assert_eq!(response.content, "Tea is a drink.");
        assert_eq!(response.source.to_string(), "anthropic");
        assert_eq!(response.tokens_used, 17);
        assert_eq!(response.confidence, 0.95);
    }

    #[tokio::test]
    async fn test_missing_usage_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "hi"}]
            })))
            .mount(&server)
            .await;

        let err = provider(&server).generate("hi", Domain::General).await.unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_overloaded_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_json(json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server).generate("hi", Domain::General).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 529, .. }));
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret = "sk-ant-REDACTED";
        let provider = AnthropicProvider::new(
            ApiCredential::new(secret, CredentialSource::Programmatic, "Anthropic API key"),
            AdapterConfig::for_provider(ProviderId::Anthropic),
        );

        let debug_output = format!("{:?}", provider);
        assert!(
            !debug_output.contains(secret),
            "API key was exposed in Debug output!"
        );
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should show [REDACTED]"
        );
    }

    #[test]
    fn test_credential_source_is_tracked() {
        let settings = ProviderSettings {
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let provider = AnthropicProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.credential.source(), CredentialSource::Config);
    }

    #[test]
    fn test_settings_override_model_and_url() {
        let settings = ProviderSettings {
            api_key: Some("key".to_string()),
            model: Some("claude-3-haiku-20240307".to_string()),
            base_url: Some("https://proxy.internal/v1".to_string()),
            ..Default::default()
        };
        let provider = AnthropicProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.model(), "claude-3-haiku-20240307");
        assert_eq!(provider.config.base_url, "https://proxy.internal/v1");
    }
}
