//! OpenAI chat completions adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use switchboard_core::{Domain, GenerationResponse, ProviderId, ResponseSource, SYSTEM_INSTRUCTION};

use super::{
    factory::ProviderFactory, http, secrets::ApiCredential, AdapterConfig, ProviderError,
    TextProvider,
};
use crate::config::ProviderSettings;

/// OpenAI provider.
pub struct OpenAiProvider {
    credential: ApiCredential,
    config: AdapterConfig,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("credential", &self.credential)
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(credential: ApiCredential, config: AdapterConfig) -> Self {
        Self { credential, config }
    }

    /// Build from settings, reading the key from config or environment.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let id = ProviderId::OpenAi;
        let credential = ApiCredential::resolve(
            settings.api_key.as_deref(),
            settings.credential_env(id),
            "OpenAI API key",
        )?;
        Ok(Self::new(credential, settings.resolve(id)))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    async fn generate(
        &self,
        prompt: &str,
        _domain: Domain,
    ) -> Result<GenerationResponse, ProviderError> {
        let started = Instant::now();

        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        // SECURITY: Only expose the credential here, at the point of use
        let builder = http::client()
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(self.credential.expose());

        let body: ChatResponse = http::post_json(builder, &request, self.config.timeout).await?;

        let content = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("response has no choices".to_string()))?
            .message
            .content
            .ok_or_else(|| ProviderError::Parse("choice has no message content".to_string()))?;

        Ok(GenerationResponse {
            content,
            source: ResponseSource::Provider(ProviderId::OpenAi),
            model: self.config.model.clone(),
            tokens_used: body.usage.total_tokens,
            elapsed_secs: started.elapsed().as_secs_f64(),
            confidence: self.config.confidence,
        })
    }

    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Factory for OpenAI adapters.
///
/// Requires a key in `api_key` or `OPENAI_API_KEY`.
pub struct OpenAiProviderFactory;

impl ProviderFactory for OpenAiProviderFactory {
    fn provider_id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn create(&self, settings: &ProviderSettings) -> Result<Arc<dyn TextProvider>, ProviderError> {
        Ok(Arc::new(OpenAiProvider::from_settings(settings)?))
    }
}
