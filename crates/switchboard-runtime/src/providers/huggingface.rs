//! Hugging Face hosted inference adapter.
//!
//! This is the free-tier provider: it is always registered, and sends a
//! bearer token only when one is configured.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Instant;

use switchboard_core::{Domain, GenerationResponse, ProviderId, ResponseSource};

use super::{
    factory::ProviderFactory, http, secrets::ApiCredential, AdapterConfig, ProviderError,
    TextProvider,
};
use crate::config::ProviderSettings;

/// Hugging Face inference provider.
pub struct HuggingFaceProvider {
    credential: Option<ApiCredential>,
    config: AdapterConfig,
}

impl std::fmt::Debug for HuggingFaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceProvider")
            .field("credential", &self.credential)
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl HuggingFaceProvider {
    pub fn new(credential: Option<ApiCredential>, config: AdapterConfig) -> Self {
        Self { credential, config }
    }

    /// Build from settings. A missing key is not an error.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let id = ProviderId::HuggingFace;
        let credential = ApiCredential::resolve(
            settings.api_key.as_deref(),
            settings.credential_env(id),
            "Hugging Face API key",
        )
        .ok();
        Self::new(credential, settings.resolve(id))
    }

    /// Repository name without its owner, e.g. `DialoGPT-large` for
    /// `microsoft/DialoGPT-large`. The full path is only used in the URL.
    fn model_name(&self) -> &str {
        self.config
            .model
            .rsplit('/')
            .next()
            .unwrap_or(&self.config.model)
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Pull generated text out of an inference reply.
///
/// Text-generation models answer with `[{"generated_text": ...}]`. Any
/// other JSON document is passed through as its serialized form.
fn extract_content(body: JsonValue) -> Result<String, ProviderError> {
    match body {
        JsonValue::Array(items) => items
            .into_iter()
            .next()
            .and_then(|item| match item.get("generated_text") {
                Some(JsonValue::String(text)) => Some(text.clone()),
                _ => None,
            })
            .ok_or_else(|| {
                ProviderError::Parse("first item has no generated_text string".to_string())
            }),
        JsonValue::String(text) => Ok(text),
        other => Ok(other.to_string()),
    }
}

#[async_trait]
impl TextProvider for HuggingFaceProvider {
    async fn generate(
        &self,
        prompt: &str,
        _domain: Domain,
    ) -> Result<GenerationResponse, ProviderError> {
        let started = Instant::now();

        let mut builder = http::client().post(format!(
            "{}/models/{}",
            self.config.base_url, self.config.model
        ));
        // SECURITY: Only expose the credential here, at the point of use
        if let Some(credential) = self.credential.as_ref().filter(|c| !c.is_empty()) {
            builder = builder.bearer_auth(credential.expose());
        }

        let body: JsonValue = http::post_json(
            builder,
            &InferenceRequest { inputs: prompt },
            self.config.timeout,
        )
        .await?;

        let content = extract_content(body)?;

        Ok(GenerationResponse {
            tokens_used: self.estimate_tokens(&content),
            content,
            source: ResponseSource::Provider(ProviderId::HuggingFace),
            model: self.model_name().to_string(),
            elapsed_secs: started.elapsed().as_secs_f64(),
            confidence: self.config.confidence,
        })
    }

    fn id(&self) -> ProviderId {
        ProviderId::HuggingFace
    }

    fn model(&self) -> &str {
        self.model_name()
    }
}

/// Factory for Hugging Face adapters. Never reports `NotConfigured`.
pub struct HuggingFaceProviderFactory;

impl ProviderFactory for HuggingFaceProviderFactory {
    fn provider_id(&self) -> ProviderId {
        ProviderId::HuggingFace
    }

    fn create(&self, settings: &ProviderSettings) -> Result<Arc<dyn TextProvider>, ProviderError> {
        Ok(Arc::new(HuggingFaceProvider::from_settings(settings)))
    }
}
