//! Google Gemini generateContent adapter.
//!
//! Gemini takes the key as a `key` query parameter and does not report
//! token usage in the fields we read, so usage is estimated.

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

/// Google Gemini provider.
pub struct GoogleProvider {
    credential: ApiCredential,
    config: AdapterConfig,
}

impl std::fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProvider")
            .field("credential", &self.credential)
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl GoogleProvider {
    pub fn new(credential: ApiCredential, config: AdapterConfig) -> Self {
        Self { credential, config }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let id = ProviderId::Google;
        let credential = ApiCredential::resolve(
            settings.api_key.as_deref(),
            settings.credential_env(id),
            "Google API key",
        )?;
        Ok(Self::new(credential, settings.resolve(id)))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl TextProvider for GoogleProvider {
    async fn generate(
        &self,
        prompt: &str,
        _domain: Domain,
    ) -> Result<GenerationResponse, ProviderError> {
        let started = Instant::now();

        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        // SECURITY: Only expose the credential here, at the point of use
        let builder = http::client()
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.base_url, self.config.model
            ))
            .query(&[("key", self.credential.expose())]);

        let body: GenerateResponse = http::post_json(builder, &request, self.config.timeout).await?;

        let content = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .ok_or_else(|| ProviderError::Parse("response has no candidate parts".to_string()))?
            .text
            .ok_or_else(|| ProviderError::Parse("candidate part has no text".to_string()))?;

        Ok(GenerationResponse {
            tokens_used: self.estimate_tokens(&content),
            content,
            source: ResponseSource::Provider(ProviderId::Google),
            model: self.config.model.clone(),
            elapsed_secs: started.elapsed().as_secs_f64(),
            confidence: self.config.confidence,
        })
    }

    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Factory for Gemini adapters. Requires `GOOGLE_API_KEY` or an inline key.
pub struct GoogleProviderFactory;

impl ProviderFactory for GoogleProviderFactory {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn create(&self, settings: &ProviderSettings) -> Result<Arc<dyn TextProvider>, ProviderError> {
        Ok(Arc::new(GoogleProvider::from_settings(settings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::CredentialSource;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GoogleProvider {
        GoogleProvider::new(
            ApiCredential::new("g-key", CredentialSource::Programmatic, "Google API key"),
            AdapterConfig::for_provider(ProviderId::Google).with_base_url(server.uri()),
        )
    }

    #[tokio::test]
    async fn test_generate_estimates_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .and(query_param("key", "g-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "Issue: fisheries"}]}],
                "generationConfig": {"maxOutputTokens": 1000}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "sixteen chars!!!"}], "role": "model"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server)
            .generate("Issue: fisheries", Domain::Mun)
            .await
            .unwrap();

        assert_eq!(response.content, "sixteen chars!!!");
        assert_eq!(response.tokens_used, 4);
        assert_eq!(response.model, "gemini-pro");
        assert_eq!(response.confidence, 0.85);
    }

    #[tokio::test]
    async fn test_blocked_prompt_without_candidates_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [],
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server).generate("hi", Domain::General).await.unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_html_error_page_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = provider(&server).generate("hi", Domain::General).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_does_not_leak_key() {
        let provider = GoogleProvider::new(
            ApiCredential::new("g-SECRET-KEY-42", CredentialSource::Programmatic, "Google API key"),
            AdapterConfig::for_provider(ProviderId::Google).with_base_url("http://127.0.0.1:1"),
        );

        let err = provider.generate("hi", Domain::General).await.unwrap_err();

        assert!(matches!(err, ProviderError::Http(_)));
        assert!(!err.to_string().contains("g-SECRET-KEY-42"), "key leaked: {err}");
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let provider = GoogleProvider::new(
            ApiCredential::new("g-secret-999", CredentialSource::Programmatic, "Google API key"),
            AdapterConfig::for_provider(ProviderId::Google),
        );
        assert!(!format!("{provider:?}").contains("g-secret-999"));
    }
}
