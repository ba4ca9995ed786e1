//! Sequential fallback router.
//!
//! The router turns one request into at most one in-flight provider call
//! at a time:
//! 1. Build the domain prompt
//! 2. Plan the try-order (preferred provider, then the fallback order)
//! 3. Call each candidate in turn until one returns non-blank content
//! 4. If none does, answer with the canned fallback response
//!
//! Failures never escape `route`. There is no aggregate deadline: each
//! adapter enforces its own timeout, so the worst case is the sum of the
//! candidates' timeouts.

use serde::Serialize;
use std::error::Error;
use tokio::time::Instant;

use switchboard_core::{
    build_prompt, fallback_response, Domain, FallbackOrder, GenerationRequest,
    GenerationResponse, ProviderId,
};

use crate::config::RouterConfig;
use crate::providers::{ProviderError, ProviderRegistry};

/// Outcome of one candidate call.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Non-blank content, ready to return
    Success(GenerationResponse),
    /// The provider answered, but with nothing but whitespace
    Blank,
    /// The call failed
    Failed(ProviderError),
}

impl From<Result<GenerationResponse, ProviderError>> for AttemptOutcome {
    fn from(result: Result<GenerationResponse, ProviderError>) -> Self {
        match result {
            Ok(response) if response.has_content() => AttemptOutcome::Success(response),
            Ok(_) => AttemptOutcome::Blank,
            Err(error) => AttemptOutcome::Failed(error),
        }
    }
}

/// Log entry for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub provider: ProviderId,
    #[serde(flatten)]
    pub status: AttemptStatus,
    pub elapsed_secs: f64,
}

/// Serializable summary of an [`AttemptOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum AttemptStatus {
    Succeeded,
    Blank,
    Failed(String),
}

/// A routed response together with what was tried to get it.
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub response: GenerationResponse,
    pub attempts: Vec<AttemptRecord>,
}

/// Routes requests across the registered providers.
///
/// Read-only once built; share it across tasks behind an `Arc`.
#[derive(Debug)]
pub struct FallbackRouter {
    registry: ProviderRegistry,
    order: FallbackOrder,
}

impl FallbackRouter {
    pub fn new(registry: ProviderRegistry, order: FallbackOrder) -> Self {
        Self { registry, order }
    }

    /// Build the registry from configuration and wrap it.
    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(
            ProviderRegistry::from_config(config),
            config.fallback_order.clone(),
        )
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn order(&self) -> &FallbackOrder {
        &self.order
    }

    /// Candidates for a request, in the order they will be tried.
    pub fn plan(&self, preferred: Option<ProviderId>) -> Vec<ProviderId> {
        self.order
            .try_order(preferred, |id| self.registry.contains(id))
    }

    /// Route a message. Always returns a response.
    ///
    /// `message` must already be known to be non-blank.
    pub async fn route(
        &self,
        message: &str,
        domain_tag: &str,
        preferred: Option<ProviderId>,
    ) -> GenerationResponse {
        self.route_traced(message, domain_tag, preferred)
            .await
            .response
    }

    pub async fn route_request(&self, request: &GenerationRequest) -> GenerationResponse {
        self.route(&request.message, &request.domain_tag, request.preferred)
            .await
    }

    /// Like [`route`](Self::route), also returning the per-candidate log.
    pub async fn route_traced(
        &self,
        message: &str,
        domain_tag: &str,
        preferred: Option<ProviderId>,
    ) -> RouteReport {
        let domain = Domain::from_tag(domain_tag);
        let prompt = build_prompt(message, domain_tag);
        let plan = self.plan(preferred);

        tracing::debug!(
            domain = %domain,
            preferred = ?preferred,
            plan = ?plan,
            "Routing request"
        );

        let mut attempts = Vec::with_capacity(plan.len());
        let mut last_error: Option<ProviderError> = None;

        for id in plan {
            let Some(provider) = self.registry.get(id) else {
                continue;
            };

            let started = Instant::now();
            let outcome = AttemptOutcome::from(provider.generate(&prompt, domain).await);
            let elapsed_secs = started.elapsed().as_secs_f64();

            match outcome {
                AttemptOutcome::Success(response) => {
                    tracing::info!(
                        provider = %id,
                        model = %response.model,
                        tokens = response.tokens_used,
                        elapsed_secs,
                        "Provider answered"
                    );
                    attempts.push(AttemptRecord {
                        provider: id,
                        status: AttemptStatus::Succeeded,
                        elapsed_secs,
                    });
                    return RouteReport { response, attempts };
                }
                AttemptOutcome::Blank => {
                    tracing::warn!(
                        provider = %id,
                        elapsed_secs,
                        "Provider returned blank content, trying next"
                    );
                    attempts.push(AttemptRecord {
                        provider: id,
                        status: AttemptStatus::Blank,
                        elapsed_secs,
                    });
                }
                AttemptOutcome::Failed(error) => {
                    tracing::warn!(
                        provider = %id,
                        error = %error,
                        elapsed_secs,
                        "Provider failed, trying next"
                    );
                    attempts.push(AttemptRecord {
                        provider: id,
                        status: AttemptStatus::Failed(error.to_string()),
                        elapsed_secs,
                    });
                    last_error = Some(error);
                }
            }
        }

        let response = fallback_response(
            message,
            domain_tag,
            last_error.as_ref().map(|e| e as &dyn Error),
        );
        RouteReport { response, attempts }
    }
}
