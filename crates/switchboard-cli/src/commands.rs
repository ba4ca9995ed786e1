//! Subcommand implementations.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use switchboard_core::{build_prompt, GenerationResponse, ProviderId};
use switchboard_runtime::{AttemptRecord, FallbackRouter};

/// JSON envelope printed by `ask`.
#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub success: bool,
    pub response: GenerationResponse,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<Vec<AttemptRecord>>,
}

/// JSON envelope printed when a request is refused.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub error: String,
}

impl ErrorOutput {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// What `ask` prints: a routed answer, or a refusal for blank input.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AskReply {
    Answered(AskOutput),
    Rejected(ErrorOutput),
}

/// Registered providers and the try-order they produce.
#[derive(Debug, Serialize)]
pub struct ProvidersOutput {
    pub registered: Vec<ProviderId>,
    pub try_order: Vec<ProviderId>,
}

/// Reject blank input before anything is routed.
pub fn validate_message(message: &str) -> Result<&str> {
    if message.trim().is_empty() {
        bail!("Please enter a valid message");
    }
    Ok(message)
}

pub async fn ask(
    router: &FallbackRouter,
    message: &str,
    domain: &str,
    prefer: Option<ProviderId>,
    trace: bool,
) -> AskReply {
    if let Err(error) = validate_message(message) {
        return AskReply::Rejected(ErrorOutput::new(error.to_string()));
    }

    let report = router.route_traced(message, domain, prefer).await;

    AskReply::Answered(AskOutput {
        success: true,
        response: report.response,
        domain: domain.to_string(),
        timestamp: Utc::now(),
        attempts: trace.then_some(report.attempts),
    })
}

pub fn prompt(message: &str, domain: &str) -> String {
    build_prompt(message, domain)
}

pub fn providers(router: &FallbackRouter, prefer: Option<ProviderId>) -> ProvidersOutput {
    ProvidersOutput {
        registered: router.registry().ids(),
        try_order: router.plan(prefer),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::FallbackOrder;
    use switchboard_runtime::ProviderRegistry;

    fn empty_router() -> FallbackRouter {
        FallbackRouter::new(ProviderRegistry::new(), FallbackOrder::default())
    }

    #[test]
    fn test_blank_message_is_rejected() {
        assert!(validate_message("").is_err());
        assert!(validate_message("  \n\t").is_err());
        assert_eq!(validate_message(" hi ").unwrap(), " hi ");
    }

    fn answered(reply: AskReply) -> AskOutput {
        match reply {
            AskReply::Answered(output) => output,
            AskReply::Rejected(err) => panic!("unexpected rejection: {err:?}"),
        }
    }

    #[tokio::test]
    async fn test_ask_envelope_with_no_providers() {
        let output = answered(ask(&empty_router(), "2+2", "math", None, false).await);
        assert!(output.success);
        assert_eq!(output.domain, "math");
        assert!(output.response.source.is_fallback());

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["domain"], "math");
        assert_eq!(json["response"]["provider"], "fallback");
        assert_eq!(json["response"]["model"], "intelligent_fallback");
        assert_eq!(json["response"]["tokens_used"], 0);
        assert!(json["timestamp"].is_string());
        assert!(json.get("attempts").is_none());
    }

    #[tokio::test]
    async fn test_ask_trace_includes_attempts() {
        let output = answered(ask(&empty_router(), "hello", "dialogue", None, true).await);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["attempts"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_blank_ask_prints_failure_envelope() {
        let reply = ask(&empty_router(), "   ", "math", None, true).await;
        assert!(matches!(reply, AskReply::Rejected(_)));

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Please enter a valid message"})
        );
    }

    #[test]
    fn test_prompt_uses_domain_template() {
        let text = prompt("Solve x^2 = 4", "math");
        assert!(text.contains("Problem: Solve x^2 = 4"));
    }

    #[test]
    fn test_providers_output() {
        let output = providers(&empty_router(), Some(ProviderId::Google));
        assert!(output.registered.is_empty());
        assert!(output.try_order.is_empty());
    }
}
