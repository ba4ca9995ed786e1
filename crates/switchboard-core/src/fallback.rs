//! Canned responses used when every provider has failed.
//!
//! The text depends only on the message and the domain. The upstream error
//! is logged and otherwise ignored, so a caller sees the same fallback text
//! no matter which provider broke or how.

use std::error::Error;

use crate::domain::Domain;
use crate::types::{GenerationResponse, ResponseSource};

/// Model name reported on fallback responses.
pub const FALLBACK_MODEL: &str = "intelligent_fallback";

/// Confidence reported on fallback responses.
pub const FALLBACK_CONFIDENCE: f64 = 0.6;

/// Nominal elapsed time reported on fallback responses.
pub const FALLBACK_ELAPSED_SECS: f64 = 0.1;

/// Canned text for a domain with the message quoted inside it.
pub fn fallback_text(message: &str, domain: Domain) -> String {
    match domain {
        Domain::Math => format!(
            "I understand your math question \"{message}\". I can't give a full worked answer right now, \
             but try breaking the problem into smaller steps, looking up the relevant formulas, \
             or using a math tool to help."
        ),
        Domain::Programming => format!(
            "About your programming question \"{message}\": I suggest checking the official documentation, \
             searching for related code examples, or asking in a developer community."
        ),
        Domain::Writing => format!(
            "For your writing request \"{message}\": start with an outline, gather your material, \
             and study strong examples of the form to sharpen your piece."
        ),
        Domain::Dialogue => format!(
            "\"{message}\" is a topic well worth discussing in depth. Try looking at it from several \
             angles, and feel free to continue the conversation."
        ),
        Domain::Mun => format!(
            "On the international issue \"{message}\", research the relevant provisions of international law, \
             each country's official position, and historical precedent to build a complete analysis."
        ),
        Domain::General => format!(
            "Thank you for your question \"{message}\". We're having some technical difficulties at the \
             moment, but we're working to serve you better."
        ),
    }
}

/// Build the response returned when the router runs out of candidates.
///
/// `last_error` is recorded in the log only.
pub fn fallback_response(
    message: &str,
    domain_tag: &str,
    last_error: Option<&dyn Error>,
) -> GenerationResponse {
    let domain = Domain::from_tag(domain_tag);

    match last_error {
        Some(error) => tracing::warn!(
            domain = %domain,
            last_error = %error,
            "All providers failed, serving fallback response"
        ),
        None => tracing::warn!(
            domain = %domain,
            "No provider produced content, serving fallback response"
        ),
    }

    GenerationResponse {
        content: fallback_text(message, domain),
        source: ResponseSource::Fallback,
        model: FALLBACK_MODEL.to_string(),
        tokens_used: 0,
        elapsed_secs: FALLBACK_ELAPSED_SECS,
        confidence: FALLBACK_CONFIDENCE,
    }
}
