//! # switchboard-core
//!
//! Deterministic building blocks for routing a request across
//! text-generation providers.
//!
//! This crate never makes network calls. It owns:
//! - Provider identities and the global fallback order
//! - Try-order planning for a single request
//! - Domain prompt templates
//! - Canned fallback responses used when every provider fails
//!
//! The adapters and the router that drive these live in
//! `switchboard-runtime`.
//!
//! ## Example
//!
//! ```rust
//! use switchboard_core::{build_prompt, fallback_response, FallbackOrder, ProviderId};
//!
//! let prompt = build_prompt("2+2", "math");
//! assert!(prompt.contains("Problem: 2+2"));
//!
//! let plan = FallbackOrder::default()
//!     .try_order(Some(ProviderId::Google), |id| id != ProviderId::OpenAi);
//! assert_eq!(plan[0], ProviderId::Google);
//!
//! let canned = fallback_response("2+2", "math", None);
//! assert_eq!(canned.source.to_string(), "fallback");
//! ```

pub mod domain;
pub mod fallback;
pub mod order;
pub mod prompt;
pub mod types;

// Re-export main types at crate root
pub use domain::Domain;
pub use fallback::{fallback_response, fallback_text, FALLBACK_CONFIDENCE, FALLBACK_MODEL};
pub use order::FallbackOrder;
pub use prompt::{build_prompt, template_for, PromptTemplate, SYSTEM_INSTRUCTION};
pub use types::{
    estimate_tokens, GenerationRequest, GenerationResponse, ProviderId, ResponseSource,
    UnknownProvider,
};
