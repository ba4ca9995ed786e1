//! # switchboard-runtime
//!
//! Provider adapters and the sequential fallback router.
//!
//! This crate is where network calls happen. Each request is routed by
//! trying registered providers one after another until one returns
//! non-blank content; if none does, the caller still gets a response, the
//! canned fallback from `switchboard-core`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use switchboard_runtime::{FallbackRouter, RouterConfig};
//! use switchboard_core::ProviderId;
//!
//! let router = FallbackRouter::from_config(&RouterConfig::default());
//!
//! let response = router
//!     .route("Explain eigenvalues", "math", Some(ProviderId::Anthropic))
//!     .await;
//! println!("{} answered: {}", response.source, response.content);
//! ```

pub mod config;
pub mod providers;
pub mod router;

pub use config::{ConfigError, ProviderSettings, RouterConfig};
pub use providers::{
    AdapterConfig, ProviderError, ProviderFactory, ProviderRegistry, TextProvider,
};
pub use router::{AttemptOutcome, AttemptRecord, AttemptStatus, FallbackRouter, RouteReport};
