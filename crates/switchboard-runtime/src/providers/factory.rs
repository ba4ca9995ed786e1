//! Provider factories and the process-wide provider registry.
//!
//! Each provider has a factory that builds its adapter from settings. The
//! registry asks every factory once at startup; a factory that reports
//! [`ProviderError::NotConfigured`] (usually a missing key) leaves its
//! provider out. After construction the registry is read-only.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = ProviderRegistry::from_config(&RouterConfig::default());
//! if let Some(provider) = registry.get(ProviderId::Anthropic) {
//!     let reply = provider.generate(&prompt, domain).await?;
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use switchboard_core::ProviderId;

use super::{
    AnthropicProviderFactory, GoogleProviderFactory, HuggingFaceProviderFactory,
    OpenAiProviderFactory, ProviderError, TextProvider,
};
use crate::config::{ProviderSettings, RouterConfig};

/// Builds one provider's adapter from settings.
pub trait ProviderFactory: Send + Sync {
    /// Which provider this factory builds.
    fn provider_id(&self) -> ProviderId;

    /// Create an adapter.
    ///
    /// Returns `NotConfigured` when a required credential is missing.
    fn create(&self, settings: &ProviderSettings) -> Result<Arc<dyn TextProvider>, ProviderError>;
}

/// Factories for every built-in provider.
pub fn default_factories() -> Vec<Box<dyn ProviderFactory>> {
    vec![
        Box::new(OpenAiProviderFactory),
        Box::new(AnthropicProviderFactory),
        Box::new(GoogleProviderFactory),
        Box::new(HuggingFaceProviderFactory),
    ]
}

/// Active adapters keyed by provider.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderId, Arc<dyn TextProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from configuration and the environment.
    pub fn from_config(config: &RouterConfig) -> Self {
        Self::from_factories(config, default_factories())
    }

    /// Build the registry from an explicit factory list.
    pub fn from_factories(
        config: &RouterConfig,
        factories: impl IntoIterator<Item = Box<dyn ProviderFactory>>,
    ) -> Self {
        let mut registry = Self::new();

        for factory in factories {
            let id = factory.provider_id();
            let settings = config.provider_settings(id);

            match factory.create(&settings) {
                Ok(provider) => {
                    tracing::info!(
                        provider = %id,
                        model = provider.model(),
                        "Registered provider"
                    );
                    registry.insert(provider);
                }
                Err(ProviderError::NotConfigured(reason)) => {
                    tracing::debug!(
                        provider = %id,
                        reason = %reason,
                        "Provider not configured, skipping"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        provider = %id,
                        error = %error,
                        "Provider failed to initialize, skipping"
                    );
                }
            }
        }

        registry
    }

    /// Add an adapter. A later adapter for the same provider replaces the earlier one.
    pub fn insert(&mut self, provider: Arc<dyn TextProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_provider(mut self, provider: Arc<dyn TextProvider>) -> Self {
        self.insert(provider);
        self
    }

    pub fn get(&self, id: ProviderId) -> Option<&Arc<dyn TextProvider>> {
        self.providers.get(&id)
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.providers.contains_key(&id)
    }

    /// Registered providers, in `ProviderId` order.
    pub fn ids(&self) -> Vec<ProviderId> {
        self.providers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}
