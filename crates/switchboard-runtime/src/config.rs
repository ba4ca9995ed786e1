//! Router configuration.
//!
//! Everything is optional: an empty file (or no file) gives the default
//! fallback order and the default settings for every provider.
//!
//! ```yaml
//! fallback_order: [anthropic, openai, huggingface]
//! providers:
//!   openai:
//!     model: gpt-4o-mini
//!     timeout: 20s
//!   huggingface:
//!     base_url: http://localhost:8080
//!     confidence: 0.5
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use switchboard_core::{FallbackOrder, ProviderId};

use crate::providers::AdapterConfig;

/// Errors loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level router configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Global provider preference
    pub fallback_order: FallbackOrder,

    /// Per-provider overrides
    pub providers: BTreeMap<ProviderId, ProviderSettings>,
}

/// Overrides for one provider. Unset fields use the provider's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    /// Model to request
    pub model: Option<String>,

    /// API root, e.g. a proxy
    pub base_url: Option<String>,

    /// Per-call timeout (humantime, e.g. "30s", "1m 30s")
    #[serde(with = "humantime_opt", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Confidence stamped on responses (0.0 - 1.0)
    pub confidence: Option<f64>,

    /// Environment variable to read the key from
    pub api_key_env: Option<String>,

    /// Inline key; takes precedence over the environment
    pub api_key: Option<String>,
}

impl ProviderSettings {
    /// Environment variable holding the key for `id`.
    pub fn credential_env(&self, id: ProviderId) -> &str {
        self.api_key_env.as_deref().unwrap_or(id.credential_env())
    }

    /// Fill unset fields from the provider's defaults.
    pub fn resolve(&self, id: ProviderId) -> AdapterConfig {
        let mut config = AdapterConfig::for_provider(id);

        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.as_str());
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(confidence) = self.confidence {
            config.confidence = confidence;
        }

        config
    }

    fn validate(&self, id: ProviderId) -> Result<(), ConfigError> {
        if let Some(confidence) = self.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ConfigError::Invalid(format!(
                    "{id}: confidence must be between 0.0 and 1.0, got {confidence}"
                )));
            }
        }

        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::Invalid(format!("{id}: timeout must be non-zero")));
        }

        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "{id}: base_url must start with http:// or https://"
                )));
            }
        }

        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("{id}: model must not be empty")));
        }

        Ok(())
    }
}

impl RouterConfig {
    /// Parse and validate YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Check value ranges. Called by the loaders.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fallback_order.is_empty() {
            return Err(ConfigError::Invalid(
                "fallback_order must name at least one provider".to_string(),
            ));
        }

        for (id, settings) in &self.providers {
            settings.validate(*id)?;
        }

        Ok(())
    }

    /// Settings for a provider, or defaults if none were given.
    pub fn provider_settings(&self, id: ProviderId) -> ProviderSettings {
        self.providers.get(&id).cloned().unwrap_or_default()
    }
}

mod humantime_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.collect_str(&humantime::format_duration(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
