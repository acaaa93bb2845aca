//! Resolver chain configuration.
//!
//! A [`ResolverConfig`] describes the chain in priority order and can be
//! loaded from JSON:
//!
//! ```json
//! {
//!   "providers": [
//!     { "kind": "preset", "preset": "cloudflare" },
//!     { "kind": "doh", "name": "internal",
//!       "endpoint": "https://doh.corp.example/dns-query",
//!       "bootstrap": ["10.0.0.53"], "timeout_ms": 2000 },
//!     { "kind": "system" }
//!   ],
//!   "system_fallback": true
//! }
//! ```
//!
//! [`ResolverConfig::build`] constructs every provider up front and returns
//! the [`FallbackResolver`]; it is meant to be called once and the result
//! shared by whoever needs name resolution.

use super::{DohConfig, DohPreset, DohProvider, FallbackResolver, Provider, SystemProvider};
use crate::base::neterror::NetError;
use serde::{Deserialize, Serialize};
use std::{net::IpAddr, path::Path, sync::Arc, time::Duration};
use url::Url;

/// One link of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// A well-known public DoH service.
    Preset {
        preset: DohPreset,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    /// Any RFC 8484 endpoint.
    Doh {
        name: String,
        endpoint: Url,
        bootstrap: Vec<IpAddr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    /// The platform resolver.
    System,
}

impl ProviderConfig {
    pub fn preset(preset: DohPreset) -> Self {
        ProviderConfig::Preset {
            preset,
            timeout_ms: None,
        }
    }

    fn doh_config(&self) -> Result<Option<DohConfig>, NetError> {
        let (config, timeout_ms) = match self {
            ProviderConfig::Preset { preset, timeout_ms } => {
                (DohConfig::from_preset(*preset)?, *timeout_ms)
            }
            ProviderConfig::Doh {
                name,
                endpoint,
                bootstrap,
                timeout_ms,
            } => (
                DohConfig::new(name.clone(), endpoint.clone(), bootstrap.clone()),
                *timeout_ms,
            ),
            ProviderConfig::System => return Ok(None),
        };

        Ok(Some(match timeout_ms {
            Some(ms) => config.with_timeout(Duration::from_millis(ms)),
            None => config,
        }))
    }

    fn build(&self) -> Result<Arc<dyn Provider>, NetError> {
        let provider: Arc<dyn Provider> = match self.doh_config()? {
            Some(config) => Arc::new(DohProvider::new(config)?),
            None => Arc::new(SystemProvider::new()),
        };
        Ok(provider)
    }
}

/// The ordered provider chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Providers, highest priority first.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    /// Append the platform resolver as the last resort.
    #[serde(default = "default_system_fallback")]
    pub system_fallback: bool,
}

fn default_system_fallback() -> bool {
    true
}

impl Default for ResolverConfig {
    /// Cloudflare, Google and Quad9 over HTTPS, then the system resolver.
    fn default() -> Self {
        Self {
            providers: DohPreset::ALL.into_iter().map(ProviderConfig::preset).collect(),
            system_fallback: true,
        }
    }
}

impl ResolverConfig {
    pub fn from_json(json: &str) -> Result<Self, NetError> {
        serde_json::from_str(json).map_err(|e| NetError::InvalidConfig(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| NetError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, NetError> {
        serde_json::to_string_pretty(self).map_err(|e| NetError::InvalidConfig(e.to_string()))
    }

    /// The effective chain, with the system fallback applied.
    pub fn chain(&self) -> Vec<ProviderConfig> {
        let mut chain = self.providers.clone();
        if self.system_fallback && chain.last() != Some(&ProviderConfig::System) {
            chain.push(ProviderConfig::System);
        }
        chain
    }

    /// Validates every link without building anything.
    pub fn validate(&self) -> Result<(), NetError> {
        let chain = self.chain();
        if chain.is_empty() {
            return Err(NetError::InvalidConfig(
                "resolver chain needs at least one provider".into(),
            ));
        }
        for link in &chain {
            if let Some(config) = link.doh_config()? {
                config.validate()?;
            }
        }
        Ok(())
    }

    /// Builds every provider eagerly and returns the resolver.
    pub fn build(&self) -> Result<FallbackResolver, NetError> {
        self.validate()?;
        let providers = self
            .chain()
            .iter()
            .map(ProviderConfig::build)
            .collect::<Result<Vec<_>, _>>()?;
        let resolver = FallbackResolver::new(providers)?;
        tracing::debug!(providers = ?resolver, "built resolver chain");
        Ok(resolver)
    }
}
