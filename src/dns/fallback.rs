//! Ordered fallback across providers.
//!
//! Providers are tried strictly one after another in the order they were
//! configured. The first non-empty answer wins. A provider that reports
//! "host not found" or answers empty hands over to the next one; any other
//! provider failure aborts the walk.

use super::{
    AddressList, Addrs, HostNotFound, LookupError, Name, Provider, Resolve, ResolutionFailure,
    Resolving,
};
use crate::base::neterror::NetError;
use std::{fmt, net::SocketAddr, sync::Arc};

/// Resolver that walks a fixed chain of providers in priority order.
///
/// The chain is immutable after construction, so a single resolver can be
/// shared (`Arc<FallbackResolver>`) and queried concurrently. There is no
/// timeout at this level; wrap the call in `tokio::time::timeout` to bound
/// the whole walk.
///
/// # Example
///
/// ```rust,ignore
/// use dnschain::dns::{DohConfig, DohProvider, FallbackResolver, SystemProvider};
/// use std::sync::Arc;
///
/// let resolver = FallbackResolver::new(vec![
///     Arc::new(DohProvider::new(DohConfig::cloudflare()?)?),
///     Arc::new(SystemProvider::new()),
/// ])?;
/// let addrs = resolver.lookup_ip("example.com").await?;
/// ```
#[derive(Clone)]
pub struct FallbackResolver {
    providers: Arc<[Arc<dyn Provider>]>,
}

impl FallbackResolver {
    /// Creates a resolver over `providers`, highest priority first.
    ///
    /// Fails with [`NetError::InvalidConfig`] when the chain is empty.
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Result<Self, NetError> {
        if providers.is_empty() {
            return Err(NetError::InvalidConfig(
                "resolver chain needs at least one provider".into(),
            ));
        }
        Ok(Self {
            providers: providers.into(),
        })
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Always false; an empty chain cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in chain order.
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.name())
    }

    /// Resolves `name` to the first non-empty address list in the chain.
    ///
    /// # Errors
    ///
    /// - [`NetError::Provider`] as soon as a provider fails with anything
    ///   other than "host not found". Later providers are not consulted.
    /// - [`NetError::NameNotResolved`] when the chain is exhausted.
    pub async fn lookup_ip(&self, name: impl Into<Name>) -> Result<AddressList, NetError> {
        walk(&self.providers, name.into()).await
    }
}

async fn walk(providers: &[Arc<dyn Provider>], name: Name) -> Result<AddressList, NetError> {
    let mut not_found: Vec<HostNotFound> = Vec::new();

    for (index, provider) in providers.iter().enumerate() {
        match provider.lookup(name.clone()).await {
            Ok(addrs) if !addrs.is_empty() => {
                tracing::trace!(
                    domain = %name,
                    provider = provider.name(),
                    index,
                    count = addrs.len(),
                    "provider answered"
                );
                return Ok(addrs);
            }
            Ok(_) => {
                tracing::trace!(domain = %name, provider = provider.name(), index, "empty answer");
            }
            Err(LookupError::NotFound(e)) => {
                tracing::trace!(domain = %name, provider = provider.name(), index, "host not found");
                not_found.push(e);
            }
            Err(LookupError::Fault(fault)) => {
                tracing::trace!(
                    domain = %name,
                    provider = provider.name(),
                    index,
                    error = %fault,
                    "provider fault, aborting"
                );
                return Err(NetError::Provider(fault));
            }
        }
    }

    Err(ResolutionFailure::new(name.as_str(), not_found).into())
}

impl Resolve for FallbackResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let providers = Arc::clone(&self.providers);
        Box::pin(async move {
            let addrs = walk(&providers, name).await?;
            Ok::<_, NetError>(Box::new(addrs.into_iter().map(|ip| SocketAddr::new(ip, 0))) as Addrs)
        })
    }
}

impl fmt::Debug for FallbackResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackResolver")
            .field("providers", &self.provider_names().collect::<Vec<_>>())
            .finish()
    }
}
