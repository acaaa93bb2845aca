//! Per-provider and aggregate resolution errors.
//!
//! A provider fails in one of two ways. [`HostNotFound`] means the provider
//! has no record for the hostname and the chain should move on.
//! [`ProviderFault`] is anything else (timeouts, unreachable upstreams,
//! undecodable answers) and ends the resolution attempt. When the whole chain
//! is exhausted the collected [`HostNotFound`]s are folded into a single
//! [`ResolutionFailure`].

use std::{error::Error as StdError, fmt, sync::Arc};
use thiserror::Error;

/// Shared, cloneable underlying cause.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// A single provider has no answer for the hostname.
#[derive(Debug, Clone, Error)]
#[error("{provider}: unable to resolve host \"{hostname}\"")]
pub struct HostNotFound {
    provider: String,
    hostname: String,
    #[source]
    source: Option<SharedError>,
}

impl HostNotFound {
    pub fn new(provider: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            hostname: hostname.into(),
            source: None,
        }
    }

    /// Attaches the provider-specific cause.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

/// Classification of a non-fallback provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// The upstream did not answer in time.
    Timeout,
    /// The upstream could not be reached.
    Connection,
    /// The upstream answered with something that could not be decoded.
    MalformedResponse,
    Other,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FaultKind::Timeout => "timed out",
            FaultKind::Connection => "connection failed",
            FaultKind::MalformedResponse => "malformed response",
            FaultKind::Other => "resolver error",
        })
    }
}

/// A provider failed for a reason other than "host not found".
#[derive(Debug, Clone, Error)]
#[error("{provider}: {kind} while resolving \"{hostname}\"")]
pub struct ProviderFault {
    provider: String,
    hostname: String,
    kind: FaultKind,
    #[source]
    source: Option<SharedError>,
}

impl ProviderFault {
    pub fn new(provider: impl Into<String>, hostname: impl Into<String>, kind: FaultKind) -> Self {
        Self {
            provider: provider.into(),
            hostname: hostname.into(),
            kind,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }
}

/// Outcome of a failed [`Provider::lookup`](super::Provider::lookup).
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error(transparent)]
    NotFound(#[from] HostNotFound),
    #[error(transparent)]
    Fault(#[from] ProviderFault),
}

/// Every provider in the chain declined the hostname or answered empty.
///
/// The first recorded [`HostNotFound`] is the primary cause and is what
/// [`Error::source`](std::error::Error::source) returns; later ones are kept
/// in order as suppressed causes. Providers that answered with an empty list
/// leave no cause behind, so a failure may carry none at all.
#[derive(Debug, Clone)]
pub struct ResolutionFailure {
    hostname: String,
    cause: Option<HostNotFound>,
    suppressed: Vec<HostNotFound>,
}

impl ResolutionFailure {
    /// Builds a failure from the causes in the order they were encountered.
    pub fn new(hostname: impl Into<String>, causes: Vec<HostNotFound>) -> Self {
        let mut causes = causes.into_iter();
        let cause = causes.next();
        Self {
            hostname: hostname.into(),
            cause,
            suppressed: causes.collect(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The primary cause: the first provider that reported "host not found".
    pub fn cause(&self) -> Option<&HostNotFound> {
        self.cause.as_ref()
    }

    /// Secondary causes, in chain order.
    pub fn suppressed(&self) -> &[HostNotFound] {
        &self.suppressed
    }

    /// Primary cause followed by every suppressed cause.
    pub fn causes(&self) -> impl Iterator<Item = &HostNotFound> {
        self.cause.iter().chain(self.suppressed.iter())
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unable to resolve host \"{}\"", self.hostname)
    }
}

impl StdError for ResolutionFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(|c| c as &(dyn StdError + 'static))
    }
}
