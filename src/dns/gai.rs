//! System DNS provider using getaddrinfo.
//!
//! This provider uses the operating system's native DNS resolution via
//! `getaddrinfo`, executed in a thread pool to avoid blocking the async runtime.
//!
//! # When to Use
//!
//! - As the last link of a fallback chain, after the DoH providers
//! - When you need to respect system DNS configuration (/etc/resolv.conf,
//!   /etc/hosts, etc.)

use super::{AddressList, FaultKind, Lookup, LookupError, Name, Provider, ProviderFault};
use crate::base::context::IoResultExt;
use std::net::{IpAddr, ToSocketAddrs};

const SYSTEM: &str = "system";

/// System DNS provider using `getaddrinfo` in a thread pool.
///
/// This provider wraps the standard library's `ToSocketAddrs` trait and
/// executes resolution in `tokio::task::spawn_blocking` to avoid blocking
/// the async runtime.
///
/// `getaddrinfo` does not reliably tell an unknown host apart from a broken
/// network, so every lookup error is reported as "host not found". Only a
/// failed blocking task is a fault.
#[derive(Clone, Debug, Default)]
pub struct SystemProvider;

impl SystemProvider {
    /// Creates a new `SystemProvider`.
    pub fn new() -> Self {
        Self
    }
}

impl Provider for SystemProvider {
    fn name(&self) -> &str {
        SYSTEM
    }

    fn lookup(&self, name: Name) -> Lookup {
        Box::pin(async move {
            let host = name.as_str().to_string();
            let domain = host.clone();

            let result = tokio::task::spawn_blocking(move || {
                tracing::debug!(host = %host, "resolving via getaddrinfo");
                (host.as_str(), 0u16)
                    .to_socket_addrs()
                    .map(|iter| iter.map(|addr| addr.ip()).collect::<Vec<_>>())
            })
            .await;

            // Handle task join error (cancellation, panic)
            let addrs = result
                .map_err(|e| {
                    tracing::error!(error = %e, "DNS resolution task failed");
                    ProviderFault::new(SYSTEM, domain.as_str(), FaultKind::Other).with_source(e)
                })?
                .map_err(|e| {
                    tracing::debug!(domain = %domain, error = %e, "DNS resolution failed");
                    e
                })
                .dns_context(SYSTEM, &domain)?;

            let addrs = dedup_in_order(addrs);
            tracing::debug!(domain = %domain, count = addrs.len(), "DNS resolution complete");
            Ok::<_, LookupError>(addrs)
        })
    }
}

/// `getaddrinfo` returns one entry per socket type; keep the first of each.
fn dedup_in_order(addrs: Vec<IpAddr>) -> AddressList {
    let mut unique = Vec::with_capacity(addrs.len());
    for addr in addrs {
        if !unique.contains(&addr) {
            unique.push(addr);
        }
    }
    unique
}
