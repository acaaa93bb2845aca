//! DNS-over-HTTPS provider using hickory-dns.
//!
//! Each [`DohProvider`] talks to exactly one upstream service (Cloudflare,
//! Google, Quad9, or any RFC 8484 endpoint). The upstream is reached through
//! its bootstrap IP addresses so that reaching the resolver never needs DNS
//! itself; the endpoint host is only used as the TLS name.
//!
//! # Performance
//!
//! The underlying resolver is fully async and keeps its HTTPS connections
//! pooled across lookups, so one provider should be built once and reused.

use super::{FaultKind, HostNotFound, Lookup, LookupError, Name, Provider, ProviderFault};
use crate::base::neterror::NetError;
use hickory_resolver::{
    config::{LookupIpStrategy, NameServerConfigGroup, ResolverConfig},
    name_server::TokioConnectionProvider,
    proto::{op::ResponseCode, ProtoErrorKind},
    ResolveError, ResolveErrorKind, TokioResolver,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
    time::Duration,
};
use url::Url;

/// The only request path the underlying DoH client speaks.
pub const DOH_PATH: &str = "/dns-query";

/// Public DoH services with well-known bootstrap addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DohPreset {
    Cloudflare,
    Google,
    Quad9,
}

impl DohPreset {
    pub const ALL: [DohPreset; 3] = [DohPreset::Cloudflare, DohPreset::Google, DohPreset::Quad9];

    pub fn name(self) -> &'static str {
        match self {
            DohPreset::Cloudflare => "cloudflare",
            DohPreset::Google => "google",
            DohPreset::Quad9 => "quad9",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            DohPreset::Cloudflare => "https://cloudflare-dns.com/dns-query",
            DohPreset::Google => "https://dns.google/dns-query",
            DohPreset::Quad9 => "https://dns.quad9.net/dns-query",
        }
    }

    pub fn bootstrap(self) -> [IpAddr; 2] {
        let (a, b) = match self {
            DohPreset::Cloudflare => (Ipv4Addr::new(1, 1, 1, 1), Ipv4Addr::new(1, 0, 0, 1)),
            DohPreset::Google => (Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(8, 8, 4, 4)),
            DohPreset::Quad9 => (Ipv4Addr::new(9, 9, 9, 9), Ipv4Addr::new(9, 9, 9, 11)),
        };
        [IpAddr::V4(a), IpAddr::V4(b)]
    }
}

impl fmt::Display for DohPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Construction-time identity of one DoH provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DohConfig {
    /// Name used in logs and errors.
    pub name: String,
    /// Upstream endpoint, e.g. `https://dns.google/dns-query`.
    pub endpoint: Url,
    /// IP addresses of the upstream, tried in order.
    pub bootstrap: Vec<IpAddr>,
    /// Per-query timeout; `None` keeps the resolver default.
    pub timeout: Option<Duration>,
}

impl DohConfig {
    pub fn new(name: impl Into<String>, endpoint: Url, bootstrap: Vec<IpAddr>) -> Self {
        Self {
            name: name.into(),
            endpoint,
            bootstrap,
            timeout: None,
        }
    }

    pub fn from_preset(preset: DohPreset) -> Result<Self, NetError> {
        let endpoint = Url::parse(preset.endpoint())
            .map_err(|e| NetError::InvalidConfig(format!("{preset}: {e}")))?;
        Ok(Self::new(preset.name(), endpoint, preset.bootstrap().to_vec()))
    }

    pub fn cloudflare() -> Result<Self, NetError> {
        Self::from_preset(DohPreset::Cloudflare)
    }

    pub fn google() -> Result<Self, NetError> {
        Self::from_preset(DohPreset::Google)
    }

    pub fn quad9() -> Result<Self, NetError> {
        Self::from_preset(DohPreset::Quad9)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Checks that the endpoint is something the provider can actually use.
    pub fn validate(&self) -> Result<(), NetError> {
        let invalid = |reason: &str| {
            Err(NetError::InvalidConfig(format!(
                "{} ({}): {}",
                self.name, self.endpoint, reason
            )))
        };

        if self.endpoint.scheme() != "https" {
            return invalid("DoH endpoint must use https");
        }
        if self.endpoint.host_str().is_none() {
            return invalid("DoH endpoint has no host");
        }
        if self.endpoint.path() != DOH_PATH {
            return invalid("DoH endpoint path must be /dns-query");
        }
        if self.bootstrap.is_empty() {
            return invalid("at least one bootstrap address is required");
        }
        if self.timeout == Some(Duration::ZERO) {
            return invalid("timeout must be greater than zero");
        }
        Ok(())
    }
}

/// DNS-over-HTTPS provider backed by hickory-dns.
///
/// # Features
///
/// - Fully async (no blocking threads)
/// - IPv4 and IPv6 dual-stack resolution
/// - Connection pooling to the upstream
///
/// # Example
///
/// ```rust,ignore
/// use dnschain::dns::{DohConfig, DohProvider, Name, Provider};
///
/// let provider = DohProvider::new(DohConfig::google()?)?;
/// let addrs = provider.lookup(Name::new("example.com")).await?;
/// ```
#[derive(Clone)]
pub struct DohProvider {
    name: Arc<str>,
    endpoint: Url,
    resolver: Arc<TokioResolver>,
}

impl DohProvider {
    /// Builds the provider eagerly from `config`.
    pub fn new(config: DohConfig) -> Result<Self, NetError> {
        config.validate()?;

        let tls_name = config
            .endpoint
            .host_str()
            .ok_or_else(|| NetError::InvalidConfig(format!("{}: missing host", config.name)))?
            .to_string();
        let port = config.endpoint.port_or_known_default().unwrap_or(443);

        // Negative answers from one bootstrap server are final for the upstream.
        let servers = NameServerConfigGroup::from_ips_https(&config.bootstrap, port, tls_name, true);

        let mut builder = TokioResolver::builder_with_config(
            ResolverConfig::from_parts(None, vec![], servers),
            TokioConnectionProvider::default(),
        );

        // Enable dual-stack for Happy Eyeballs
        builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        if let Some(timeout) = config.timeout {
            builder.options_mut().timeout = timeout;
        }

        tracing::debug!(
            provider = %config.name,
            endpoint = %config.endpoint,
            bootstrap = ?config.bootstrap,
            "built DoH provider"
        );

        Ok(Self {
            name: config.name.into(),
            endpoint: config.endpoint,
            resolver: Arc::new(builder.build()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Provider for DohProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, name: Name) -> Lookup {
        let provider = self.clone();
        Box::pin(async move {
            let domain = name.as_str();
            tracing::debug!(domain = %domain, provider = %provider.name, "resolving via DoH");

            let lookup = provider.resolver.lookup_ip(domain).await.map_err(|e| {
                tracing::debug!(
                    domain = %domain,
                    provider = %provider.name,
                    error = %e,
                    "DoH lookup failed"
                );
                classify(&provider.name, domain, e)
            })?;

            let addrs: Vec<IpAddr> = lookup.iter().collect();
            tracing::debug!(
                domain = %domain,
                provider = %provider.name,
                count = addrs.len(),
                "DoH resolution complete"
            );
            Ok::<_, LookupError>(addrs)
        })
    }
}

impl fmt::Debug for DohProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DohProvider")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

/// Splits resolver errors into "host not found" and everything else.
///
/// Only NXDOMAIN and an empty NOERROR answer mean the name is unknown.
/// Hickory folds SERVFAIL, REFUSED and the other error rcodes into the same
/// "no records" kind, so the response code decides.
fn classify(provider: &str, domain: &str, err: ResolveError) -> LookupError {
    let kind = match err.kind() {
        ResolveErrorKind::Proto(proto) => match proto.kind() {
            ProtoErrorKind::NoRecordsFound { response_code, .. } => match response_code {
                ResponseCode::NXDomain | ResponseCode::NoError => {
                    return HostNotFound::new(provider, domain).with_source(err).into();
                }
                ResponseCode::FormErr | ResponseCode::BADVERS => FaultKind::MalformedResponse,
                _ => FaultKind::Other,
            },
            ProtoErrorKind::Timeout => FaultKind::Timeout,
            ProtoErrorKind::Io(_) | ProtoErrorKind::NoConnections => FaultKind::Connection,
            _ => FaultKind::MalformedResponse,
        },
        _ => FaultKind::Other,
    };
    ProviderFault::new(provider, domain, kind).with_source(err).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_resolver::proto::{
        op::Query,
        rr::{Name as DnsName, RecordType},
        ProtoError,
    };

    fn config(endpoint: &str) -> DohConfig {
        DohConfig::new(
            "test",
            Url::parse(endpoint).unwrap(),
            vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 53))],
        )
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in DohPreset::ALL {
            let config = DohConfig::from_preset(preset).unwrap();
            assert_eq!(config.name, preset.name());
            assert_eq!(config.bootstrap.len(), 2);
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_cloudflare_preset() {
        let config = DohConfig::cloudflare().unwrap();
        assert_eq!(config.endpoint.host_str(), Some("cloudflare-dns.com"));
        assert_eq!(
            config.bootstrap,
            vec![
                IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
                IpAddr::V4(Ipv4Addr::new(1, 0, 0, 1))
            ]
        );
    }

    #[test]
    fn test_validate_rejects_plain_http() {
        let err = config("http://dns.example/dns-query").validate().unwrap_err();
        assert!(matches!(err, NetError::InvalidConfig(msg) if msg.contains("https")));
    }

    #[test]
    fn test_validate_rejects_custom_path() {
        let err = config("https://dns.example/resolve").validate().unwrap_err();
        assert!(matches!(err, NetError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_missing_bootstrap() {
        let mut config = config("https://dns.example/dns-query");
        config.bootstrap.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = config("https://dns.example/dns-query").with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_provider_builds_from_preset() {
        let provider = DohProvider::new(DohConfig::quad9().unwrap()).unwrap();
        assert_eq!(provider.name(), "quad9");
        assert_eq!(provider.endpoint().as_str(), "https://dns.quad9.net/dns-query");
    }

    #[tokio::test]
    #[ignore] // Run with --ignored flag for network tests
    async fn test_unreachable_upstream_is_not_host_not_found() {
        // TEST-NET-1 never answers; the lookup must fail as a fault, not a miss.
        let provider = DohProvider::new(
            config("https://dns.example/dns-query").with_timeout(Duration::from_millis(200)),
        )
        .unwrap();

        let result = provider.lookup(Name::new("example.com")).await;
        assert!(matches!(result, Err(LookupError::Fault(_))));
    }

    fn no_records(response_code: ResponseCode) -> ResolveError {
        let query = Query::query(DnsName::from_ascii("nope.example.").unwrap(), RecordType::A);
        ProtoError::nx_error(Box::new(query), None, None, None, response_code, false, None).into()
    }

    fn classify_kind(err: ResolveError) -> Option<FaultKind> {
        match classify("doh", "nope.example", err) {
            LookupError::NotFound(e) => {
                assert_eq!(e.provider(), "doh");
                None
            }
            LookupError::Fault(fault) => Some(fault.kind()),
        }
    }

    #[test]
    fn test_classify_nxdomain_and_nodata_fall_back() {
        assert_eq!(classify_kind(no_records(ResponseCode::NXDomain)), None);
        assert_eq!(classify_kind(no_records(ResponseCode::NoError)), None);
    }

    #[test]
    fn test_classify_server_failures_abort() {
        assert_eq!(
            classify_kind(no_records(ResponseCode::ServFail)),
            Some(FaultKind::Other)
        );
        assert_eq!(
            classify_kind(no_records(ResponseCode::Refused)),
            Some(FaultKind::Other)
        );
        assert_eq!(
            classify_kind(no_records(ResponseCode::FormErr)),
            Some(FaultKind::MalformedResponse)
        );
    }

    #[test]
    fn test_classify_transport_errors() {
        let timeout = ResolveError::from(ProtoError::from(ProtoErrorKind::Timeout));
        assert_eq!(classify_kind(timeout), Some(FaultKind::Timeout));

        let no_conns = ResolveError::from(ProtoError::from(ProtoErrorKind::NoConnections));
        assert_eq!(classify_kind(no_conns), Some(FaultKind::Connection));

        assert_eq!(classify_kind(ResolveError::from("boom")), Some(FaultKind::Other));
    }
}
