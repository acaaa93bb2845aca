//! Minimal HTTP/1.1 client that resolves through an injected [`Resolve`].
//!
//! The client never calls the platform resolver itself. Hostnames go through
//! whatever resolver it was built with, typically a
//! [`FallbackResolver`](crate::dns::FallbackResolver) shared by the whole
//! application. A resolver's "unknown host" answer comes back as
//! [`NetError::NameNotResolved`], exactly as it would from the platform.
//!
//! # Example
//!
//! ```rust,ignore
//! use dnschain::{client::Client, dns::ResolverConfig};
//! use std::sync::Arc;
//!
//! let resolver = Arc::new(ResolverConfig::default().build()?);
//! let client = Client::new(resolver);
//! let resp = client.get("http://example.com/").await?;
//! println!("Status: {}", resp.status());
//! ```

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::dns::{Name, Resolve};
use bytes::Bytes;
use http::{header, Method, Request, Response};
use http_body_util::{BodyExt, Empty};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::{fmt, net::SocketAddr, sync::Arc};
use tokio::net::TcpStream;
use url::{Host, Position, Url};

/// HTTP client for plain `http` URLs.
#[derive(Clone)]
pub struct Client {
    resolver: Arc<dyn Resolve>,
}

impl Client {
    /// Create a client that resolves hostnames with `resolver`.
    pub fn new(resolver: Arc<dyn Resolve>) -> Self {
        Self { resolver }
    }

    /// Get the DNS resolver.
    pub fn resolver(&self) -> &Arc<dyn Resolve> {
        &self.resolver
    }

    /// Perform a GET request and collect the whole body.
    pub async fn get(&self, url: &str) -> Result<Response<Bytes>, NetError> {
        let url = Url::parse(url).map_err(|_| NetError::InvalidUrl)?;
        if url.scheme() != "http" {
            return Err(NetError::DisallowedUrlScheme);
        }
        let host = url.host().ok_or(NetError::InvalidUrl)?;
        let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;

        // 1. DNS Resolution
        let addrs = self.resolve(&host, port).await?;

        // 2. TCP Connect
        let host_str = url.host_str().unwrap_or_default();
        let stream = connect(&addrs, host_str, port).await?;

        // 3. Handshake
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "HTTP/1.1 handshake failed");
                NetError::ConnectionFailed
            })?;

        // 4. Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection closed with error");
            }
        });

        let request = Request::builder()
            .method(Method::GET)
            .uri(&url[Position::BeforePath..Position::AfterQuery])
            .header(header::HOST, &url[Position::BeforeHost..Position::AfterPort])
            .body(Empty::<Bytes>::new())
            .map_err(|_| NetError::InvalidUrl)?;

        let response = sender.send_request(request).await.map_err(|e| {
            tracing::debug!(error = %e, "request failed");
            NetError::InvalidResponse
        })?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|_| NetError::InvalidResponse)?
            .to_bytes();

        Ok(Response::from_parts(parts, body))
    }

    /// IP literals skip the resolver.
    async fn resolve(&self, host: &Host<&str>, port: u16) -> Result<Vec<SocketAddr>, NetError> {
        match host {
            Host::Ipv4(ip) => Ok(vec![SocketAddr::new((*ip).into(), port)]),
            Host::Ipv6(ip) => Ok(vec![SocketAddr::new((*ip).into(), port)]),
            Host::Domain(domain) => {
                let addrs = self.resolver.resolve(Name::new(*domain)).await?;
                Ok(addrs
                    .map(|mut addr| {
                        addr.set_port(port);
                        addr
                    })
                    .collect())
            }
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

/// Tries each address in order until one accepts.
async fn connect(addrs: &[SocketAddr], host: &str, port: u16) -> Result<TcpStream, NetError> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!(%addr, error = %e, "connect attempt failed");
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) => Err(e).connection_context(host, port),
        None => Err(NetError::ConnectionFailed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{Addrs, Resolving};
    use std::net::{IpAddr, Ipv4Addr};

    struct Unreachable;

    impl Resolve for Unreachable {
        fn resolve(&self, _name: Name) -> Resolving {
            Box::pin(std::future::ready(Err::<Addrs, _>(NetError::InvalidConfig(
                "resolver must not be called".into(),
            ))))
        }
    }

    struct Fixed(Vec<IpAddr>);

    impl Resolve for Fixed {
        fn resolve(&self, _name: Name) -> Resolving {
            let addrs: Vec<_> = self.0.iter().map(|ip| SocketAddr::new(*ip, 0)).collect();
            Box::pin(async move { Ok(Box::new(addrs.into_iter()) as Addrs) })
        }
    }

    #[tokio::test]
    async fn test_rejects_https() {
        let client = Client::new(Arc::new(Unreachable));
        let err = client.get("https://example.com/").await.unwrap_err();
        assert!(matches!(err, NetError::DisallowedUrlScheme));
    }

    #[tokio::test]
    async fn test_rejects_garbage_url() {
        let client = Client::new(Arc::new(Unreachable));
        let err = client.get("not a url").await.unwrap_err();
        assert!(matches!(err, NetError::InvalidUrl));
    }

    #[tokio::test]
    async fn test_ip_literal_bypasses_resolver() {
        let client = Client::new(Arc::new(Unreachable));
        let addrs = client
            .resolve(&Host::Ipv4(Ipv4Addr::new(192, 0, 2, 7)), 8080)
            .await
            .unwrap();
        assert_eq!(addrs, vec!["192.0.2.7:8080".parse::<SocketAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_resolved_addresses_get_port() {
        let client = Client::new(Arc::new(Fixed(vec![
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2)),
        ])));
        let addrs = client.resolve(&Host::Domain("example.com"), 80).await.unwrap();
        assert_eq!(
            addrs,
            vec![
                "192.0.2.1:80".parse::<SocketAddr>().unwrap(),
                "192.0.2.2:80".parse().unwrap()
            ]
        );
    }

    #[tokio::test]
    async fn test_connect_with_no_addresses() {
        let err = connect(&[], "example.com", 80).await.unwrap_err();
        assert!(matches!(err, NetError::ConnectionFailed));
    }
}
