//! Tests for the HTTP client resolving through an injected resolver.

use dnschain::base::NetError;
use dnschain::client::Client;
use dnschain::dns::{
    FallbackResolver, HostNotFound, Lookup, LookupError, Name, Provider, ResolverConfig,
};

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Answers one fixed hostname with loopback, declines everything else.
struct HostsProvider {
    host: &'static str,
}

impl Provider for HostsProvider {
    fn name(&self) -> &str {
        "hosts"
    }

    fn lookup(&self, name: Name) -> Lookup {
        let result = if name.as_str() == self.host {
            Ok(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
        } else {
            Err(LookupError::from(HostNotFound::new("hosts", name.as_str())))
        };
        Box::pin(async move { result })
    }
}

struct Declines(&'static str);

impl Provider for Declines {
    fn name(&self) -> &str {
        self.0
    }

    fn lookup(&self, name: Name) -> Lookup {
        let err = LookupError::from(HostNotFound::new(self.0, name.as_str()));
        Box::pin(async move { Err::<Vec<IpAddr>, _>(err) })
    }
}

fn resolver(host: &'static str) -> Arc<FallbackResolver> {
    let providers = vec![
        Arc::new(Declines("doh")) as Arc<dyn Provider>,
        Arc::new(HostsProvider { host }) as Arc<dyn Provider>,
    ];
    Arc::new(FallbackResolver::new(providers).unwrap())
}

/// Serves a single canned response and returns the raw request it received.
async fn serve_once(body: &'static str) -> (u16, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let mut request = Vec::new();
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (port, handle)
}

#[tokio::test]
async fn test_get_through_fallback_resolver() {
    let (port, server) = serve_once("hello").await;
    let client = Client::new(resolver("api.test"));

    let response = client
        .get(&format!("http://api.test:{port}/greeting?lang=en"))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(&response.body()[..], b"hello");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /greeting?lang=en HTTP/1.1\r\n"));
    assert!(request.to_ascii_lowercase().contains(&format!("host: api.test:{port}")));
}

#[tokio::test]
async fn test_unknown_host_surfaces_resolution_failure() {
    let client = Client::new(resolver("api.test"));

    let err = client.get("http://nope.invalid/").await.unwrap_err();

    match err {
        NetError::NameNotResolved(failure) => {
            assert_eq!(failure.hostname(), "nope.invalid");
            let providers: Vec<_> = failure.causes().map(|c| c.provider()).collect();
            assert_eq!(providers, ["doh", "hosts"]);
        }
        other => panic!("expected NameNotResolved, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_names_target() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = Client::new(resolver("api.test"));

    let err = client
        .get(&format!("http://api.test:{port}/"))
        .await
        .unwrap_err();

    match err {
        NetError::ConnectionFailedTo { host, port: p, .. } => {
            assert_eq!(host, "api.test");
            assert_eq!(p, port);
        }
        other => panic!("expected ConnectionFailedTo, got {other:?}"),
    }
}

/// Real DoH lookup through the default public chain.
#[tokio::test]
#[ignore] // Run with --ignored flag for network tests
async fn test_default_chain_real_lookup() {
    let resolver = ResolverConfig::default().build().unwrap();

    let result = tokio::time::timeout(Duration::from_secs(20), resolver.lookup_ip("example.com"))
        .await
        .expect("lookup timed out");

    match result {
        Ok(addrs) => assert!(!addrs.is_empty()),
        Err(e) => eprintln!("Network test skipped: {e:?}"),
    }
}
