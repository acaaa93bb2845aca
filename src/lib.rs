//! # dnschain
//!
//! Ordered fallback hostname resolution for Rust HTTP clients.
//!
//! `dnschain` resolves a hostname by asking several independent providers in
//! a fixed priority order: DNS-over-HTTPS upstreams first, the platform
//! resolver last. The first non-empty answer wins.
//!
//! ## Features
//!
//! - **Ordered Fallback**: strictly sequential, positional priority
//! - **DNS-over-HTTPS**: Cloudflare, Google and Quad9 presets via hickory-dns
//! - **System Resolver**: getaddrinfo as the last resort
//! - **Structured Failures**: every "host not found" along the chain is kept,
//!   first one as the primary cause
//! - **Pluggable**: the resolver drops into any client that accepts a
//!   [`dns::Resolve`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dnschain::client::Client;
//! use dnschain::dns::ResolverConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = Arc::new(ResolverConfig::default().build().unwrap());
//!     let response = Client::new(resolver)
//!         .get("http://example.com/")
//!         .await
//!         .unwrap();
//!     println!("Status: {}", response.status());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions and context helpers
//! - [`dns`] - Providers, the fallback resolver and its configuration
//! - [`client`] - HTTP/1.1 client resolving through an injected resolver

pub mod base;
pub mod client;
pub mod dns;
