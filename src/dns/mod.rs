//! DNS Resolution Module
//!
//! Resolves hostnames by walking an ordered chain of providers:
//! - DNS-over-HTTPS upstreams via hickory-dns (Cloudflare, Google, Quad9, custom)
//! - System resolver (getaddrinfo via thread pool)
//!
//! # Architecture
//!
//! [`Provider`] is one way of answering a lookup. [`FallbackResolver`] owns
//! a fixed list of providers and returns the first non-empty answer, moving
//! on only when a provider reports "host not found" or answers empty. It
//! implements [`Resolve`], the trait HTTP connection code resolves through.
//!
//! # Example
//!
//! ```rust,ignore
//! use dnschain::dns::{Name, Resolve, ResolverConfig};
//!
//! let resolver = ResolverConfig::default().build()?;
//! let addrs = resolver.resolve(Name::new("example.com")).await?;
//! for addr in addrs {
//!     println!("Resolved: {}", addr);
//! }
//! ```

mod config;
mod error;
mod fallback;
mod gai;
mod hickory;
mod provider;
mod resolve;

pub use config::{ProviderConfig, ResolverConfig};
pub use error::{FaultKind, HostNotFound, LookupError, ProviderFault, ResolutionFailure, SharedError};
pub use fallback::FallbackResolver;
pub use gai::SystemProvider;
pub use hickory::{DohConfig, DohPreset, DohProvider, DOH_PATH};
pub use provider::{AddressList, Lookup, Provider};
pub use resolve::{Addrs, Name, Resolve, Resolving};
