//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich DNS and connection errors.

use crate::base::neterror::NetError;
use crate::dns::{HostNotFound, LookupError};
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add connection context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use dnschain::base::context::IoResultExt;
    ///
    /// let stream = TcpStream::connect(addr).await
    ///     .connection_context("example.com", 80)?;
    /// // Error: "Connection to example.com:80 failed: connection refused"
    /// ```
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError>;

    /// Treat an IO error from `provider` as "host not found" for `domain`.
    fn dns_context(self, provider: &str, domain: &str) -> Result<T, LookupError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn connection_context(self, host: &str, port: u16) -> Result<T, NetError> {
        self.map_err(|e| NetError::connection_failed_to(host, port, e))
    }

    fn dns_context(self, provider: &str, domain: &str) -> Result<T, LookupError> {
        self.map_err(|e| HostNotFound::new(provider, domain).with_source(e).into())
    }
}
