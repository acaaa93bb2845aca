//! The provider abstraction consulted by the fallback chain.

use super::{LookupError, Name};
use futures::future::BoxFuture;
use std::{net::IpAddr, sync::Arc};

/// Ordered addresses for one hostname. Empty means "no answer", which is
/// not the same as a failure.
pub type AddressList = Vec<IpAddr>;

/// Alias for the `Future` type returned by a provider lookup.
pub type Lookup = BoxFuture<'static, Result<AddressList, LookupError>>;

/// A single name-resolution strategy.
///
/// Implementations must report an unknown hostname as
/// [`LookupError::NotFound`] and every other failure (timeouts, transport
/// errors, malformed upstream answers) as [`LookupError::Fault`]. The
/// fallback chain only moves on for the former.
pub trait Provider: Send + Sync {
    /// Human-readable identity, used in error messages and logs.
    fn name(&self) -> &str;

    /// Looks up the addresses for `name`.
    fn lookup(&self, name: Name) -> Lookup;
}

impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lookup(&self, name: Name) -> Lookup {
        (**self).lookup(name)
    }
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lookup(&self, name: Name) -> Lookup {
        (**self).lookup(name)
    }
}
