use crate::dns::{FaultKind, ProviderFault, ResolutionFailure};
use std::{io, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Resolution Errors
    #[error(transparent)]
    NameNotResolved(#[from] ResolutionFailure),
    #[error(transparent)]
    Provider(#[from] ProviderFault),
    #[error("Invalid DNS configuration: {0}")]
    InvalidConfig(String),

    // Connection Errors
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Connection to {host}:{port} failed: {source}")]
    ConnectionFailedTo {
        host: String,
        port: u16,
        #[source]
        source: Arc<io::Error>,
    },

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Disallowed URL scheme")]
    DisallowedUrlScheme,
    #[error("Invalid response")]
    InvalidResponse,
}

impl NetError {
    /// Chromium `net_error_list.h` code for this error.
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::NameNotResolved(_) => -105,
            NetError::Provider(fault) => match fault.kind() {
                FaultKind::Connection => -104,
                FaultKind::MalformedResponse => -800,
                FaultKind::Timeout => -803,
                FaultKind::Other => -137,
            },
            NetError::InvalidConfig(_) => -2,
            NetError::ConnectionFailed | NetError::ConnectionFailedTo { .. } => -104,
            NetError::InvalidUrl => -300,
            NetError::DisallowedUrlScheme => -301,
            NetError::InvalidResponse => -320,
        }
    }

    /// Creates a connection error carrying the target and the IO cause.
    pub fn connection_failed_to(host: &str, port: u16, source: io::Error) -> Self {
        NetError::ConnectionFailedTo {
            host: host.to_string(),
            port,
            source: Arc::new(source),
        }
    }

    /// True when every provider declined the hostname.
    ///
    /// Consumers should treat this exactly like the platform resolver's
    /// "unknown host" error.
    pub fn is_name_not_resolved(&self) -> bool {
        matches!(self, NetError::NameNotResolved(_))
    }

    pub fn resolution_failure(&self) -> Option<&ResolutionFailure> {
        match self {
            NetError::NameNotResolved(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn provider_fault(&self) -> Option<&ProviderFault> {
        match self {
            NetError::Provider(fault) => Some(fault),
            _ => None,
        }
    }
}

impl From<NetError> for io::Error {
    fn from(err: NetError) -> Self {
        let kind = match &err {
            NetError::NameNotResolved(_) => io::ErrorKind::NotFound,
            NetError::Provider(fault) if fault.kind() == FaultKind::Timeout => {
                io::ErrorKind::TimedOut
            }
            NetError::ConnectionFailedTo { source, .. } => source.kind(),
            NetError::ConnectionFailed => io::ErrorKind::ConnectionRefused,
            NetError::InvalidConfig(_) | NetError::InvalidUrl | NetError::DisallowedUrlScheme => {
                io::ErrorKind::InvalidInput
            }
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
