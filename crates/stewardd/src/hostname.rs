//! Host name resolution.

use std::ffi::OsString;
use std::io;

use thiserror::Error;

/// Errors raised while resolving the host name.
#[derive(Debug, Error)]
pub enum HostnameError {
    /// The operating system lookup failed.
    #[error("hostname lookup failed: {source}")]
    Lookup {
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The host name is not valid UTF-8.
    #[error("hostname {raw:?} is not valid UTF-8")]
    NotUnicode {
        /// Raw host name bytes.
        raw: OsString,
    },
    /// The host name is empty.
    #[error("hostname could not be determined")]
    Empty,
}

/// Source of the host name recorded in the daemon identity.
pub trait HostnameResolver: Send + Sync {
    /// Resolves the host name.
    fn resolve(&self) -> Result<String, HostnameError>;
}

/// Resolver that asks the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostnameResolver;

impl HostnameResolver for SystemHostnameResolver {
    #[cfg(unix)]
    fn resolve(&self) -> Result<String, HostnameError> {
        let raw = nix::unistd::gethostname().map_err(|errno| HostnameError::Lookup {
            source: io::Error::from(errno),
        })?;
        raw.into_string()
            .map_err(|raw| HostnameError::NotUnicode { raw })
    }

    #[cfg(not(unix))]
    fn resolve(&self) -> Result<String, HostnameError> {
        std::env::var("COMPUTERNAME")
            .or_else(|_| std::env::var("HOSTNAME"))
            .map_err(|_| HostnameError::Empty)
    }
}

/// Resolver returning a fixed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHostnameResolver {
    hostname: String,
}

impl StaticHostnameResolver {
    /// Builds a resolver that always returns `hostname`.
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }
}

impl HostnameResolver for StaticHostnameResolver {
    fn resolve(&self) -> Result<String, HostnameError> {
        Ok(self.hostname.clone())
    }
}

/// Resolves the host name, treating blank names as failures.
pub(crate) fn resolve_non_empty(resolver: &dyn HostnameResolver) -> Result<String, HostnameError> {
    let hostname = resolver.resolve()?;
    if hostname.trim().is_empty() {
        return Err(HostnameError::Empty);
    }
    Ok(hostname)
}
