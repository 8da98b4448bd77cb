//! Error surface reported through the listener's exception hook.

use std::io;
use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use crate::hostname::HostnameError;
use crate::listener::ListenerError;
use crate::logging::LoggingError;
use crate::signals::SignalError;

/// Conditions that interrupt a start cycle.
///
/// Logging failures are recoverable and only reported; every other variant
/// aborts the daemon.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Ambient settings could not be loaded.
    #[error("failed to load daemon settings: {source}")]
    Settings {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// A log sink could not be configured.
    #[error("failed to configure logging: {source}")]
    Logging {
        /// Underlying sink error.
        #[source]
        source: LoggingError,
    },
    /// The host name could not be determined.
    #[error("failed to determine hostname: {source}")]
    Hostname {
        /// Underlying resolver error.
        #[source]
        source: HostnameError,
    },
    /// Signal handlers could not be installed.
    #[error("failed to install signal handlers: {source}")]
    Signals {
        /// Underlying binder error.
        #[source]
        source: SignalError,
    },
    /// The listener failed to supply its properties.
    #[error("getting config data failed: {source}")]
    Properties {
        /// Error raised by the listener.
        #[source]
        source: ListenerError,
    },
    /// The listener's start hook failed.
    #[error("listener failed to start: {source}")]
    StartFailed {
        /// Error raised by the listener.
        #[source]
        source: ListenerError,
    },
    /// The listener's start hook returned `false`.
    #[error("listener refused to start")]
    StartRefused,
    /// The listener's stop hook failed.
    #[error("listener failed to stop: {source}")]
    StopFailed {
        /// Error raised by the listener.
        #[source]
        source: ListenerError,
    },
    /// The listener's stop hook returned `false`.
    #[error("listener refused to stop")]
    StopRefused,
}

impl LifecycleError {
    /// Whether the listener declined rather than failed.
    ///
    /// Refusals carry no error of their own, so they are not passed to the
    /// exception hook when the daemon aborts.
    #[must_use]
    pub const fn is_refusal(&self) -> bool {
        matches!(self, Self::StartRefused | Self::StopRefused)
    }
}

/// The orchestrator thread could not be spawned.
#[derive(Debug, Error)]
#[error("failed to spawn the orchestrator thread: {source}")]
pub struct SpawnError {
    /// Underlying IO error.
    #[source]
    pub source: io::Error,
}
