//! Binding OS signals to life-cycle actions.
//!
//! The orchestrator talks to a [`SignalBinder`] rather than to the OS so the
//! state machine can be exercised without real signal delivery.
//! [`SystemSignalBinder`] runs each binding on a `signal-hook` iterator
//! thread; [`ManualSignalBinder`] records bindings and runs them on demand.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

pub(crate) const SIGNALS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::signals");

/// Signals the daemon reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// `SIGHUP`: the controlling terminal went away.
    HangUp,
    /// `SIGTERM`: termination was requested.
    Terminate,
    /// `SIGUSR2`: application-defined notification.
    UserDefined2,
}

impl SignalKind {
    /// Conventional signal name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HangUp => "SIGHUP",
            Self::Terminate => "SIGTERM",
            Self::UserDefined2 => "SIGUSR2",
        }
    }

    #[cfg(unix)]
    const fn raw(self) -> i32 {
        use signal_hook::consts::signal::{SIGHUP, SIGTERM, SIGUSR2};
        match self {
            Self::HangUp => SIGHUP,
            Self::Terminate => SIGTERM,
            Self::UserDefined2 => SIGUSR2,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work performed when a signal arrives.
pub type SignalAction = Arc<dyn Fn() + Send + Sync>;

/// Errors raised while binding signals.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Registering the handler failed.
    #[error("failed to install handler for {signal}: {source}")]
    Install {
        /// Signal being bound.
        signal: SignalKind,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The delivery thread could not be spawned.
    #[error("failed to spawn delivery thread for {signal}: {source}")]
    Spawn {
        /// Signal being bound.
        signal: SignalKind,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The platform cannot deliver this signal.
    #[error("{signal} is not supported on this platform")]
    Unsupported {
        /// Signal being bound.
        signal: SignalKind,
    },
}

/// Capability to bind a signal to an action.
pub trait SignalBinder: Send + Sync {
    /// Runs `action` every time `kind` is delivered, replacing any action
    /// bound to `kind` earlier.
    fn bind(&self, kind: SignalKind, action: SignalAction) -> Result<(), SignalError>;
}

/// Binder that installs real handlers through `signal-hook`.
///
/// Handlers run on a dedicated thread per signal, never in the restricted
/// signal-handler context, so actions may lock and log. Rebinding a signal
/// closes the previous thread, so repeated start cycles keep one thread per
/// signal.
#[derive(Default)]
pub struct SystemSignalBinder {
    #[cfg(unix)]
    handles: Mutex<HashMap<SignalKind, signal_hook::iterator::Handle>>,
}

impl fmt::Debug for SystemSignalBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemSignalBinder").finish_non_exhaustive()
    }
}

impl SystemSignalBinder {
    /// Builds a binder with no handlers installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(unix)]
impl SignalBinder for SystemSignalBinder {
    fn bind(&self, kind: SignalKind, action: SignalAction) -> Result<(), SignalError> {
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([kind.raw()]).map_err(|source| SignalError::Install {
            signal: kind,
            source,
        })?;
        let handle = signals.handle();
        std::thread::Builder::new()
            .name(format!("steward-{}", kind.as_str().to_lowercase()))
            .spawn(move || {
                for _ in signals.forever() {
                    debug!(target: SIGNALS_TARGET, signal = %kind, "signal received");
                    action();
                }
            })
            .map_err(|source| SignalError::Spawn {
                signal: kind,
                source,
            })?;
        let previous = self
            .handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, handle);
        if let Some(previous) = previous {
            previous.close();
            debug!(target: SIGNALS_TARGET, signal = %kind, "replaced earlier binding");
        }
        Ok(())
    }
}

#[cfg(not(unix))]
impl SignalBinder for SystemSignalBinder {
    fn bind(&self, kind: SignalKind, _action: SignalAction) -> Result<(), SignalError> {
        Err(SignalError::Unsupported { signal: kind })
    }
}

#[cfg(unix)]
impl Drop for SystemSignalBinder {
    fn drop(&mut self) {
        let handles = self
            .handles
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in handles.drain() {
            handle.close();
        }
    }
}

/// Binder that records actions and runs them when asked.
///
/// Clones share the same bindings.
#[derive(Clone, Default)]
pub struct ManualSignalBinder {
    actions: Arc<Mutex<HashMap<SignalKind, SignalAction>>>,
}

impl fmt::Debug for ManualSignalBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualSignalBinder")
            .field("bound", &self.bound_kinds())
            .finish()
    }
}

impl ManualSignalBinder {
    /// Builds a binder with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the action bound to `kind` on the calling thread, returning
    /// whether one was bound.
    pub fn raise(&self, kind: SignalKind) -> bool {
        let action = self
            .actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned();
        let Some(action) = action else {
            return false;
        };
        action();
        true
    }

    /// Signals that have a binding.
    #[must_use]
    pub fn bound_kinds(&self) -> Vec<SignalKind> {
        let actions = self.actions.lock().unwrap_or_else(PoisonError::into_inner);
        let mut kinds: Vec<_> = actions.keys().copied().collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
    }
}

impl SignalBinder for ManualSignalBinder {
    fn bind(&self, kind: SignalKind, action: SignalAction) -> Result<(), SignalError> {
        self.actions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, action);
        Ok(())
    }
}

/// Actions the daemon attaches to the signals it handles.
pub(crate) struct SignalRoutes {
    pub(crate) terminate: SignalAction,
    pub(crate) user_defined2: SignalAction,
}

/// Binds hang-up to a no-op, termination to `routes.terminate` and `SIGUSR2`
/// to `routes.user_defined2`.
///
/// Binding `SIGHUP` replaces its default disposition, so the process survives
/// its terminal closing.
pub(crate) fn install_routes(
    binder: &dyn SignalBinder,
    routes: SignalRoutes,
) -> Result<(), SignalError> {
    binder.bind(
        SignalKind::HangUp,
        Arc::new(|| {
            debug!(target: SIGNALS_TARGET, "ignoring hang-up");
        }),
    )?;
    binder.bind(SignalKind::Terminate, routes.terminate)?;
    binder.bind(SignalKind::UserDefined2, routes.user_defined2)?;
    Ok(())
}
