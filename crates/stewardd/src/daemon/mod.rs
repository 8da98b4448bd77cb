//! The daemon handle: start, stop and process-wide accessors.

mod cycle;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::JoinHandle;

use tracing::{debug, info};

use crate::context::LifecycleContext;
use crate::errors::SpawnError;
use crate::exit::{ExitStatus, ProcessTerminator, SystemTerminator};
use crate::gate::RunGate;
use crate::hostname::{HostnameResolver, SystemHostnameResolver};
use crate::listener::LifecycleListener;
use crate::logging::{LogSinks, LoggingError};
use crate::phase::Phase;
use crate::properties::{AmbientEnvironment, ProcessEnvironment, Properties};
use crate::settings::{SettingsLoader, SystemSettingsLoader};
use crate::signals::{SignalBinder, SystemSignalBinder};

pub(crate) const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Process-level collaborators the daemon drives.
pub struct Collaborators {
    /// Source of the ambient settings.
    pub settings: Box<dyn SettingsLoader>,
    /// Source of the host name.
    pub hostname: Box<dyn HostnameResolver>,
    /// Binds OS signals in production mode.
    pub signals: Box<dyn SignalBinder>,
    /// Receives a mirror of every published property.
    pub environment: Box<dyn AmbientEnvironment>,
    /// Ends the process once a cycle finishes.
    pub terminator: Box<dyn ProcessTerminator>,
    /// Log output controller.
    pub sinks: LogSinks,
}

impl Collaborators {
    /// Production collaborators backed by the real process.
    #[must_use]
    pub fn system() -> Self {
        Self {
            settings: Box::new(SystemSettingsLoader),
            hostname: Box::new(SystemHostnameResolver),
            signals: Box::new(SystemSignalBinder::new()),
            environment: Box::new(ProcessEnvironment),
            terminator: Box::new(SystemTerminator),
            sinks: LogSinks::new(),
        }
    }
}

/// Name of the orchestrator thread; interior NULs are not allowed in
/// thread names, so they are dropped.
fn thread_name(daemon: &str) -> String {
    let mut name: String = daemon.chars().filter(|ch| *ch != '\0').collect();
    name.push_str("-lifecycle");
    name
}

/// How a start cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleOutcome {
    /// Another cycle was active, so nothing ran.
    Rejected,
    /// The listener started and stopped gracefully.
    Completed,
    /// A fatal error ended the cycle.
    Aborted,
}

impl CycleOutcome {
    /// Exit status the process terminates with, if any.
    #[must_use]
    pub const fn exit_status(self) -> Option<ExitStatus> {
        match self {
            Self::Rejected => None,
            Self::Completed => Some(ExitStatus::Success),
            Self::Aborted => Some(ExitStatus::Aborted),
        }
    }
}

pub(crate) struct DaemonInner {
    pub(crate) context: LifecycleContext,
    pub(crate) collaborators: Collaborators,
    listener: RwLock<Option<Arc<dyn LifecycleListener>>>,
    gate: RwLock<Option<Arc<RunGate>>>,
}

impl DaemonInner {
    pub(crate) fn listener(&self) -> Option<Arc<dyn LifecycleListener>> {
        self.listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn gate(&self) -> Option<Arc<RunGate>> {
        self.gate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the listener and gate for a new cycle.
    pub(crate) fn begin_cycle(&self, listener: Arc<dyn LifecycleListener>, gate: Arc<RunGate>) {
        *self.listener.write().unwrap_or_else(PoisonError::into_inner) = Some(listener);
        *self.gate.write().unwrap_or_else(PoisonError::into_inner) = Some(gate);
    }

    /// Requests a stop; only the call that moves `STARTED` to `STOPPING`
    /// has any effect.
    pub(crate) fn stop_service(&self) -> bool {
        if !self
            .context
            .phase
            .transition(Phase::Started, Phase::Stopping)
        {
            debug!(
                target: LIFECYCLE_TARGET,
                phase = %self.context.phase.current(),
                "stop request ignored"
            );
            return false;
        }
        info!(target: LIFECYCLE_TARGET, "stopping");
        if let Some(listener) = self.listener() {
            listener.stopping();
        }
        if let Some(gate) = self.gate() {
            gate.release();
        }
        true
    }
}

/// Handle to one daemon life-cycle.
///
/// Clones share the same state, so a clone may be handed to another thread
/// to request a stop.
#[derive(Clone)]
pub struct Daemon {
    inner: Arc<DaemonInner>,
}

impl fmt::Debug for Daemon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Daemon")
            .field("phase", &self.current_phase())
            .field("name", &self.daemon_name())
            .field("instance_id", &self.instance_id())
            .finish_non_exhaustive()
    }
}

impl Daemon {
    /// Builds a stopped daemon driving `collaborators`.
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            inner: Arc::new(DaemonInner {
                context: LifecycleContext::default(),
                collaborators,
                listener: RwLock::new(None),
                gate: RwLock::new(None),
            }),
        }
    }

    /// Builds a daemon with the production collaborators and installs its
    /// log sinks as the process-wide subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error when another global subscriber is already installed.
    pub fn system() -> Result<Self, LoggingError> {
        let collaborators = Collaborators::system();
        collaborators.sinks.install_global()?;
        Ok(Self::new(collaborators))
    }

    /// Runs a start cycle for `name` on a dedicated thread and returns at
    /// once.
    ///
    /// The cycle is rejected when another one is active. A completed or
    /// aborted cycle hands its exit status to the terminator before the
    /// thread ends; the returned handle may be joined or dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError`] when the thread cannot be created.
    pub fn start_daemon(
        &self,
        name: impl Into<String>,
        listener: Arc<dyn LifecycleListener>,
    ) -> Result<JoinHandle<CycleOutcome>, SpawnError> {
        let name = name.into();
        let inner = Arc::clone(&self.inner);
        std::thread::Builder::new()
            .name(thread_name(&name))
            .spawn(move || {
                let dispatch = inner.collaborators.sinks.dispatch();
                let outcome = tracing::dispatcher::with_default(&dispatch, || {
                    cycle::run(&inner, &name, listener)
                });
                if let Some(status) = outcome.exit_status() {
                    inner.collaborators.terminator.terminate(status);
                }
                outcome
            })
            .map_err(|source| SpawnError { source })
    }

    /// Requests a graceful stop from any thread.
    ///
    /// Returns `true` for the request that moved the daemon from `STARTED`
    /// to `STOPPING`. Repeated requests and requests made before the daemon
    /// started do nothing.
    pub fn stop_service(&self) -> bool {
        self.inner.stop_service()
    }

    /// Current life-cycle phase.
    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.inner.context.phase.current()
    }

    /// Host name resolved during start-up.
    #[must_use]
    pub fn hostname(&self) -> Option<String> {
        self.inner.context.identity.hostname()
    }

    /// Name passed to the latest accepted [`Daemon::start_daemon`] call.
    #[must_use]
    pub fn daemon_name(&self) -> Option<String> {
        self.inner.context.identity.name()
    }

    /// Random token identifying this daemon instance.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        self.inner.context.identity.instance_id()
    }

    /// Properties published from the listener.
    #[must_use]
    pub fn daemon_properties(&self) -> Properties {
        self.inner.context.properties.snapshot()
    }

    /// Whether the latest cycle runs in development mode.
    #[must_use]
    pub fn is_development_mode(&self) -> bool {
        self.inner.context.is_development()
    }

    /// The daemon's log output controller.
    #[must_use]
    pub fn log_sinks(&self) -> &LogSinks {
        &self.inner.collaborators.sinks
    }
}
