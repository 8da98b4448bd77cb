//! Life-cycle core for long-running daemons.
//!
//! A [`Daemon`] walks one start cycle at a time through
//! `STOPPED → STARTING → STARTED → STOPPING → STOPPED`, driving an
//! application-supplied [`LifecycleListener`] at each step. The start cycle
//! runs on its own thread and parks on a [`RunGate`] while the application
//! serves; [`Daemon::stop_service`] or a termination signal releases it.
//!
//! Logging is configured in two stages. Before properties are available the
//! [`LogSinks`] controller attaches defaults for the run mode; once the
//! listener's properties are published the `logger.*` keys retune the root
//! level and replace the syslog sink without interrupting output.
//!
//! Fatal errors move the daemon to `ABORTING` and end the process with exit
//! status 1; a graceful stop exits with 0. Process exit goes through a
//! [`ProcessTerminator`] so embedders and tests can observe it instead.

mod context;
mod daemon;
mod errors;
mod exit;
mod gate;
mod hostname;
mod listener;
mod logging;
mod phase;
mod properties;
mod settings;
mod signals;

pub use context::DaemonIdentity;
pub use daemon::{Collaborators, CycleOutcome, Daemon};
pub use errors::{LifecycleError, SpawnError};
pub use exit::{ExitStatus, ProcessTerminator, SystemTerminator};
pub use gate::RunGate;
pub use hostname::{HostnameError, HostnameResolver, StaticHostnameResolver, SystemHostnameResolver};
pub use listener::{LifecycleListener, ListenerError};
pub use logging::{LogSinks, LoggingError, SinkKind, level_filter};
pub use phase::{Phase, PhaseCell};
pub use properties::{
    AmbientEnvironment, EnvironmentError, MemoryEnvironment, ProcessConfig, ProcessEnvironment,
    Properties,
};
pub use settings::{SettingsLoader, StaticSettingsLoader, SystemSettingsLoader};
pub use signals::{
    ManualSignalBinder, SignalAction, SignalBinder, SignalError, SignalKind, SystemSignalBinder,
};

#[cfg(test)]
mod tests;
