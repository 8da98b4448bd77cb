//! Callbacks implemented by the hosting application.

use crate::errors::LifecycleError;
use crate::phase::Phase;
use crate::properties::Properties;

/// Failure reported by a listener callback.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Application hooks invoked as the daemon moves through its phases.
///
/// Every method runs on the orchestrator thread except
/// [`LifecycleListener::stopping`], which runs on the thread that requested
/// the stop, and [`LifecycleListener::signal_usr2`], which runs on the
/// signal-delivery thread.
#[cfg_attr(test, mockall::automock)]
pub trait LifecycleListener: Send + Sync {
    /// Supplies the application's properties. An error aborts the daemon.
    fn load_properties(&self) -> Result<Option<Properties>, ListenerError>;

    /// Starts the application. `Ok(false)` and `Err` both abort the daemon.
    fn do_start(&self) -> Result<bool, ListenerError>;

    /// Stops the application. `Ok(false)` and `Err` both abort the daemon.
    fn do_stop(&self) -> Result<bool, ListenerError>;

    /// The daemon reached [`Phase::Started`].
    ///
    /// The phase changes before this hook runs, so a stop requested from
    /// another thread may call [`LifecycleListener::stopping`] before or
    /// while `started` runs. Implementations must not assume `started`
    /// has returned when `stopping` is called.
    fn started(&self) {}

    /// A stop was requested.
    ///
    /// Runs on the requesting thread, possibly concurrently with
    /// [`LifecycleListener::started`].
    fn stopping(&self) {}

    /// The daemon reached [`Phase::Stopped`].
    fn stopped(&self) {}

    /// The daemon is about to exit after a fatal error.
    fn aborting(&self) {}

    /// An error was encountered while in `phase`.
    fn exception(&self, phase: Phase, error: &LifecycleError) {
        let _ = (phase, error);
    }

    /// `SIGUSR2` was delivered to the process.
    fn signal_usr2(&self) {}
}
