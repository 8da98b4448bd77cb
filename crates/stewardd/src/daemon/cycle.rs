//! One start cycle, from the `STOPPED → STARTING` guard to the final phase.

use std::path::Path;
use std::sync::{Arc, Weak};

use steward_config::{RunMode, keys};
use tracing::{debug, error, info, warn};

use super::{CycleOutcome, DaemonInner, LIFECYCLE_TARGET};
use crate::errors::LifecycleError;
use crate::gate::RunGate;
use crate::hostname::resolve_non_empty;
use crate::listener::LifecycleListener;
use crate::phase::Phase;
use crate::properties::publish;
use crate::signals::{SignalAction, SignalRoutes, install_routes};

pub(super) fn run(
    inner: &Arc<DaemonInner>,
    name: &str,
    listener: Arc<dyn LifecycleListener>,
) -> CycleOutcome {
    let context = &inner.context;
    if !context.phase.transition(Phase::Stopped, Phase::Starting) {
        error!(
            target: LIFECYCLE_TARGET,
            daemon = name,
            phase = %context.phase.current(),
            "service already running"
        );
        return CycleOutcome::Rejected;
    }

    let gate = Arc::new(RunGate::new());
    inner.begin_cycle(Arc::clone(&listener), Arc::clone(&gate));
    match serve(inner, name, listener.as_ref(), &gate) {
        Ok(()) => CycleOutcome::Completed,
        Err(error) => {
            abort(inner, listener.as_ref(), &error);
            CycleOutcome::Aborted
        }
    }
}

fn serve(
    inner: &Arc<DaemonInner>,
    name: &str,
    listener: &dyn LifecycleListener,
    gate: &RunGate,
) -> Result<(), LifecycleError> {
    let context = &inner.context;
    let collaborators = &inner.collaborators;

    let settings = collaborators
        .settings
        .load()
        .map_err(|source| LifecycleError::Settings { source })?;
    let mode = settings.run_mode();
    context.identity.set_name(name);
    context.set_development(mode.is_development());
    if let Err(error) = collaborators.environment.set_var(keys::DAEMON_NAME, name) {
        warn!(target: LIFECYCLE_TARGET, error = %error, "daemon name not mirrored");
    }

    if let Err(source) = collaborators
        .sinks
        .configure(mode, name, Path::new(settings.log_dir()))
    {
        recover(listener, LifecycleError::Logging { source });
    }

    let hostname = resolve_non_empty(collaborators.hostname.as_ref())
        .map_err(|source| LifecycleError::Hostname { source })?;
    context.identity.set_hostname(&hostname);
    info!(target: LIFECYCLE_TARGET, "running in {} mode", mode_label(mode));
    info!(
        target: LIFECYCLE_TARGET,
        instance_id = context.identity.instance_id(),
        "running with instance id"
    );
    info!(target: LIFECYCLE_TARGET, host = %hostname, "running on host");

    if !mode.is_development() && cfg!(unix) {
        install_routes(collaborators.signals.as_ref(), routes(inner))
            .map_err(|source| LifecycleError::Signals { source })?;
    } else {
        debug!(target: LIFECYCLE_TARGET, "signal handlers not installed");
    }

    let properties = listener
        .load_properties()
        .map_err(|source| LifecycleError::Properties { source })?;
    if let Some(properties) = properties {
        publish(
            properties,
            &context.properties,
            collaborators.environment.as_ref(),
        );
    }

    if let Err(source) = collaborators.sinks.amend(mode, name, &context.properties) {
        recover(listener, LifecycleError::Logging { source });
    }

    if !listener
        .do_start()
        .map_err(|source| LifecycleError::StartFailed { source })?
    {
        return Err(LifecycleError::StartRefused);
    }
    context.phase.force(Phase::Started);
    info!(target: LIFECYCLE_TARGET, "{name} started");
    listener.started();

    gate.wait();

    if !listener
        .do_stop()
        .map_err(|source| LifecycleError::StopFailed { source })?
    {
        return Err(LifecycleError::StopRefused);
    }
    context.phase.force(Phase::Stopped);
    info!(target: LIFECYCLE_TARGET, "{name} stopped");
    listener.stopped();
    Ok(())
}

const fn mode_label(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Development => "development",
        RunMode::Production => "production",
    }
}

/// Reports a recoverable error and lets the cycle continue.
fn recover(listener: &dyn LifecycleListener, error: LifecycleError) {
    warn!(target: LIFECYCLE_TARGET, error = %error, "continuing after error");
    listener.exception(Phase::Starting, &error);
}

fn abort(inner: &DaemonInner, listener: &dyn LifecycleListener, error: &LifecycleError) {
    inner.context.phase.force(Phase::Aborting);
    if !error.is_refusal() {
        listener.exception(Phase::Aborting, error);
    }
    listener.aborting();
    error!(
        target: LIFECYCLE_TARGET,
        error = %error,
        "unrecoverable error encountered"
    );
}

/// Signal actions hold a weak reference so bindings never keep a dropped
/// daemon alive.
fn routes(inner: &Arc<DaemonInner>) -> SignalRoutes {
    let on_terminate = Arc::downgrade(inner);
    let on_user_defined2 = Arc::downgrade(inner);
    SignalRoutes {
        terminate: scoped(on_terminate, |daemon| {
            daemon.stop_service();
        }),
        user_defined2: scoped(on_user_defined2, |daemon| {
            if let Some(listener) = daemon.listener() {
                listener.signal_usr2();
            }
        }),
    }
}

/// Runs `action` with the daemon's own log sinks as the default subscriber.
fn scoped(
    daemon: Weak<DaemonInner>,
    action: impl Fn(&DaemonInner) + Send + Sync + 'static,
) -> SignalAction {
    Arc::new(move || {
        if let Some(daemon) = daemon.upgrade() {
            let dispatch = daemon.collaborators.sinks.dispatch();
            tracing::dispatcher::with_default(&dispatch, || action(&daemon));
        }
    })
}
