//! `stewardd` runs the life-cycle core with an idle application.
//!
//! The binary serves as a smoke test for deployments: it configures logging,
//! resolves its host, publishes no properties and then waits for `SIGTERM`.

use std::process::ExitCode;
use std::sync::Arc;

use stewardd::{CycleOutcome, Daemon, LifecycleListener, ListenerError, Properties};

struct IdleApplication;

impl LifecycleListener for IdleApplication {
    fn load_properties(&self) -> Result<Option<Properties>, ListenerError> {
        Ok(None)
    }

    fn do_start(&self) -> Result<bool, ListenerError> {
        Ok(true)
    }

    fn do_stop(&self) -> Result<bool, ListenerError> {
        Ok(true)
    }
}

fn main() -> ExitCode {
    let Ok(daemon) = Daemon::system() else {
        return ExitCode::FAILURE;
    };
    let Ok(handle) = daemon.start_daemon(env!("CARGO_PKG_NAME"), Arc::new(IdleApplication)) else {
        return ExitCode::FAILURE;
    };
    match handle.join() {
        Ok(CycleOutcome::Completed) => ExitCode::SUCCESS,
        Ok(CycleOutcome::Rejected | CycleOutcome::Aborted) | Err(_) => ExitCode::FAILURE,
    }
}
