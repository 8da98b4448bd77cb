//! Daemon wired to in-memory collaborators.

use std::ffi::OsString;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ortho_config::{OrthoConfig, OrthoError};
use steward_config::DaemonSettings;
use tempfile::TempDir;

use crate::daemon::{Collaborators, CycleOutcome, Daemon};
use crate::exit::{ExitStatus, ProcessTerminator};
use crate::hostname::StaticHostnameResolver;
use crate::listener::LifecycleListener;
use crate::logging::LogSinks;
use crate::phase::Phase;
use crate::properties::MemoryEnvironment;
use crate::settings::{SettingsLoader, StaticSettingsLoader};
use crate::signals::ManualSignalBinder;

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Terminator that records exit statuses instead of exiting.
#[derive(Debug, Clone, Default)]
pub struct RecordingTerminator {
    statuses: Arc<Mutex<Vec<ExitStatus>>>,
}

impl RecordingTerminator {
    pub fn statuses(&self) -> Vec<ExitStatus> {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProcessTerminator for RecordingTerminator {
    fn terminate(&self, status: ExitStatus) {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(status);
    }
}

/// Settings loader that always fails to parse its arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSettingsLoader;

impl SettingsLoader for FailingSettingsLoader {
    fn load(&self) -> Result<DaemonSettings, Arc<OrthoError>> {
        DaemonSettings::load_from_iter([
            OsString::from("stewardd"),
            OsString::from("--no-such-option"),
        ])
    }
}

/// How a [`TestRig`] should be wired.
#[derive(Debug, Clone)]
pub struct RigOptions {
    pub development: bool,
    pub hostname: String,
    pub failing_settings: bool,
    /// Points the log directory at a regular file so the file sink fails.
    pub broken_log_dir: bool,
}

impl Default for RigOptions {
    fn default() -> Self {
        Self {
            development: false,
            hostname: "node-1".to_owned(),
            failing_settings: false,
            broken_log_dir: false,
        }
    }
}

/// A daemon plus handles onto its collaborators.
pub struct TestRig {
    pub daemon: Daemon,
    pub signals: ManualSignalBinder,
    pub environment: MemoryEnvironment,
    pub terminator: RecordingTerminator,
    _log_dir: TempDir,
}

impl TestRig {
    pub fn new(options: RigOptions) -> Self {
        let log_dir = TempDir::new().expect("create log dir");
        let mut log_path = log_dir.path().to_path_buf();
        if options.broken_log_dir {
            log_path.push("not-a-directory");
            std::fs::write(&log_path, b"").expect("write placeholder file");
        }
        let settings = DaemonSettings {
            development_mode: options.development,
            log_dir: Some(log_path.to_string_lossy().into_owned()),
        };
        let settings_loader: Box<dyn SettingsLoader> = if options.failing_settings {
            Box::new(FailingSettingsLoader)
        } else {
            Box::new(StaticSettingsLoader::new(settings))
        };
        let signals = ManualSignalBinder::new();
        let environment = MemoryEnvironment::new();
        let terminator = RecordingTerminator::default();
        let daemon = Daemon::new(Collaborators {
            settings: settings_loader,
            hostname: Box::new(StaticHostnameResolver::new(options.hostname)),
            signals: Box::new(signals.clone()),
            environment: Box::new(environment.clone()),
            terminator: Box::new(terminator.clone()),
            sinks: LogSinks::new(),
        });
        Self {
            daemon,
            signals,
            environment,
            terminator,
            _log_dir: log_dir,
        }
    }

    pub fn production() -> Self {
        Self::new(RigOptions::default())
    }

    pub fn development() -> Self {
        Self::new(RigOptions {
            development: true,
            ..RigOptions::default()
        })
    }

    pub fn start(&self, name: &str, listener: Arc<dyn LifecycleListener>) -> JoinHandle<CycleOutcome> {
        self.daemon
            .start_daemon(name, listener)
            .expect("spawn orchestrator thread")
    }

    /// Polls until the daemon reaches `phase`.
    pub fn wait_for_phase(&self, phase: Phase) -> Result<(), String> {
        wait_until(|| self.daemon.current_phase() == phase).map_err(|()| {
            format!(
                "daemon stayed in {} while waiting for {phase}",
                self.daemon.current_phase()
            )
        })
    }
}

/// Polls `condition` until it holds or [`WAIT_TIMEOUT`] passes.
pub fn wait_until(condition: impl Fn() -> bool) -> Result<(), ()> {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return Ok(());
        }
        thread::sleep(POLL_INTERVAL);
    }
    if condition() { Ok(()) } else { Err(()) }
}

/// Joins a cycle thread, failing the test on panic.
pub fn join(handle: JoinHandle<CycleOutcome>) -> CycleOutcome {
    handle.join().expect("orchestrator thread panicked")
}
