//! Process-wide log output and its two-stage configuration.
//!
//! [`LogSinks`] owns a single `tracing` registry. The root severity lives in
//! a reloadable [`LevelFilter`]; the registry's `fmt` layers write through a
//! sink table consulted at every record, so sinks can be attached, retuned or
//! replaced while other threads keep logging.

mod sink;
mod syslog;

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use steward_config::{
    DEFAULT_LOG_LEVEL, DEFAULT_SYSLOG_FACILITY, DEFAULT_SYSLOG_HOST, DEFAULT_SYSLOG_LEVEL,
    LogLevel, RunMode, SyslogFacility, keys,
};
use thiserror::Error;
use tracing::dispatcher::SetGlobalDefaultError;
use tracing::{Dispatch, info, warn};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Registry, fmt, reload};

use crate::properties::ProcessConfig;

pub use self::sink::SinkKind;
use self::sink::{Destination, Sink, SinkSelection, SinkTable};
use self::syslog::SyslogTransport;

const LOGGING_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::logging");

static GLOBAL_SINKS: OnceCell<()> = OnceCell::new();

/// Errors encountered while configuring log output.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// No local socket could be bound for the syslog transport.
    #[error("failed to open a socket for syslog endpoint '{endpoint}': {source}")]
    SyslogSocket {
        /// Configured endpoint.
        endpoint: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Resolving the syslog endpoint failed.
    #[error("failed to resolve syslog endpoint '{endpoint}': {source}")]
    SyslogResolve {
        /// Configured endpoint.
        endpoint: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The syslog endpoint resolved to no address.
    #[error("syslog endpoint '{endpoint}' resolved to no address")]
    SyslogUnresolved {
        /// Configured endpoint.
        endpoint: String,
    },
    /// The rolling log file could not be opened.
    #[error("failed to open log file in {path}: {source}", path = path.display())]
    FileSink {
        /// Log directory.
        path: PathBuf,
        /// Underlying appender error.
        #[source]
        source: InitError,
    },
    /// The root level could not be changed.
    #[error("failed to change the root log level: {source}")]
    Reload {
        /// Underlying reload error.
        #[source]
        source: reload::Error,
    },
    /// The registry could not be installed as the global default.
    #[error("failed to install the global log subscriber: {source}")]
    Install {
        /// Underlying dispatcher error.
        #[source]
        source: SetGlobalDefaultError,
    },
}

/// Converts a configured [`LogLevel`] into a `tracing` filter.
///
/// `ALL` maps to `TRACE` and `FATAL` to `ERROR`, the nearest levels `tracing`
/// offers.
#[must_use]
pub const fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::All | LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error | LogLevel::Fatal => LevelFilter::ERROR,
        LogLevel::Off => LevelFilter::OFF,
    }
}

/// Controller for the daemon's log sinks.
#[derive(Clone)]
pub struct LogSinks {
    table: Arc<SinkTable>,
    root: reload::Handle<LevelFilter, Registry>,
    dispatch: Dispatch,
}

impl std::fmt::Debug for LogSinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSinks")
            .field("root", &self.root_level())
            .field("attached", &self.attached())
            .finish_non_exhaustive()
    }
}

impl Default for LogSinks {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSinks {
    /// Builds a registry with no sinks attached and the root level at `INFO`.
    #[must_use]
    pub fn new() -> Self {
        let table = Arc::new(SinkTable::default());
        let (root_filter, root) = reload::Layer::new(level_filter(DEFAULT_LOG_LEVEL));
        let local = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(SinkSelection::local(Arc::clone(&table)));
        let remote = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .without_time()
            .with_writer(SinkSelection::syslog(Arc::clone(&table)));
        let subscriber = Registry::default()
            .with(root_filter)
            .with(local)
            .with(remote);
        Self {
            table,
            root,
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Installs this registry as the process-wide default.
    ///
    /// Only the first call in a process installs anything; later calls
    /// succeed without touching global state.
    ///
    /// # Errors
    ///
    /// Returns [`LoggingError::Install`] when another subscriber was already
    /// installed by someone else.
    pub fn install_global(&self) -> Result<(), LoggingError> {
        GLOBAL_SINKS
            .get_or_try_init(|| {
                tracing::dispatcher::set_global_default(self.dispatch.clone())
                    .map_err(|source| LoggingError::Install { source })
            })
            .map(|_| ())
    }

    /// Dispatcher routing records into these sinks.
    #[must_use]
    pub fn dispatch(&self) -> Dispatch {
        self.dispatch.clone()
    }

    /// Bootstrap stage: replaces every sink with the defaults for `mode`.
    ///
    /// Development attaches the console. Production attaches a daily rolling
    /// file `<name>.<date>.log` under `log_dir` and a syslog sink on
    /// `localhost` with facility `LOCAL0`. Both production sinks are
    /// attempted even when the first fails.
    ///
    /// # Errors
    ///
    /// Returns the first sink that could not be opened.
    pub fn configure(&self, mode: RunMode, name: &str, log_dir: &Path) -> Result<(), LoggingError> {
        self.table.clear();
        self.set_root(level_filter(DEFAULT_LOG_LEVEL))?;
        if mode.is_development() {
            self.table
                .attach(SinkKind::Console, Sink::new(LevelFilter::TRACE, Destination::Console));
            return Ok(());
        }

        let threshold = level_filter(DEFAULT_LOG_LEVEL);
        let file = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(name)
            .filename_suffix("log")
            .build(log_dir)
            .map(|appender| {
                self.table
                    .attach(SinkKind::File, Sink::new(threshold, Destination::File(appender)));
            })
            .map_err(|source| LoggingError::FileSink {
                path: log_dir.to_path_buf(),
                source,
            });
        let syslog = SyslogTransport::connect(DEFAULT_SYSLOG_HOST, DEFAULT_SYSLOG_FACILITY, name)
            .map(|transport| {
                self.table.attach(
                    SinkKind::Syslog,
                    Sink::new(threshold, Destination::Syslog(transport)),
                );
            });
        file.and(syslog)
    }

    /// Reconfigure stage: applies the `logger.*` properties to the sinks
    /// installed by [`LogSinks::configure`].
    ///
    /// The root level always follows `logger.level`. In production the file
    /// sink is retuned to the root level or detached when `logger.file` is
    /// `false`, and the syslog sink is replaced according to the
    /// `logger.syslog.*` keys. Each change swaps one sink at a time so
    /// records keep flowing throughout.
    ///
    /// # Errors
    ///
    /// Returns an error when the root level cannot change or the new syslog
    /// endpoint cannot be reached; the previous syslog sink then stays.
    pub fn amend(
        &self,
        mode: RunMode,
        name: &str,
        properties: &ProcessConfig,
    ) -> Result<(), LoggingError> {
        let root = level_filter(LogLevel::parse_or(
            properties.get(keys::LOGGER_LEVEL).as_deref(),
            DEFAULT_LOG_LEVEL,
        ));
        self.set_root(root)?;
        info!(target: LOGGING_TARGET, level = %root, "changed the log level");
        if mode.is_development() {
            return Ok(());
        }

        if file_enabled(properties.get(keys::LOGGER_FILE).as_deref()) {
            self.table.retune(SinkKind::File, root);
        } else if self.table.detach(SinkKind::File) {
            info!(target: LOGGING_TARGET, "detached the file sink");
        }

        let host = properties
            .get(keys::SYSLOG_HOST)
            .map(|host| host.trim().to_owned())
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_SYSLOG_HOST.to_owned());
        let facility = facility_or_default(properties.get(keys::SYSLOG_FACILITY).as_deref());
        let threshold = level_filter(LogLevel::parse_or(
            properties.get(keys::SYSLOG_LEVEL).as_deref(),
            DEFAULT_SYSLOG_LEVEL,
        ));
        let transport = SyslogTransport::connect(&host, facility, name)?;
        self.table.attach(
            SinkKind::Syslog,
            Sink::new(threshold, Destination::Syslog(transport)),
        );
        info!(
            target: LOGGING_TARGET,
            host = %host,
            facility = %facility,
            level = %threshold,
            "changed the syslog sink"
        );
        Ok(())
    }

    /// Current root level.
    #[must_use]
    pub fn root_level(&self) -> Option<LevelFilter> {
        self.root.clone_current()
    }

    /// Sinks currently attached, in console, file, syslog order.
    #[must_use]
    pub fn attached(&self) -> Vec<SinkKind> {
        [SinkKind::Console, SinkKind::File, SinkKind::Syslog]
            .into_iter()
            .filter(|kind| self.table.get(*kind).is_some())
            .collect()
    }

    /// Threshold of the sink attached as `kind`.
    #[must_use]
    pub fn threshold(&self, kind: SinkKind) -> Option<LevelFilter> {
        self.table.get(kind).map(|sink| sink.threshold)
    }

    /// Address and facility of the attached syslog sink.
    #[must_use]
    pub fn syslog_endpoint(&self) -> Option<(SocketAddr, SyslogFacility)> {
        let sink = self.table.get(SinkKind::Syslog)?;
        match sink.destination.as_ref() {
            Destination::Syslog(transport) => Some((transport.target(), transport.facility())),
            _ => None,
        }
    }

    fn set_root(&self, level: LevelFilter) -> Result<(), LoggingError> {
        self.root
            .reload(level)
            .map_err(|source| LoggingError::Reload { source })
    }
}

fn file_enabled(value: Option<&str>) -> bool {
    value.is_none_or(|text| !text.trim().eq_ignore_ascii_case("false"))
}

fn facility_or_default(value: Option<&str>) -> SyslogFacility {
    let Some(text) = value.map(str::trim).filter(|text| !text.is_empty()) else {
        return DEFAULT_SYSLOG_FACILITY;
    };
    SyslogFacility::from_str(text).unwrap_or_else(|_| {
        warn!(
            target: LOGGING_TARGET,
            facility = text,
            fallback = %DEFAULT_SYSLOG_FACILITY,
            "unknown syslog facility"
        );
        DEFAULT_SYSLOG_FACILITY
    })
}
