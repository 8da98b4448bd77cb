//! Property keys understood by the daemon core.
//!
//! Hosting applications may supply any keys they like through their property
//! loader; the core only reads the ones below.

/// Key under which the daemon name is mirrored into the ambient environment.
pub const DAEMON_NAME: &str = "daemon.name";

/// Root log severity threshold applied once properties are loaded.
pub const LOGGER_LEVEL: &str = "logger.level";

/// Set to `false` to detach the rotating file sink in production mode.
pub const LOGGER_FILE: &str = "logger.file";

/// Syslog destination as `host` or `host:port`.
pub const SYSLOG_HOST: &str = "logger.syslog.host";

/// Syslog facility name, for example `LOCAL3`.
pub const SYSLOG_FACILITY: &str = "logger.syslog.facility";

/// Severity threshold for the syslog sink.
pub const SYSLOG_LEVEL: &str = "logger.syslog.level";
