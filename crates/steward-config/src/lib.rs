//! Ambient configuration shared by the steward daemon core and its hosts.
//!
//! Two kinds of configuration meet here. [`DaemonSettings`] is resolved before
//! anything else runs: it decides whether the process runs in development or
//! production mode and where rotating log files are written. It is loaded with
//! `ortho_config`, layering built-in defaults, an optional configuration file
//! and `STEWARD_*` environment variables.
//!
//! The second kind is the application's own property set, fetched later by the
//! lifecycle listener. Only a handful of its keys matter to the core; they are
//! named in [`keys`] and interpreted with the parsers in this crate
//! ([`LogLevel`], [`SyslogFacility`]).

mod defaults;
pub mod keys;
mod logging;
mod settings;

pub use defaults::{
    DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL, DEFAULT_SYSLOG_FACILITY, DEFAULT_SYSLOG_HOST,
    DEFAULT_SYSLOG_LEVEL, DEFAULT_SYSLOG_PORT, default_log_dir,
};
pub use logging::{LogLevel, LogLevelParseError, SyslogFacility, SyslogFacilityParseError};
pub use settings::{DaemonSettings, RunMode, SETTINGS_PREFIX};
