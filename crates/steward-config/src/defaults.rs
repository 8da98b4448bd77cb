use crate::logging::{LogLevel, SyslogFacility};

/// Directory that receives rotating log files when no override is configured.
pub const DEFAULT_LOG_DIR: &str = "log";

/// Syslog host used by the bootstrap sink and when no override is loaded.
pub const DEFAULT_SYSLOG_HOST: &str = "localhost";

/// UDP port assumed when the syslog host omits one.
pub const DEFAULT_SYSLOG_PORT: u16 = 514;

/// Facility used by the bootstrap syslog sink.
pub const DEFAULT_SYSLOG_FACILITY: SyslogFacility = SyslogFacility::Local0;

/// Threshold applied to every sink during bootstrap and to the root level
/// when `logger.level` is absent or unparsable.
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

/// Syslog threshold applied on reconfiguration when `logger.syslog.level` is
/// absent or unparsable.
pub const DEFAULT_SYSLOG_LEVEL: LogLevel = LogLevel::Warn;

/// Owned log directory value used where allocation is required.
pub fn default_log_dir() -> String {
    DEFAULT_LOG_DIR.to_owned()
}
