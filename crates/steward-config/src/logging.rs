use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Severity thresholds accepted in the `logger.*` properties.
///
/// Parsing is case-insensitive. [`LogLevel::parse_or`] mirrors the lenient
/// lookup operators expect from property files: anything unrecognised falls
/// back to the supplied default instead of failing the daemon.
#[derive(
    Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LogLevel {
    /// Every record.
    All,
    /// Fine-grained tracing output.
    Trace,
    /// Diagnostic output.
    Debug,
    /// Normal operational messages.
    Info,
    /// Conditions worth an operator's attention.
    Warn,
    /// Failures of a single operation.
    Error,
    /// Failures that end the process.
    Fatal,
    /// Nothing at all.
    Off,
}

/// Errors encountered while parsing a [`LogLevel`] from text.
pub type LogLevelParseError = strum::ParseError;

impl LogLevel {
    /// Parses `value`, returning `default` when it is absent or unknown, so
    /// `Some("chatty")` and `None` both yield `default`.
    #[must_use]
    pub fn parse_or(value: Option<&str>, default: Self) -> Self {
        value
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or(default)
    }
}

/// Syslog facilities as defined by RFC 3164.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum SyslogFacility {
    /// Kernel messages.
    #[strum(serialize = "KERN")]
    Kern,
    /// User-level messages.
    #[strum(serialize = "USER")]
    User,
    /// Mail system.
    #[strum(serialize = "MAIL")]
    Mail,
    /// System daemons.
    #[strum(serialize = "DAEMON")]
    Daemon,
    /// Security and authorisation messages.
    #[strum(serialize = "AUTH")]
    Auth,
    /// Messages generated by syslogd itself.
    #[strum(serialize = "SYSLOG")]
    Syslog,
    /// Line printer subsystem.
    #[strum(serialize = "LPR")]
    Lpr,
    /// Network news subsystem.
    #[strum(serialize = "NEWS")]
    News,
    /// UUCP subsystem.
    #[strum(serialize = "UUCP")]
    Uucp,
    /// Clock daemon.
    #[strum(serialize = "CRON")]
    Cron,
    /// Private security and authorisation messages.
    #[strum(serialize = "AUTHPRIV")]
    AuthPriv,
    /// FTP daemon.
    #[strum(serialize = "FTP")]
    Ftp,
    /// Local use 0.
    #[strum(serialize = "LOCAL0")]
    Local0,
    /// Local use 1.
    #[strum(serialize = "LOCAL1")]
    Local1,
    /// Local use 2.
    #[strum(serialize = "LOCAL2")]
    Local2,
    /// Local use 3.
    #[strum(serialize = "LOCAL3")]
    Local3,
    /// Local use 4.
    #[strum(serialize = "LOCAL4")]
    Local4,
    /// Local use 5.
    #[strum(serialize = "LOCAL5")]
    Local5,
    /// Local use 6.
    #[strum(serialize = "LOCAL6")]
    Local6,
    /// Local use 7.
    #[strum(serialize = "LOCAL7")]
    Local7,
}

/// Errors encountered while parsing a [`SyslogFacility`] from text.
pub type SyslogFacilityParseError = strum::ParseError;

impl SyslogFacility {
    /// Numeric facility code used to build the syslog priority value.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Kern => 0,
            Self::User => 1,
            Self::Mail => 2,
            Self::Daemon => 3,
            Self::Auth => 4,
            Self::Syslog => 5,
            Self::Lpr => 6,
            Self::News => 7,
            Self::Uucp => 8,
            Self::Cron => 9,
            Self::AuthPriv => 10,
            Self::Ftp => 11,
            Self::Local0 => 16,
            Self::Local1 => 17,
            Self::Local2 => 18,
            Self::Local3 => 19,
            Self::Local4 => 20,
            Self::Local5 => 21,
            Self::Local6 => 22,
            Self::Local7 => 23,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("DEBUG", LogLevel::Debug)]
    #[case("warn", LogLevel::Warn)]
    #[case(" Fatal ", LogLevel::Fatal)]
    #[case("off", LogLevel::Off)]
    fn log_levels_parse_case_insensitively(#[case] text: &str, #[case] expected: LogLevel) {
        assert_eq!(LogLevel::parse_or(Some(text), LogLevel::Info), expected);
    }

    #[rstest]
    #[case(Some("debug"), LogLevel::Info, LogLevel::Debug)]
    #[case(Some("chatty"), LogLevel::Info, LogLevel::Info)]
    #[case(Some("verbose"), LogLevel::Warn, LogLevel::Warn)]
    #[case(Some(""), LogLevel::Error, LogLevel::Error)]
    #[case(None, LogLevel::Warn, LogLevel::Warn)]
    fn parse_or_falls_back_to_the_default(
        #[case] text: Option<&str>,
        #[case] default: LogLevel,
        #[case] expected: LogLevel,
    ) {
        assert_eq!(LogLevel::parse_or(text, default), expected);
    }

    #[rstest]
    #[case("LOCAL0", 16)]
    #[case("local3", 19)]
    #[case("daemon", 3)]
    #[case("AuthPriv", 10)]
    fn facilities_parse_to_their_codes(#[case] text: &str, #[case] code: u8) {
        let facility: SyslogFacility = text.parse().expect("facility should parse");
        assert_eq!(facility.code(), code);
    }

    #[rstest]
    fn facility_display_matches_syslog_naming() {
        assert_eq!(SyslogFacility::Local0.to_string(), "LOCAL0");
    }
}
