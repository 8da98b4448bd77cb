//! Settings resolved before the daemon's own properties are available.

use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_LOG_DIR;

/// Environment variable prefix used by [`DaemonSettings`].
pub const SETTINGS_PREFIX: &str = "STEWARD";

/// Whether the daemon runs interactively or as a production service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// Console logging only; OS signals keep their default behaviour.
    Development,
    /// Rotating file and syslog sinks; termination signals drive shutdown.
    Production,
}

impl RunMode {
    /// Returns `true` for [`RunMode::Development`].
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Ambient settings for the daemon core.
///
/// Values are layered by `ortho_config`: built-in defaults first, then a
/// configuration file named by `STEWARD_CONFIG_PATH`, then `STEWARD_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "STEWARD")]
pub struct DaemonSettings {
    /// Enables development mode (`STEWARD_DEVELOPMENT_MODE=true`).
    ///
    /// Only `true`, in any letter case, enables it. Any other value keeps
    /// production mode rather than failing the load.
    #[ortho_config(default = false)]
    #[serde(default, deserialize_with = "lenient_toggle")]
    pub development_mode: bool,
    /// Directory for rotating log files (`STEWARD_LOG_DIR`).
    pub log_dir: Option<String>,
}

impl DaemonSettings {
    /// Loads settings from defaults, configuration files and the environment.
    ///
    /// Only `program` is handed to the command-line layer, so the hosting
    /// application's own arguments are never interpreted here.
    pub fn load_for(program: &str) -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter([OsString::from(program)])
    }

    /// Builds production-mode settings with the default log directory.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            development_mode: false,
            log_dir: None,
        }
    }

    /// Builds development-mode settings.
    #[must_use]
    pub const fn development() -> Self {
        Self {
            development_mode: true,
            log_dir: None,
        }
    }

    /// Mode derived from the development toggle.
    #[must_use]
    pub const fn run_mode(&self) -> RunMode {
        if self.development_mode {
            RunMode::Development
        } else {
            RunMode::Production
        }
    }

    /// Directory that receives rotating log files.
    #[must_use]
    pub fn log_dir(&self) -> &str {
        self.log_dir.as_deref().unwrap_or(DEFAULT_LOG_DIR)
    }
}

/// Reads a boolean-like toggle where only `true` counts as set.
fn lenient_toggle<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ToggleVisitor)
}

struct ToggleVisitor;

impl<'de> Visitor<'de> for ToggleVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a boolean-like toggle")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
        Ok(value)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
        Ok(value.trim().eq_ignore_ascii_case("true"))
    }

    fn visit_i64<E: de::Error>(self, _value: i64) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_u64<E: de::Error>(self, _value: u64) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}
