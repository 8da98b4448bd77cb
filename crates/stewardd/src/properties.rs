//! Process-wide configuration published from the listener's properties.
//!
//! Every property the listener supplies lands in two places: the daemon's
//! [`ProcessConfig`] and the ambient environment, so collaborators that only
//! read environment variables observe the same values.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::{info, warn};

/// Key/value pairs returned by a property loader.
pub type Properties = HashMap<String, String>;

const PROPERTIES_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::properties");

/// Mapping of configuration keys to values shared across threads.
///
/// Later writes to the same key replace earlier ones.
#[derive(Debug, Default)]
pub struct ProcessConfig {
    entries: RwLock<Properties>,
}

impl ProcessConfig {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Copies the current entries.
    #[must_use]
    pub fn snapshot(&self) -> Properties {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Errors raised while mirroring a value into the ambient environment.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The key cannot be used as an environment variable name.
    #[error("'{key}' cannot be used as an environment variable name")]
    InvalidKey {
        /// Rejected key.
        key: String,
    },
    /// The value contains a NUL byte.
    #[error("value for '{key}' contains a NUL byte")]
    InvalidValue {
        /// Key whose value was rejected.
        key: String,
    },
}

/// Process-wide key/value surface mirrored alongside [`ProcessConfig`].
pub trait AmbientEnvironment: Send + Sync {
    /// Reads a value.
    fn var(&self, key: &str) -> Option<String>;

    /// Writes a value.
    fn set_var(&self, key: &str, value: &str) -> Result<(), EnvironmentError>;
}

/// Ambient environment backed by the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl AmbientEnvironment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set_var(&self, key: &str, value: &str) -> Result<(), EnvironmentError> {
        validate(key, value)?;
        // SAFETY: the daemon core only writes the environment from the
        // orchestrator thread during start-up, before the listener's
        // `do_start` spawns application threads. Hosts that read the
        // environment concurrently must use `MemoryEnvironment` instead.
        unsafe { std::env::set_var(key, value) };
        Ok(())
    }
}

/// Ambient environment kept in memory, shared between clones.
#[derive(Debug, Default, Clone)]
pub struct MemoryEnvironment {
    values: Arc<RwLock<Properties>>,
}

impl MemoryEnvironment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the stored values.
    #[must_use]
    pub fn snapshot(&self) -> Properties {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AmbientEnvironment for MemoryEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_var(&self, key: &str, value: &str) -> Result<(), EnvironmentError> {
        validate(key, value)?;
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

fn validate(key: &str, value: &str) -> Result<(), EnvironmentError> {
    if key.is_empty() || key.contains(['=', '\0']) {
        return Err(EnvironmentError::InvalidKey {
            key: key.to_owned(),
        });
    }
    if value.contains('\0') {
        return Err(EnvironmentError::InvalidValue {
            key: key.to_owned(),
        });
    }
    Ok(())
}

/// Publishes `properties` into `config` and mirrors each entry into
/// `environment`.
///
/// Entries are applied in key order so the log reads deterministically. A
/// value the environment rejects is still kept in `config`.
pub(crate) fn publish(
    properties: Properties,
    config: &ProcessConfig,
    environment: &dyn AmbientEnvironment,
) {
    let ordered: BTreeMap<String, String> = properties.into_iter().collect();
    for (key, value) in ordered {
        info!(
            target: PROPERTIES_TARGET,
            key = %key,
            value = %value,
            "setting property"
        );
        if let Err(error) = environment.set_var(&key, &value) {
            warn!(
                target: PROPERTIES_TARGET,
                key = %key,
                error = %error,
                "property not mirrored into the environment"
            );
        }
        config.insert(key, value);
    }
}
