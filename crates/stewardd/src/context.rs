//! State shared by the orchestrator, signal routes and accessors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::phase::PhaseCell;
use crate::properties::ProcessConfig;

/// Name, instance token and host of the running daemon.
#[derive(Debug)]
pub struct DaemonIdentity {
    name: RwLock<Option<String>>,
    instance_id: String,
    hostname: RwLock<Option<String>>,
}

impl Default for DaemonIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl DaemonIdentity {
    /// Creates an identity with a fresh random instance id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: RwLock::new(None),
            instance_id: Uuid::new_v4().to_string(),
            hostname: RwLock::new(None),
        }
    }

    /// Name given to the current start cycle.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Unique token for this daemon instance.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Host the daemon resolved during start-up.
    #[must_use]
    pub fn hostname(&self) -> Option<String> {
        self.hostname
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_name(&self, name: &str) {
        *self.name.write().unwrap_or_else(PoisonError::into_inner) = Some(name.to_owned());
    }

    pub(crate) fn set_hostname(&self, hostname: &str) {
        *self.hostname.write().unwrap_or_else(PoisonError::into_inner) =
            Some(hostname.to_owned());
    }
}

/// Everything the life-cycle core tracks for one daemon.
#[derive(Debug, Default)]
pub(crate) struct LifecycleContext {
    pub(crate) phase: PhaseCell,
    pub(crate) identity: DaemonIdentity,
    pub(crate) properties: ProcessConfig,
    development: AtomicBool,
}

impl LifecycleContext {
    pub(crate) fn is_development(&self) -> bool {
        self.development.load(Ordering::Acquire)
    }

    pub(crate) fn set_development(&self, development: bool) {
        self.development.store(development, Ordering::Release);
    }
}
