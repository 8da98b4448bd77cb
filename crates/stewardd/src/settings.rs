//! Loading the ambient daemon settings.

use std::sync::Arc;

use ortho_config::OrthoError;
use steward_config::DaemonSettings;

/// Trait abstracting settings loading for testability.
pub trait SettingsLoader: Send + Sync {
    /// Loads the ambient daemon settings.
    fn load(&self) -> Result<DaemonSettings, Arc<OrthoError>>;
}

/// Loader that delegates to [`DaemonSettings::load_for`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSettingsLoader;

impl SettingsLoader for SystemSettingsLoader {
    fn load(&self) -> Result<DaemonSettings, Arc<OrthoError>> {
        DaemonSettings::load_for(env!("CARGO_PKG_NAME"))
    }
}

/// Loader that returns pre-resolved settings.
#[derive(Debug, Clone)]
pub struct StaticSettingsLoader {
    settings: DaemonSettings,
}

impl StaticSettingsLoader {
    /// Builds a loader that always yields `settings`.
    #[must_use]
    pub const fn new(settings: DaemonSettings) -> Self {
        Self { settings }
    }
}

impl SettingsLoader for StaticSettingsLoader {
    fn load(&self) -> Result<DaemonSettings, Arc<OrthoError>> {
        Ok(self.settings.clone())
    }
}
