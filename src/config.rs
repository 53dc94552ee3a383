//! Where drivers, the manifest and the archive cache live.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DriverError;

/// Required: directory the driver executables are installed into.
pub const HOME_ENV_NAME: &str = "DRIVERS_HOME";
/// Optional: overrides the archive cache location.
pub const CACHE_ENV_NAME: &str = "RSDRIVER_CACHE";

const MANIFEST_FILE: &str = ".drivers.ini";
const CACHE_DIR: &str = ".rsdriver_cache";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub drivers_home: PathBuf,
    pub cache_dir: PathBuf,
}

impl Settings {
    pub fn new(drivers_home: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            drivers_home: drivers_home.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Reads the environment. `DRIVERS_HOME` must be set and non-empty.
    pub fn from_env() -> Result<Self, DriverError> {
        Self::from_vars(|name| std::env::var(name).ok(), dirs::home_dir())
    }

    fn from_vars(
        var: impl Fn(&str) -> Option<String>,
        home_dir: Option<PathBuf>,
    ) -> Result<Self, DriverError> {
        let drivers_home = var(HOME_ENV_NAME).filter(|home| !home.is_empty());
        debug!("{HOME_ENV_NAME} set to {}", drivers_home.as_deref().unwrap_or(""));
        let drivers_home =
            drivers_home.ok_or_else(|| DriverError::MissingEnv(HOME_ENV_NAME.to_string()))?;

        let cache_dir = match var(CACHE_ENV_NAME).filter(|dir| !dir.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => home_dir.ok_or(DriverError::HomeNotFound)?.join(CACHE_DIR),
        };

        Ok(Self::new(drivers_home, cache_dir))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.drivers_home.join(MANIFEST_FILE)
    }

    /// Creates both directories and canonicalizes the install directory.
    pub fn setup_dirs(mut self) -> Result<Self, DriverError> {
        for dir in [&self.drivers_home, &self.cache_dir] {
            std::fs::create_dir_all(dir).map_err(|e| DriverError::io(dir, e))?;
        }
        self.drivers_home = canonical(&self.drivers_home)?;
        Ok(self)
    }
}

fn canonical(path: &Path) -> Result<PathBuf, DriverError> {
    dunce::canonicalize(path).map_err(|e| DriverError::io(path, e))
}
